//! Serialization of fitted model parameters.
//!
//! Parameters are stored in Python's pickle format so the artifact keeps the
//! `model.pickle` name the hosting side expects and stays readable with
//! `pickle.load`. Implementors should contain only plain numerical data
//! (e.g., `Vec<f64>`, scalars, flags), never live estimator state.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;

/// A trait for parameter representations that can be serialized to and from bytes.
pub trait SerializableParams: Sized {
    /// The error type returned during (de)serialization.
    type Error: Error + Send + Sync + 'static;

    /// Serialize the parameters into a byte buffer.
    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error>;

    /// Deserialize the parameters from a byte buffer.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error>;
}

impl<T> SerializableParams for T
where
    T: Serialize + DeserializeOwned,
{
    type Error = serde_pickle::Error;

    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error> {
        serde_pickle::to_vec(self, serde_pickle::SerOptions::new())
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error> {
        serde_pickle::from_slice(bytes, serde_pickle::DeOptions::new())
    }
}
