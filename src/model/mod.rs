//! Models with compile-time training state.
//!
//! A model starts `Unfitted`, carries its hyperparameters, and becomes
//! `Fitted` only through a successful fit. Only fitted models implement
//! [`InferenceModel`], so an untrained model can neither predict nor be
//! written out as an artifact.

pub mod linear;
pub mod state;

pub use state::{Fitted, Unfitted};

use crate::error::ModelError;
use crate::serialization::SerializableParams;
use std::path::Path;

/// Inference-side interface of a fitted model.
///
/// # Guarantees
/// - `extract_params()` + `from_params()` is a round-trip.
/// - `save_to_file` followed by `load_from_file` reproduces predictions
///   bit for bit.
pub trait InferenceModel {
    type Input;
    type Output;
    /// Serializable representation of the learned parameters.
    type ParamsRepr: SerializableParams<Error = serde_pickle::Error>;

    /// Apply the model to a batch of samples.
    fn predict(&self, input: &Self::Input) -> Result<Self::Output, ModelError>;

    /// Extract learned parameters as a serializable representation.
    fn extract_params(&self) -> Self::ParamsRepr;

    /// Reconstruct a fitted model from parameters.
    fn from_params(params: Self::ParamsRepr) -> Result<Self, ModelError>
    where
        Self: Sized;

    /// Save the fitted model to `path`, replacing any existing file.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let path = path.as_ref();
        let bytes = self.extract_params().to_bytes()?;
        std::fs::write(path, bytes).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a fitted model from `path`.
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError>
    where
        Self: Sized,
    {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let params = Self::ParamsRepr::from_bytes(&bytes)?;
        Self::from_params(params)
    }
}
