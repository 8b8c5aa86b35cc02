//! Error types for loading data, fitting, persisting and serving models.
//!
//! Every training-time failure ends up in a [`TrainingError`], which the
//! entry point hands to the failure reporter. Inference hooks return
//! [`ModelError`] directly to their caller.

use std::fmt;
use std::path::PathBuf;

/// Errors raised while locating or decoding a dataset channel.
#[derive(Debug)]
pub enum DatasetError {
    /// The channel directory holds no file with the dataset suffix.
    InvalidInput { dir: PathBuf },
    /// The directory or the selected file could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// The selected file is not a readable pickle stream.
    ///
    /// Pickled numpy arrays land here too: they need numpy's reconstructors,
    /// which this loader does not have. Convert them with `.tolist()` before
    /// pickling.
    Deserialize {
        path: PathBuf,
        source: serde_pickle::Error,
    },
    /// The pickle decoded, but not into a usable `[X, y]` pair.
    Malformed { path: PathBuf, reason: String },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::InvalidInput { dir } => {
                write!(f, "Invalid # of files in dir: {}", dir.display())
            }
            DatasetError::Io { path, source } => {
                write!(f, "I/O error reading {}: {}", path.display(), source)
            }
            DatasetError::Deserialize { path, source } => {
                write!(f, "Could not unpickle {}: {}", path.display(), source)
            }
            DatasetError::Malformed { path, reason } => {
                write!(f, "Malformed dataset in {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetError::Io { source, .. } => Some(source),
            DatasetError::Deserialize { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors raised by the estimator while fitting.
#[derive(Debug)]
pub enum FitError {
    /// `X` and `y` disagree on the number of samples.
    ShapeMismatch { samples: usize, targets: usize },
    /// The least-squares solver rejected the problem.
    Solver(linfa_linear::LinearError<f64>),
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitError::ShapeMismatch { samples, targets } => write!(
                f,
                "Found input variables with inconsistent numbers of samples: [{}, {}]",
                samples, targets
            ),
            FitError::Solver(e) => write!(f, "Least-squares solve failed: {}", e),
        }
    }
}

impl std::error::Error for FitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FitError::Solver(e) => Some(e),
            FitError::ShapeMismatch { .. } => None,
        }
    }
}

impl From<linfa_linear::LinearError<f64>> for FitError {
    fn from(err: linfa_linear::LinearError<f64>) -> Self {
        FitError::Solver(err)
    }
}

/// Errors raised while persisting, loading or applying a fitted model.
#[derive(Debug)]
pub enum ModelError {
    /// The model artifact could not be read or written.
    Io { path: PathBuf, source: std::io::Error },
    /// The model parameters could not be encoded or decoded.
    Serialization(serde_pickle::Error),
    /// Prediction input has a different number of features than the model.
    FeatureMismatch {
        expected_features: usize,
        got_features: usize,
    },
    /// Decoded parameters do not describe a valid model.
    InvalidParams(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Io { path, source } => {
                write!(f, "I/O error on model file {}: {}", path.display(), source)
            }
            ModelError::Serialization(e) => write!(f, "Serialization error: {}", e),
            ModelError::FeatureMismatch {
                expected_features,
                got_features,
            } => write!(
                f,
                "Feature mismatch: expected {} features, got {}",
                expected_features, got_features
            ),
            ModelError::InvalidParams(msg) => write!(f, "Invalid model parameters: {}", msg),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Io { source, .. } => Some(source),
            ModelError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_pickle::Error> for ModelError {
    fn from(err: serde_pickle::Error) -> Self {
        ModelError::Serialization(err)
    }
}

/// Everything that can fail a training job.
#[derive(Debug)]
pub enum TrainingError {
    /// A required data channel was neither passed nor exported by the platform.
    MissingChannel { channel: &'static str, env_var: &'static str },
    /// No model directory was configured.
    MissingModelDir,
    Dataset(DatasetError),
    Fit(FitError),
    /// The fitted model could not be written to the model directory.
    Persist(ModelError),
}

impl fmt::Display for TrainingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainingError::MissingChannel { channel, env_var } => write!(
                f,
                "no '{}' channel configured: pass --{} or set {}",
                channel, channel, env_var
            ),
            TrainingError::MissingModelDir => {
                write!(f, "no model directory configured: pass --model_dir or set SM_MODEL_DIR")
            }
            TrainingError::Dataset(e) => write!(f, "{}", e),
            TrainingError::Fit(e) => write!(f, "{}", e),
            TrainingError::Persist(_) => write!(f, "could not save model"),
        }
    }
}

impl std::error::Error for TrainingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrainingError::Dataset(e) => std::error::Error::source(e),
            TrainingError::Fit(e) => std::error::Error::source(e),
            TrainingError::Persist(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DatasetError> for TrainingError {
    fn from(err: DatasetError) -> Self {
        TrainingError::Dataset(err)
    }
}

impl From<FitError> for TrainingError {
    fn from(err: FitError) -> Self {
        TrainingError::Fit(err)
    }
}

impl From<ModelError> for TrainingError {
    fn from(err: ModelError) -> Self {
        TrainingError::Persist(err)
    }
}
