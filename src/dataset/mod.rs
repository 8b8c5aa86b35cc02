//! Dataset loading for training channels.
//!
//! # Core Concepts
//!
//! - **Channel**: a directory the platform fills with input files
//!   (`train`, `test`, ...).
//! - **Dataset**: an `(X, y)` pair where `X` is a feature matrix of shape
//!   `(n_samples, n_features)` and `y` is a target vector.
//!
//! # Example
//!
//! ```no_run
//! use linreg_entrypoint::dataset::load_dataset;
//!
//! let dataset = load_dataset("/opt/ml/input/data/train")?;
//! println!("{} samples x {} features", dataset.n_samples(), dataset.n_features());
//! # Ok::<(), linreg_entrypoint::error::DatasetError>(())
//! ```

pub mod channel;
pub mod memory;

pub use self::channel::{find_dataset_files, load_dataset, DATASET_SUFFIX};
pub use self::memory::InMemoryDataset;
