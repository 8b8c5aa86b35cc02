//! Training entry point and serving hooks for a linear regression model
//! running inside a managed ML training container.
//!
//! A training job:
//! 1. resolves its [`Config`] from the command line and the platform's
//!    `SM_*` environment variables,
//! 2. loads the pickled `[X, y]` pair from the train channel,
//! 3. fits an ordinary least-squares [`LinearRegression`],
//! 4. writes the fitted model to `<model_dir>/model.pickle`.
//!
//! Any failure along the way becomes a [`TrainingError`], which the `train`
//! binary turns into a `failure` artifact and exit status 255 through
//! [`FailureReport`]. The serving side reloads the artifact with
//! [`hooks::model_fn`] and predicts with [`hooks::predict_fn`].
//!
//! ```no_run
//! use linreg_entrypoint::{Config, Trainer};
//!
//! let config = Config::resolve(std::env::args_os(), |k| std::env::var(k).ok())?;
//! let model = Trainer::new(&config).train()?;
//! println!("coefficients: {}", model.coefficients());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod failure;
pub mod hooks;
pub mod model;
pub mod serialization;
pub mod trainer;

pub use config::{Config, ConfigError, Hyperparameters};
pub use error::{DatasetError, FitError, ModelError, TrainingError};
pub use failure::{FailureReport, FAILURE_EXIT_CODE};
pub use model::linear::{FittedLinearRegression, LinearRegression};
pub use model::{Fitted, InferenceModel, Unfitted};
pub use trainer::{Trainer, MODEL_FILENAME};
