//! The training flow: load the train channel, fit, persist the artifact.

use crate::config::{Config, ENV_CHANNEL_TRAIN};
use crate::dataset::load_dataset;
use crate::error::TrainingError;
use crate::model::linear::{FittedLinearRegression, LinearRegression};
use crate::model::InferenceModel;

/// File name of the model artifact inside the model directory.
pub const MODEL_FILENAME: &str = "model.pickle";

/// Runs one training job against a resolved [`Config`].
///
/// The trainer never reads the process environment; everything it needs is
/// in the configuration it borrows.
pub struct Trainer<'a> {
    config: &'a Config,
}

impl<'a> Trainer<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Loads the train channel, fits a linear regression and writes it to
    /// `<model_dir>/model.pickle`, replacing any previous artifact.
    ///
    /// The fitted model is returned as well so callers can inspect it.
    pub fn train(&self) -> Result<FittedLinearRegression, TrainingError> {
        log::info!("Training mode");

        let train_dir = self
            .config
            .train
            .as_deref()
            .ok_or(TrainingError::MissingChannel {
                channel: "train",
                env_var: ENV_CHANNEL_TRAIN,
            })?;
        let dataset = load_dataset(train_dir)?;
        log::debug!(
            "loaded {} samples x {} features",
            dataset.n_samples(),
            dataset.n_features()
        );

        let hyperparameters = self.config.hyperparameters;
        log::debug!("hyperparameters: {:?}", hyperparameters);
        let estimator = LinearRegression::new().set_params(hyperparameters);

        log::info!("Training...");
        let model = estimator.fit(dataset)?;

        let model_dir = self
            .config
            .model_dir
            .as_deref()
            .ok_or(TrainingError::MissingModelDir)?;
        let artifact = model_dir.join(MODEL_FILENAME);
        model.save_to_file(&artifact)?;
        log::info!("Model saved to {}", artifact.display());

        Ok(model)
    }
}
