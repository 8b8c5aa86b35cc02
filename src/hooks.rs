//! Serving hooks called by the inference container.
//!
//! `model_fn` loads the artifact written by training once per container,
//! `predict_fn` is called per request. Errors are returned to the serving
//! layer as-is.

use crate::error::ModelError;
use crate::model::linear::FittedLinearRegression;
use crate::model::InferenceModel;
use crate::trainer::MODEL_FILENAME;
use ndarray::{Array1, Array2};
use std::path::Path;

/// Loads the fitted model from `<model_dir>/model.pickle`.
pub fn model_fn<P: AsRef<Path>>(model_dir: P) -> Result<FittedLinearRegression, ModelError> {
    let path = model_dir.as_ref().join(MODEL_FILENAME);
    log::debug!("loading model from {}", path.display());
    FittedLinearRegression::load_from_file(path)
}

/// Predicts one target per row of `input`.
pub fn predict_fn(
    input: &Array2<f64>,
    model: &FittedLinearRegression,
) -> Result<Array1<f64>, ModelError> {
    model.predict(input)
}
