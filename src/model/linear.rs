//! Ordinary least-squares linear regression.
//!
//! This module implements a type-safe linear model with compile-time state tracking:
//! - [`LinearRegression`] = `LinearModel<Unfitted>`: configured with
//!   [`Hyperparameters`] and fitted once.
//! - [`FittedLinearRegression`] = `LinearModel<Fitted>`: predicts and is
//!   persisted as a model artifact.
//!
//! The least-squares solve itself is delegated to `linfa-linear`. This module
//! only prepares the design matrix (optional column normalization) and maps
//! the solution back to the original feature scale.

use crate::config::Hyperparameters;
use crate::dataset::InMemoryDataset;
use crate::error::{FitError, ModelError};
pub use crate::model::{Fitted, InferenceModel, Unfitted};
use linfa::traits::Fit;
use linfa::DatasetBase;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Learned parameters of a linear model: `y = X · coefficients + intercept`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinearParams {
    pub coefficients: Array1<f64>,
    pub intercept: f64,
}

/// Serializable representation of a fitted linear model.
///
/// Stored as a pickle dict with the keys `coefficients`, `intercept` and
/// `hyperparameters`. Floats are kept as `f64` so a save/load round trip is
/// exact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializableLinearParams {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub hyperparameters: Hyperparameters,
}

/// A linear model with state encoded at the type level.
///
/// - When `S = Unfitted`: exposes hyperparameter setters and [`LinearModel::fit`].
/// - When `S = Fitted`: implements [`InferenceModel`] for prediction and persistence.
///
/// This enforces, at compile time, that you cannot call `predict()` on an untrained model.
#[derive(Clone, Debug)]
pub struct LinearModel<S> {
    hyperparameters: Hyperparameters,
    params: LinearParams,
    _state: PhantomData<S>,
}

/// Alias for an **unfitted** linear regression estimator.
pub type LinearRegression = LinearModel<Unfitted>;

/// Alias for a **fitted** linear regression model.
pub type FittedLinearRegression = LinearModel<Fitted>;

impl<S> LinearModel<S> {
    /// Hyperparameters the model was (or will be) fitted with.
    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.hyperparameters
    }
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    /// Creates an estimator with default hyperparameters
    /// (`copy_x = true`, `fit_intercept = true`, `normalize = false`).
    pub fn new() -> Self {
        Self::with_hyperparameters(Hyperparameters::default())
    }

    pub fn with_hyperparameters(hyperparameters: Hyperparameters) -> Self {
        Self {
            hyperparameters,
            params: LinearParams::default(),
            _state: PhantomData,
        }
    }

    /// Replaces all hyperparameters at once.
    pub fn set_params(mut self, hyperparameters: Hyperparameters) -> Self {
        self.hyperparameters = hyperparameters;
        self
    }

    pub fn copy_x(mut self, copy_x: bool) -> Self {
        self.hyperparameters.copy_x = copy_x;
        self
    }

    pub fn fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.hyperparameters.fit_intercept = fit_intercept;
        self
    }

    pub fn normalize(mut self, normalize: bool) -> Self {
        self.hyperparameters.normalize = normalize;
        self
    }

    /// Fits the model to `dataset`, consuming both.
    ///
    /// With `fit_intercept`, records and targets are centered on their means
    /// and the intercept is recovered as `mean(y) - mean(X) · coefficients`.
    /// The solve is minimum-norm, so directions without variance (a constant
    /// column, a single sample) get a zero coefficient.
    ///
    /// With `normalize` (and `fit_intercept`), every centered column is also
    /// divided by its L2 norm before the solve and the learned coefficients
    /// are rescaled afterwards, so predictions stay on the original feature
    /// scale. Without an intercept `normalize` has no effect.
    ///
    /// `copy_x` chooses between centering a copy of the records and centering
    /// them in place.
    ///
    /// # Errors
    /// - [`FitError::ShapeMismatch`] if `X` and `y` have different lengths.
    /// - [`FitError::Solver`] if the least-squares problem cannot be solved.
    pub fn fit(self, dataset: InMemoryDataset) -> Result<FittedLinearRegression, FitError> {
        let hp = self.hyperparameters;
        let (records, targets) = dataset.into_parts();
        if records.nrows() != targets.len() {
            return Err(FitError::ShapeMismatch {
                samples: records.nrows(),
                targets: targets.len(),
            });
        }
        if hp.normalize && !hp.fit_intercept {
            log::debug!("normalize is ignored when fit_intercept is false");
        }

        let (records, targets, offsets, norms) = if hp.fit_intercept {
            let x_offset = records
                .mean_axis(Axis(0))
                .unwrap_or_else(|| Array1::zeros(records.ncols()));
            let y_offset = targets.mean().unwrap_or(0.0);

            let mut records = if hp.copy_x {
                &records - &x_offset
            } else {
                let mut records = records;
                records -= &x_offset;
                records
            };
            let norms = if hp.normalize {
                let norms = column_norms(&records);
                records /= &norms;
                Some(norms)
            } else {
                None
            };
            (records, targets - y_offset, Some((x_offset, y_offset)), norms)
        } else {
            (records, targets, None, None)
        };

        log::debug!(
            "solving least squares for {} samples x {} features",
            records.nrows(),
            records.ncols()
        );
        let solution = linfa_linear::LinearRegression::new()
            .with_intercept(false)
            .fit(&DatasetBase::new(records, targets))?;

        let mut coefficients = solution.params().to_owned();
        if let Some(norms) = &norms {
            coefficients /= norms;
        }
        let intercept = match &offsets {
            Some((x_offset, y_offset)) => y_offset - x_offset.dot(&coefficients),
            None => 0.0,
        };

        Ok(LinearModel::<Fitted>::new(
            LinearParams {
                coefficients,
                intercept,
            },
            hp,
        ))
    }
}

impl FittedLinearRegression {
    /// Creates a fitted model from learned parameters.
    pub fn new(params: LinearParams, hyperparameters: Hyperparameters) -> Self {
        Self {
            hyperparameters,
            params,
            _state: PhantomData,
        }
    }

    pub fn coefficients(&self) -> &Array1<f64> {
        &self.params.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.params.intercept
    }

    pub fn n_features(&self) -> usize {
        self.params.coefficients.len()
    }
}

/// Implements inference for a trained linear model: `y = X · w + b`.
///
/// Serialization uses [`SerializableLinearParams`] (see `save_to_file`/`load_from_file`).
impl InferenceModel for FittedLinearRegression {
    type Input = Array2<f64>;
    type Output = Array1<f64>;
    type ParamsRepr = SerializableLinearParams;

    fn predict(&self, input: &Self::Input) -> Result<Self::Output, ModelError> {
        if input.ncols() != self.n_features() {
            return Err(ModelError::FeatureMismatch {
                expected_features: self.n_features(),
                got_features: input.ncols(),
            });
        }
        Ok(input.dot(&self.params.coefficients) + self.params.intercept)
    }

    fn extract_params(&self) -> Self::ParamsRepr {
        SerializableLinearParams {
            coefficients: self.params.coefficients.to_vec(),
            intercept: self.params.intercept,
            hyperparameters: self.hyperparameters,
        }
    }

    fn from_params(params: Self::ParamsRepr) -> Result<Self, ModelError> {
        if !params.hyperparameters.fit_intercept && params.intercept != 0.0 {
            return Err(ModelError::InvalidParams(format!(
                "intercept {} stored for a model fitted without intercept",
                params.intercept
            )));
        }
        Ok(Self::new(
            LinearParams {
                coefficients: Array1::from(params.coefficients),
                intercept: params.intercept,
            },
            params.hyperparameters,
        ))
    }
}

/// L2 norm of every column; zero norms become 1.
fn column_norms(records: &Array2<f64>) -> Array1<f64> {
    records.map_axis(Axis(0), |column| {
        let norm = column.dot(&column).sqrt();
        if norm == 0.0 {
            1.0
        } else {
            norm
        }
    })
}
