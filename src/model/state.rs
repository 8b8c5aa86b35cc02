/// A marker type indicating that a model is **not yet trained**.
///
/// Used as the state parameter of [`LinearModel`](crate::model::linear::LinearModel):
/// - Hyperparameters can be set and `fit` can be called.
/// - `predict` is **not available** until fitting produces a `Fitted` model.
#[derive(Clone, Copy, Debug)]
pub struct Unfitted;

/// A marker type indicating that a model has been **fully trained**.
///
/// A `Fitted` model implements [`InferenceModel`](crate::model::InferenceModel):
/// it can predict and be saved to or loaded from a model artifact.
#[derive(Clone, Copy, Debug)]
pub struct Fitted;
