use ndarray::{Array1, Array2};

/// A fully materialized `(X, y)` pair.
///
/// `X` is a feature matrix of shape `(n_samples, n_features)` and `y` a
/// target vector. The two lengths are *not* required to agree here; that
/// check belongs to fitting, where a mismatch is a fitting error.
#[derive(Clone, Debug)]
pub struct InMemoryDataset {
    records: Array2<f64>,
    targets: Array1<f64>,
}

impl InMemoryDataset {
    pub fn new(records: Array2<f64>, targets: Array1<f64>) -> Self {
        Self { records, targets }
    }

    /// Builds a dataset from row-major feature rows.
    ///
    /// Fails if `rows` is empty or the rows do not all have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>, targets: Vec<f64>) -> Result<Self, String> {
        if rows.is_empty() {
            return Err("X has no rows".into());
        }
        let n_features = rows[0].len();
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != n_features)
        {
            return Err(format!(
                "row {} has {} features, expected {}",
                i,
                row.len(),
                n_features
            ));
        }

        let n_samples = rows.len();
        let data: Vec<f64> = rows.into_iter().flatten().collect();
        let records =
            Array2::from_shape_vec((n_samples, n_features), data).map_err(|e| e.to_string())?;
        Ok(Self::new(records, Array1::from(targets)))
    }

    pub fn records(&self) -> &Array2<f64> {
        &self.records
    }

    pub fn targets(&self) -> &Array1<f64> {
        &self.targets
    }

    pub fn n_samples(&self) -> usize {
        self.records.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.records.ncols()
    }

    /// Consumes the dataset, returning `(X, y)`.
    pub fn into_parts(self) -> (Array2<f64>, Array1<f64>) {
        (self.records, self.targets)
    }
}
