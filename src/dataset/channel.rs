//! Loading a dataset from a platform data channel.
//!
//! A channel is a directory. Every entry whose name ends with
//! [`DATASET_SUFFIX`] is a candidate; the first one in directory listing
//! order is loaded. Listing order is filesystem-dependent, so when several
//! candidates exist the chosen file is not deterministic across platforms.

use crate::dataset::InMemoryDataset;
use crate::error::DatasetError;
use serde_pickle::{DeOptions, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix identifying dataset files inside a channel directory.
pub const DATASET_SUFFIX: &str = "pickle";

/// Lists the dataset files of a channel in directory listing order.
pub fn find_dataset_files(dir: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    let io_err = |source| DatasetError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if entry
            .file_name()
            .to_string_lossy()
            .ends_with(DATASET_SUFFIX)
        {
            files.push(entry.path());
        }
    }
    Ok(files)
}

/// Loads the `[X, y]` pair stored in a channel directory.
///
/// # Errors
/// - [`DatasetError::InvalidInput`] if no file ends with [`DATASET_SUFFIX`].
/// - [`DatasetError::Io`] if the directory or the file cannot be read.
/// - [`DatasetError::Deserialize`] if the file is not a pickle stream.
/// - [`DatasetError::Malformed`] if the pickle is not a two-element
///   sequence of a numeric matrix and a numeric vector.
pub fn load_dataset<P: AsRef<Path>>(dir: P) -> Result<InMemoryDataset, DatasetError> {
    let dir = dir.as_ref();
    let files = find_dataset_files(dir)?;
    let Some(path) = files.first() else {
        return Err(DatasetError::InvalidInput {
            dir: dir.to_path_buf(),
        });
    };
    if files.len() > 1 {
        log::debug!(
            "{} dataset files in {}, loading {}",
            files.len(),
            dir.display(),
            path.display()
        );
    }

    log::info!("Loading dataset from {}", path.display());
    let bytes = fs::read(path).map_err(|source| DatasetError::Io {
        path: path.clone(),
        source,
    })?;
    decode_dataset(path, &bytes)
}

/// Decodes a pickled `[X, y]` pair.
pub(crate) fn decode_dataset(path: &Path, bytes: &[u8]) -> Result<InMemoryDataset, DatasetError> {
    let value =
        serde_pickle::value_from_slice(bytes, DeOptions::new()).map_err(|source| {
            DatasetError::Deserialize {
                path: path.to_path_buf(),
                source,
            }
        })?;
    let malformed = |reason: String| DatasetError::Malformed {
        path: path.to_path_buf(),
        reason,
    };

    let (x, y) = unpack_pair(value).map_err(malformed)?;
    let rows = to_rows(x).map_err(malformed)?;
    let targets = to_numbers(y, "y").map_err(malformed)?;
    InMemoryDataset::from_rows(rows, targets).map_err(malformed)
}

fn unpack_pair(value: Value) -> Result<(Value, Value), String> {
    match value {
        Value::List(items) | Value::Tuple(items) => {
            let n = items.len();
            let mut items = items.into_iter();
            match (items.next(), items.next(), items.next()) {
                (Some(x), Some(y), None) => Ok((x, y)),
                _ => Err(format!(
                    "expected a two-element [X, y] sequence, got {} elements",
                    n
                )),
            }
        }
        other => Err(format!(
            "expected a two-element [X, y] sequence, got {}",
            kind(&other)
        )),
    }
}

fn to_rows(value: Value) -> Result<Vec<Vec<f64>>, String> {
    match value {
        Value::List(rows) | Value::Tuple(rows) => rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| to_numbers(row, &format!("X[{}]", i)))
            .collect(),
        other => Err(format!("X: expected a sequence of rows, got {}", kind(&other))),
    }
}

fn to_numbers(value: Value, what: &str) -> Result<Vec<f64>, String> {
    match value {
        Value::List(items) | Value::Tuple(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| to_number(item).map_err(|e| format!("{}[{}]: {}", what, i, e)))
            .collect(),
        other => Err(format!("{}: expected a sequence, got {}", what, kind(&other))),
    }
}

fn to_number(value: Value) -> Result<f64, String> {
    match value {
        Value::F64(v) => Ok(v),
        Value::I64(v) => Ok(v as f64),
        Value::Bool(v) => Ok(if v { 1.0 } else { 0.0 }),
        other => Err(format!("expected a number, got {}", kind(&other))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::None => "None",
        Value::Bool(_) => "bool",
        Value::I64(_) | Value::Int(_) => "int",
        Value::F64(_) => "float",
        Value::Bytes(_) => "bytes",
        Value::String(_) => "str",
        Value::List(_) => "list",
        Value::Tuple(_) => "tuple",
        Value::Dict(_) => "dict",
        _ => "set",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use serde_pickle::SerOptions;
    use tempfile::tempdir;

    /// `pickle.dumps([[[1], [2], [3]], [2, 4, 6]], protocol=2)`
    const PYTHON_PICKLE: &[u8] =
        b"\x80\x02]q\x00(]q\x01(]q\x02K\x01a]q\x03K\x02a]q\x04K\x03ae]q\x05(K\x02K\x04K\x06ee.";

    fn pickle_pair(x: Vec<Vec<f64>>, y: Vec<f64>) -> Vec<u8> {
        serde_pickle::to_vec(&(x, y), SerOptions::new()).unwrap()
    }

    fn pickle_value(value: &Value) -> Vec<u8> {
        serde_pickle::value_to_vec(value, SerOptions::new()).unwrap()
    }

    #[test]
    fn test_empty_dir_is_invalid_input() {
        let dir = tempdir().unwrap();
        let err = load_dataset(dir.path()).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidInput { .. }));
        assert_eq!(
            err.to_string(),
            format!("Invalid # of files in dir: {}", dir.path().display())
        );
    }

    #[test]
    fn test_dir_without_matching_suffix_is_invalid_input() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("data.csv"), "1,2\n").unwrap();
        fs::write(dir.path().join("pickle.txt"), "nope").unwrap();
        let err = load_dataset(dir.path()).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidInput { .. }));
    }

    #[test]
    fn test_missing_dir_is_io_error() {
        let dir = tempdir().unwrap();
        let err = load_dataset(dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }

    #[test]
    fn test_loads_python_written_pickle() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("data.pickle"), PYTHON_PICKLE).unwrap();

        let ds = load_dataset(dir.path()).unwrap();
        assert_eq!(ds.records(), &array![[1.0], [2.0], [3.0]]);
        assert_eq!(ds.targets(), &array![2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_suffix_match_is_not_extension_match() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("train_pickle"), PYTHON_PICKLE).unwrap();
        let ds = load_dataset(dir.path()).unwrap();
        assert_eq!(ds.n_samples(), 3);
    }

    #[test]
    fn test_multiple_candidates_load_one_of_them() {
        let dir = tempdir().unwrap();
        let a = pickle_pair(vec![vec![1.0]], vec![10.0]);
        let b = pickle_pair(vec![vec![2.0], vec![3.0]], vec![20.0, 30.0]);
        fs::write(dir.path().join("a.pickle"), a).unwrap();
        fs::write(dir.path().join("b.pickle"), b).unwrap();

        assert_eq!(find_dataset_files(dir.path()).unwrap().len(), 2);
        // Which file wins depends on listing order.
        let ds = load_dataset(dir.path()).unwrap();
        assert!(ds.n_samples() == 1 || ds.n_samples() == 2);
        assert_eq!(ds.n_samples(), ds.targets().len());
    }

    #[test]
    fn test_tuple_pair_is_accepted() {
        let bytes = pickle_pair(vec![vec![1.5, 2.5]], vec![0.5]);
        let ds = decode_dataset(Path::new("t.pickle"), &bytes).unwrap();
        assert_eq!(ds.records(), &array![[1.5, 2.5]]);
    }

    #[test]
    fn test_three_element_sequence_is_malformed() {
        let value = Value::List(vec![
            Value::List(vec![Value::List(vec![Value::I64(1)])]),
            Value::List(vec![Value::I64(1)]),
            Value::None,
        ]);
        let err = decode_dataset(Path::new("x.pickle"), &pickle_value(&value)).unwrap_err();
        assert!(matches!(err, DatasetError::Malformed { .. }));
        assert!(err.to_string().contains("3 elements"));
    }

    #[test]
    fn test_non_numeric_target_is_malformed() {
        let value = Value::List(vec![
            Value::List(vec![Value::List(vec![Value::F64(1.0)])]),
            Value::List(vec![Value::String("one".into())]),
        ]);
        let err = decode_dataset(Path::new("x.pickle"), &pickle_value(&value)).unwrap_err();
        assert!(err.to_string().contains("y[0]"));
    }

    #[test]
    fn test_ragged_rows_are_malformed() {
        let value = Value::Tuple(vec![
            Value::List(vec![
                Value::List(vec![Value::F64(1.0), Value::F64(2.0)]),
                Value::List(vec![Value::F64(3.0)]),
            ]),
            Value::List(vec![Value::F64(1.0), Value::F64(2.0)]),
        ]);
        let err = decode_dataset(Path::new("x.pickle"), &pickle_value(&value)).unwrap_err();
        assert!(matches!(err, DatasetError::Malformed { .. }));
    }

    #[test]
    fn test_numpy_array_pickle_fails_to_deserialize() {
        // Start of `pickle.dumps(np.array([1.0]), protocol=2)`.
        let bytes = b"\x80\x02cnumpy.core.multiarray\n_reconstruct\nq\x00.";
        let err = decode_dataset(Path::new("np.pickle"), bytes).unwrap_err();
        assert!(matches!(err, DatasetError::Deserialize { .. }));
    }

    #[test]
    fn test_garbage_bytes_fail_to_deserialize() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.pickle"), b"\x80\x02garbage").unwrap();
        let err = load_dataset(dir.path()).unwrap_err();
        assert!(matches!(err, DatasetError::Deserialize { .. }));
    }
}
