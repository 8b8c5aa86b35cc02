//! Run configuration: hyperparameters and filesystem locations.
//!
//! A [`Config`] is resolved exactly once, at startup, from the command line
//! with fallbacks to the variables the training platform exports:
//!
//! | Field            | CLI flag          | Fallback                  | Default          |
//! |------------------|-------------------|---------------------------|------------------|
//! | `copy_x`         | `--copy_X`        | `SM_HPS["copy_X"]`        | `true`           |
//! | `fit_intercept`  | `--fit_intercept` | `SM_HPS["fit_intercept"]` | `true`           |
//! | `normalize`      | `--normalize`     | `SM_HPS["normalize"]`     | `false`          |
//! | `train`          | `--train`         | `SM_CHANNEL_TRAIN`        | none             |
//! | `test`           | `--test`          | `SM_CHANNEL_TEST`         | none             |
//! | `model_dir`      | `--model_dir`     | `SM_MODEL_DIR`            | none             |
//! | `output_dir`     | `--output_dir`    | `SM_OUTPUT_DIR`           | `/opt/ml/output` |
//!
//! The environment is injected as a lookup function so nothing below the
//! entry point touches process state. Arguments the resolver does not know
//! are dropped before parsing, the way the platform expects scripts to
//! tolerate extra hyperparameters.

use clap::{ArgAction, Parser};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;

pub const ENV_CHANNEL_TRAIN: &str = "SM_CHANNEL_TRAIN";
pub const ENV_CHANNEL_TEST: &str = "SM_CHANNEL_TEST";
pub const ENV_MODEL_DIR: &str = "SM_MODEL_DIR";
pub const ENV_OUTPUT_DIR: &str = "SM_OUTPUT_DIR";
/// JSON object holding every hyperparameter of the job.
pub const ENV_HYPERPARAMETERS: &str = "SM_HPS";

pub const DEFAULT_OUTPUT_DIR: &str = "/opt/ml/output";

/// Long flags understood by the resolver, without the leading `--`.
const KNOWN_FLAGS: &[&str] = &[
    "copy_X",
    "fit_intercept",
    "normalize",
    "train",
    "test",
    "model_dir",
    "output_dir",
];

/// Flags that never take a value.
const SWITCHES: &[&str] = &["--help", "-h"];

/// Estimator settings fixed before fitting.
///
/// Field names follow Rust conventions; the CLI and `SM_HPS` keys use the
/// platform spelling (`copy_X`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Scale a copy of the records instead of the owned records in place.
    pub copy_x: bool,
    /// Learn an intercept term.
    pub fit_intercept: bool,
    /// Scale columns to unit norm before the solve (only with an intercept).
    pub normalize: bool,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            copy_x: true,
            fit_intercept: true,
            normalize: false,
        }
    }
}

/// Resolved configuration of one training run.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub hyperparameters: Hyperparameters,
    /// Directory of the train channel.
    pub train: Option<PathBuf>,
    /// Directory of the test channel. Resolved but not loaded by training.
    pub test: Option<PathBuf>,
    /// Directory that receives `model.pickle`.
    pub model_dir: Option<PathBuf>,
    /// Directory that receives the `failure` artifact.
    pub output_dir: PathBuf,
}

#[derive(Parser, Debug)]
#[command(
    name = "train",
    about = "Fit a linear regression on the train channel and save it to the model directory"
)]
struct Cli {
    #[arg(long = "copy_X", value_name = "BOOL", action = ArgAction::Set, value_parser = parse_bool)]
    copy_x: Option<bool>,

    #[arg(long = "fit_intercept", value_name = "BOOL", action = ArgAction::Set, value_parser = parse_bool)]
    fit_intercept: Option<bool>,

    #[arg(long = "normalize", value_name = "BOOL", action = ArgAction::Set, value_parser = parse_bool)]
    normalize: Option<bool>,

    /// Train channel directory [env: SM_CHANNEL_TRAIN]
    #[arg(long = "train", value_name = "DIR")]
    train: Option<PathBuf>,

    /// Test channel directory [env: SM_CHANNEL_TEST]
    #[arg(long = "test", value_name = "DIR")]
    test: Option<PathBuf>,

    /// Model output directory [env: SM_MODEL_DIR]
    #[arg(long = "model_dir", value_name = "DIR")]
    model_dir: Option<PathBuf>,

    /// Failure artifact directory [env: SM_OUTPUT_DIR]
    #[arg(long = "output_dir", value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

/// Errors raised while resolving the configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The command line could not be parsed (also carries `--help` output).
    Usage(clap::Error),
    /// The platform hyperparameter variable is not usable.
    InvalidHyperparameters { var: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Usage(e) => write!(f, "{}", e),
            ConfigError::InvalidHyperparameters { var, reason } => {
                write!(f, "invalid {}: {}", var, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Usage(e) => Some(e),
            ConfigError::InvalidHyperparameters { .. } => None,
        }
    }
}

impl Config {
    /// Resolves the configuration from `args` (including the program name)
    /// and an environment lookup.
    ///
    /// # Errors
    /// - [`ConfigError::Usage`] for malformed flag values or `--help`.
    /// - [`ConfigError::InvalidHyperparameters`] if `SM_HPS` is not a JSON
    ///   object or holds a non-boolean value for a known hyperparameter.
    pub fn resolve<I, T, E>(args: I, env: E) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
        E: Fn(&str) -> Option<String>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let (known, ignored) = split_known_args(&args);
        if !ignored.is_empty() {
            log::debug!("ignoring unrecognized arguments: {:?}", ignored);
        }
        let cli = Cli::try_parse_from(known).map_err(ConfigError::Usage)?;

        let platform = match env(ENV_HYPERPARAMETERS) {
            Some(raw) => PlatformHyperparameters::from_json(&raw)?,
            None => PlatformHyperparameters::default(),
        };
        let defaults = Hyperparameters::default();
        let hyperparameters = Hyperparameters {
            copy_x: cli.copy_x.or(platform.copy_x).unwrap_or(defaults.copy_x),
            fit_intercept: cli
                .fit_intercept
                .or(platform.fit_intercept)
                .unwrap_or(defaults.fit_intercept),
            normalize: cli
                .normalize
                .or(platform.normalize)
                .unwrap_or(defaults.normalize),
        };

        let env_path = |var: &str| env(var).filter(|v| !v.is_empty()).map(PathBuf::from);

        Ok(Self {
            hyperparameters,
            train: cli.train.or_else(|| env_path(ENV_CHANNEL_TRAIN)),
            test: cli.test.or_else(|| env_path(ENV_CHANNEL_TEST)),
            model_dir: cli.model_dir.or_else(|| env_path(ENV_MODEL_DIR)),
            output_dir: cli
                .output_dir
                .or_else(|| env_path(ENV_OUTPUT_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        })
    }
}

/// Hyperparameters found in `SM_HPS`; `None` where the key is absent.
#[derive(Debug, Default)]
struct PlatformHyperparameters {
    copy_x: Option<bool>,
    fit_intercept: Option<bool>,
    normalize: Option<bool>,
}

impl PlatformHyperparameters {
    fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidHyperparameters {
            var: ENV_HYPERPARAMETERS,
            reason,
        };
        let value: Value = serde_json::from_str(raw).map_err(|e| invalid(e.to_string()))?;
        let map = value
            .as_object()
            .ok_or_else(|| invalid(format!("expected a JSON object, got {}", value)))?;

        let field = |key: &str| -> Result<Option<bool>, ConfigError> {
            match map.get(key) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::Bool(b)) => Ok(Some(*b)),
                Some(Value::String(s)) => parse_bool(s)
                    .map(Some)
                    .map_err(|e| invalid(format!("{}: {}", key, e))),
                Some(Value::Number(n)) => match n.as_i64() {
                    Some(0) => Ok(Some(false)),
                    Some(1) => Ok(Some(true)),
                    _ => Err(invalid(format!("{}: expected a boolean, got {}", key, n))),
                },
                Some(other) => Err(invalid(format!("{}: expected a boolean, got {}", key, other))),
            }
        };

        Ok(Self {
            copy_x: field("copy_X")?,
            fit_intercept: field("fit_intercept")?,
            normalize: field("normalize")?,
        })
    }
}

/// Parses a boolean hyperparameter value.
///
/// Accepts `true/false`, `1/0`, `yes/no`, `t/f` and `y/n` in any case.
pub fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "t" | "y" => Ok(true),
        "false" | "0" | "no" | "f" | "n" => Ok(false),
        _ => Err(format!("'{}' is not a boolean", raw)),
    }
}

/// Splits `args` into the arguments the CLI understands and the rest.
///
/// The program name is always kept. An unknown `--flag` swallows the
/// following token when that token is not itself a flag. Arguments that are
/// not valid UTF-8 can only be values, never flags.
fn split_known_args(args: &[OsString]) -> (Vec<OsString>, Vec<OsString>) {
    let mut known = Vec::with_capacity(args.len());
    let mut ignored = Vec::new();

    let mut iter = args.iter().peekable();
    known.push(
        iter.next()
            .cloned()
            .unwrap_or_else(|| OsString::from("train")),
    );

    while let Some(arg) = iter.next() {
        let text = arg.to_str().unwrap_or_default();
        if SWITCHES.contains(&text) {
            known.push(arg.clone());
            continue;
        }

        let Some(flag) = text.strip_prefix("--") else {
            ignored.push(arg.clone());
            continue;
        };
        let (name, inline_value) = match flag.split_once('=') {
            Some((name, _)) => (name, true),
            None => (flag, false),
        };
        let bucket = if KNOWN_FLAGS.contains(&name) {
            &mut known
        } else {
            &mut ignored
        };
        bucket.push(arg.clone());
        if !inline_value {
            if let Some(value) = iter.next_if(|next| !is_flag(next)) {
                bucket.push(value.clone());
            }
        }
    }

    (known, ignored)
}

fn is_flag(arg: &OsStr) -> bool {
    arg.to_str().is_some_and(|text| text.starts_with("--"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn no_env() -> impl Fn(&str) -> Option<String> {
        env_from(&[])
    }

    fn resolve(args: &[&str], env: impl Fn(&str) -> Option<String>) -> Config {
        let mut argv = vec!["train"];
        argv.extend_from_slice(args);
        Config::resolve(argv, env).unwrap()
    }

    // === Hyperparameters ===

    #[test]
    fn test_hyperparameter_defaults() {
        let config = resolve(&[], no_env());
        assert_eq!(config.hyperparameters, Hyperparameters::default());
        assert!(config.hyperparameters.copy_x);
        assert!(config.hyperparameters.fit_intercept);
        assert!(!config.hyperparameters.normalize);
    }

    #[test]
    fn test_hyperparameters_from_platform_json() {
        let env = env_from(&[(
            "SM_HPS",
            r#"{"copy_X": false, "fit_intercept": "False", "normalize": 1, "epochs": 10}"#,
        )]);
        let config = resolve(&[], env);
        assert!(!config.hyperparameters.copy_x);
        assert!(!config.hyperparameters.fit_intercept);
        assert!(config.hyperparameters.normalize);
    }

    #[test]
    fn test_cli_hyperparameters_override_platform_json() {
        let env = env_from(&[(
            "SM_HPS",
            r#"{"copy_X": true, "fit_intercept": true, "normalize": false}"#,
        )]);
        let config = resolve(
            &["--copy_X", "false", "--fit_intercept=False", "--normalize", "yes"],
            env,
        );
        assert!(!config.hyperparameters.copy_x);
        assert!(!config.hyperparameters.fit_intercept);
        assert!(config.hyperparameters.normalize);
    }

    #[test]
    fn test_partial_platform_json_keeps_defaults() {
        let env = env_from(&[("SM_HPS", r#"{"normalize": true}"#)]);
        let config = resolve(&[], env);
        assert!(config.hyperparameters.copy_x);
        assert!(config.hyperparameters.fit_intercept);
        assert!(config.hyperparameters.normalize);
    }

    #[test]
    fn test_malformed_platform_json_is_rejected() {
        let err = Config::resolve(["train"], env_from(&[("SM_HPS", "not json")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHyperparameters { .. }));
    }

    #[test]
    fn test_non_boolean_platform_value_is_rejected() {
        let env = env_from(&[("SM_HPS", r#"{"fit_intercept": [1, 2]}"#)]);
        let err = Config::resolve(["train"], env).unwrap_err();
        assert!(err.to_string().contains("fit_intercept"));
    }

    #[test]
    fn test_malformed_cli_boolean_is_usage_error() {
        let err = Config::resolve(["train", "--normalize", "maybe"], no_env()).unwrap_err();
        assert!(matches!(err, ConfigError::Usage(_)));
    }

    // === Paths ===

    #[test]
    fn test_paths_default_when_nothing_is_set() {
        let config = resolve(&[], no_env());
        assert_eq!(config.train, None);
        assert_eq!(config.test, None);
        assert_eq!(config.model_dir, None);
        assert_eq!(config.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
    }

    #[test]
    fn test_paths_fall_back_to_environment() {
        let env = env_from(&[
            ("SM_CHANNEL_TRAIN", "/opt/ml/input/data/train"),
            ("SM_CHANNEL_TEST", "/opt/ml/input/data/test"),
            ("SM_MODEL_DIR", "/opt/ml/model"),
            ("SM_OUTPUT_DIR", "/tmp/output"),
        ]);
        let config = resolve(&[], env);
        assert_eq!(config.train, Some(PathBuf::from("/opt/ml/input/data/train")));
        assert_eq!(config.test, Some(PathBuf::from("/opt/ml/input/data/test")));
        assert_eq!(config.model_dir, Some(PathBuf::from("/opt/ml/model")));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/output"));
    }

    #[test]
    fn test_cli_paths_override_environment() {
        let env = env_from(&[
            ("SM_CHANNEL_TRAIN", "/env/train"),
            ("SM_CHANNEL_TEST", "/env/test"),
            ("SM_MODEL_DIR", "/env/model"),
            ("SM_OUTPUT_DIR", "/env/output"),
        ]);
        let config = resolve(
            &[
                "--train",
                "/cli/train",
                "--test=/cli/test",
                "--model_dir",
                "/cli/model",
                "--output_dir",
                "/cli/output",
            ],
            env,
        );
        assert_eq!(config.train, Some(PathBuf::from("/cli/train")));
        assert_eq!(config.test, Some(PathBuf::from("/cli/test")));
        assert_eq!(config.model_dir, Some(PathBuf::from("/cli/model")));
        assert_eq!(config.output_dir, PathBuf::from("/cli/output"));
    }

    #[test]
    fn test_empty_environment_value_counts_as_unset() {
        let config = resolve(&[], env_from(&[("SM_MODEL_DIR", "")]));
        assert_eq!(config.model_dir, None);
    }

    // === Unknown arguments ===

    #[test]
    fn test_unknown_arguments_are_ignored() {
        let config = resolve(
            &[
                "--epochs",
                "10",
                "--train",
                "/data",
                "--verbose",
                "stray",
                "--learning-rate=0.1",
            ],
            no_env(),
        );
        assert_eq!(config.train, Some(PathBuf::from("/data")));
    }

    #[test]
    fn test_unknown_flag_does_not_swallow_known_flag() {
        let config = resolve(&["--dry-run", "--model_dir", "/m"], no_env());
        assert_eq!(config.model_dir, Some(PathBuf::from("/m")));
    }

    #[test]
    fn test_split_known_args() {
        let args: Vec<OsString> = ["train", "--foo", "1", "--normalize", "true", "bar"]
            .iter()
            .map(OsString::from)
            .collect();
        let (known, ignored) = split_known_args(&args);
        assert_eq!(known, vec!["train", "--normalize", "true"]);
        assert_eq!(ignored, vec!["--foo", "1", "bar"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_path_is_accepted() {
        use std::os::unix::ffi::OsStrExt;

        let raw = OsStr::from_bytes(b"/data/tr\xffin");
        let args = vec![
            OsString::from("train"),
            OsString::from("--train"),
            raw.to_os_string(),
            OsString::from("--epochs"),
            OsStr::from_bytes(b"\xfe").to_os_string(),
        ];
        let config = Config::resolve(args, no_env()).unwrap();
        assert_eq!(config.train, Some(PathBuf::from(raw)));
    }

    // === parse_bool ===

    #[test]
    fn test_parse_bool_accepts_common_spellings() {
        for raw in ["true", "True", "TRUE", "1", "yes", "t", "Y"] {
            assert_eq!(parse_bool(raw), Ok(true), "{}", raw);
        }
        for raw in ["false", "False", "0", "no", "f", "N"] {
            assert_eq!(parse_bool(raw), Ok(false), "{}", raw);
        }
    }

    #[test]
    fn test_parse_bool_rejects_garbage() {
        assert!(parse_bool("2").is_err());
        assert!(parse_bool("").is_err());
    }
}
