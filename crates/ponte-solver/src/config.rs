//! Solver command configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A solver option value, coerced to its display form on the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Str(String),
    Int(i64),
    Float(f64),
}

impl std::fmt::Display for OptionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionValue::Str(s) => write!(f, "{}", s),
            OptionValue::Int(i) => write!(f, "{}", i),
            OptionValue::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Str(value.to_string())
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Float(value)
    }
}

/// How to invoke an AMPL-compatible solver executable.
///
/// The solver is called as `<executable> <stem>.nl -AMPL key=val...` inside
/// the working directory; it writes its result to `<stem>.sol` next to the
/// problem file. Neither file is deleted afterwards, which keeps failed
/// runs inspectable.
#[derive(Debug, Clone)]
pub struct SolverCommand {
    /// Path to the solver executable.
    pub executable: PathBuf,
    /// Options forwarded as `key=value` words, in key order.
    pub options: BTreeMap<String, OptionValue>,
    /// Directory holding the problem and result files.
    pub workdir: PathBuf,
    /// File stem of the problem/result pair.
    pub file_stem: String,
}

impl SolverCommand {
    /// Command for a solver executable with default workdir and stem.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            options: BTreeMap::new(),
            workdir: PathBuf::from("."),
            file_stem: "model".to_string(),
        }
    }

    /// Add or replace a solver option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Set the working directory for problem and result files.
    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = dir.into();
        self
    }

    /// Set the file stem (default `model`).
    pub fn with_file_stem(mut self, stem: impl Into<String>) -> Self {
        self.file_stem = stem.into();
        self
    }

    /// Render the options as `key=value` command-line words.
    pub fn option_args(&self) -> Vec<String> {
        self.options
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect()
    }

    /// Path of the NL problem file.
    pub fn problem_path(&self) -> PathBuf {
        self.workdir.join(format!("{}.nl", self.file_stem))
    }

    /// Path of the SOL result file.
    pub fn solution_path(&self) -> PathBuf {
        self.workdir.join(format!("{}.sol", self.file_stem))
    }

    /// The solver executable path.
    pub fn executable(&self) -> &Path {
        &self.executable
    }
}
