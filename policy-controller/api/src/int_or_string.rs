use serde::{Deserialize, Serialize};
use std::{fmt, num::ParseFloatError};

/// A number that policy authors may write either as an integer or as a decimal string, e.g. `2`
/// or `"1.9"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum IntOrString {
    Int(i32),
    String(String),
}

// === impl IntOrString ===

impl IntOrString {
    /// Reads the value as a decimal number.
    pub fn to_decimal(&self) -> Result<f64, ParseFloatError> {
        match self {
            Self::Int(i) => Ok(f64::from(*i)),
            Self::String(s) => s.trim().parse(),
        }
    }
}

impl From<i32> for IntOrString {
    fn from(i: i32) -> Self {
        Self::Int(i)
    }
}

impl From<&str> for IntOrString {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl fmt::Display for IntOrString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => i.fmt(f),
            Self::String(s) => s.fmt(f),
        }
    }
}
