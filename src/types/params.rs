//! Query parameter values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Query parameters keyed by name. Sorted so that URLs and cache keys are deterministic.
pub type QueryParams = BTreeMap<String, ParamValue>;

/// A single primitive query value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

/// A query value: either one primitive or a list serialized as one comma-joined segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    One(Scalar),
    Many(Vec<Scalar>),
}

impl ParamValue {
    /// Text form before percent-encoding. Lists are joined with `,`.
    pub fn to_query_text(&self) -> String {
        match self {
            ParamValue::One(s) => s.to_string(),
            ParamValue::Many(items) => items
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<i32> for Scalar {
    fn from(i: i32) -> Self {
        Scalar::Int(i as i64)
    }
}

impl From<u32> for Scalar {
    fn from(i: u32) -> Self {
        Scalar::Int(i as i64)
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Scalar::Float(x)
    }
}

macro_rules! param_value_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ParamValue {
                fn from(v: $t) -> Self {
                    ParamValue::One(v.into())
                }
            }

            impl From<Vec<$t>> for ParamValue {
                fn from(v: Vec<$t>) -> Self {
                    ParamValue::Many(v.into_iter().map(Into::into).collect())
                }
            }
        )*
    };
}

param_value_from!(&str, String, bool, i64, i32, u32, f64);

impl From<Scalar> for ParamValue {
    fn from(v: Scalar) -> Self {
        ParamValue::One(v)
    }
}
