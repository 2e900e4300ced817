//! Deserializers shared by request DTOs.
//!
//! Query strings arrive as text, and `#[serde(flatten)]` buffers every value
//! as a string, so numeric and enum filters go through [`optional_from_str`].

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

/// Parses an optional value from its string form. Empty strings are `None`.
pub fn optional_from_str<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let opt: Option<StringOrNumber> = Option::deserialize(deserializer)?;
    match opt.map(StringOrNumber::into_string) {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.trim().parse::<T>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Trims surrounding whitespace. Empty strings are `None`.
pub fn trimmed_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Trims surrounding whitespace.
pub fn trimmed_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Int(i64),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            Self::String(s) => s,
            Self::Int(n) => n.to_string(),
        }
    }
}
