//! Lenient field decoders for action input.
//!
//! Form posts and query strings carry every value as text, while JSON clients
//! send real numbers and booleans. These helpers accept either form:
//!
//! ```ignore
//! #[derive(Deserialize)]
//! struct Input {
//!     #[serde(deserialize_with = "input::number")]
//!     page: usize,
//!     #[serde(default, deserialize_with = "input::optional_flag")]
//!     editing: Option<bool>,
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Value(T),
    Text(String),
}

/// A number given natively or as text (`2` or `"2"`).
pub fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    match Lenient::<T>::deserialize(deserializer)? {
        Lenient::Value(value) => Ok(value),
        Lenient::Text(text) => text
            .trim()
            .parse()
            .map_err(|e| de::Error::custom(format!("invalid number '{}': {}", text, e))),
    }
}

/// A boolean given natively or as text. Text accepts `true`/`false`,
/// `on`/`off` and `1`/`0`, ignoring case.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Lenient::<bool>::deserialize(deserializer)? {
        Lenient::Value(value) => Ok(value),
        Lenient::Text(text) => parse_flag(&text)
            .ok_or_else(|| de::Error::custom(format!("invalid flag '{}'", text))),
    }
}

/// Like [`flag`], but `null` and empty text mean "not given".
pub fn optional_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Lenient<bool>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Lenient::Value(value)) => Ok(Some(value)),
        Some(Lenient::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Lenient::Text(text)) => parse_flag(&text)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid flag '{}'", text))),
    }
}

fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" => Some(true),
        "false" | "off" | "0" => Some(false),
        _ => None,
    }
}
