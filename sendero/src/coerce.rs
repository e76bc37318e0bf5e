//! Lenient conversions for query and path values.

use serde::{Deserialize, Deserializer, de};

/// Parses a boolean the way HTML forms and hand-typed URLs spell it.
///
/// `1`, `true`, `on` and `yes` are true; `0`, `false`, `off` and `no` are
/// false. Case is ignored.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// `deserialize_with` adapter for [`parse_flag`].
///
/// ```
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Params {
///     #[serde(default, deserialize_with = "sendero::coerce::flag")]
///     short: bool,
/// }
///
/// let params: Params = serde_urlencoded::from_str("short=on").unwrap();
/// assert!(params.short);
/// ```
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flag(&raw).ok_or_else(|| {
        de::Error::custom(format!("`{}` is not a valid boolean", raw))
    })
}
