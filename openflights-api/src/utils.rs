use serde::{Deserialize, Deserializer};

/// Deserializes an optional string, trimming it and treating a blank value as absent.
///
/// Query parameters such as `?city=` carry no filter, the same as leaving them out.
pub fn trim_option_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}
