use crate::config::ConfigError;
use crate::types::Property;

pub const EXTRA_PROPERTIES_DELIMITER: char = ',';
pub const EXTRA_PROPERTY_SEPARATOR: char = ':';

pub fn from_non_empty_or_default<R, F: Fn(String) -> R>(
    s: Option<String>,
    default: R,
    from_non_empty: F,
) -> R {
    if let Some(s) = s {
        if !s.trim().is_empty() {
            return from_non_empty(s);
        }
    }
    default
}

/// Parses `name:value` pairs joined by commas, e.g. `env:prod,region:us`.
pub fn parse_extra_properties(properties: &str) -> Result<Vec<Property>, ConfigError> {
    properties
        .split(EXTRA_PROPERTIES_DELIMITER)
        .map(|property_str| {
            let parts = property_str
                .split(EXTRA_PROPERTY_SEPARATOR)
                .collect::<Vec<&str>>();
            if parts.len() != 2 {
                return Err(ConfigError::InvalidExtraProperty {
                    property: property_str.to_owned(),
                    reason: format!("expected exactly 2 parts, found {}", parts.len()),
                });
            }

            Ok(Property::new(parts[0], parts[1]))
        })
        .collect()
}
