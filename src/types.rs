use serde::Deserialize;

/// Configuration as it is written in the YAML file, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfigFile {
    #[serde(default, deserialize_with = "scalar::optional")]
    pub project: Option<String>,
    #[serde(
        rename = "keepTestCaseIdentifier",
        default = "default_keep_test_case_identifier"
    )]
    pub keep_test_case_identifier: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub testsuites_properties: Vec<Property>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            project: None,
            keep_test_case_identifier: default_keep_test_case_identifier(),
            testsuites_properties: Vec::new(),
        }
    }
}

fn default_keep_test_case_identifier() -> bool {
    true
}

/// Validated configuration driving a single annotation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub project: String,
    pub keep_test_case_identifier: bool,
    pub testsuites_properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Property {
    #[serde(deserialize_with = "scalar::required")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar::or_empty")]
    pub value: String,
}

impl Property {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotateResult {
    pub test_cases: usize,
    pub annotated: usize,
    pub renamed: usize,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// YAML happily types `project: 1234` as a number, so scalars are read back as strings.
mod scalar {
    use serde::{de::Error, Deserialize, Deserializer};
    use serde_yaml::Value;

    fn into_string<E: Error>(value: Value) -> Result<Option<String>, E> {
        match value {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(b.to_string())),
            Value::Number(n) => Ok(Some(n.to_string())),
            Value::String(s) => Ok(Some(s)),
            Value::Tagged(tagged) => into_string(tagged.value),
            Value::Sequence(_) => Err(E::custom("expected a scalar, found a sequence")),
            Value::Mapping(_) => Err(E::custom("expected a scalar, found a mapping")),
        }
    }

    pub fn optional<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        into_string(Value::deserialize(deserializer)?)
    }

    pub fn required<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        optional(deserializer)?.ok_or_else(|| D::Error::custom("expected a scalar, found null"))
    }

    pub fn or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(optional(deserializer)?.unwrap_or_default())
    }
}
