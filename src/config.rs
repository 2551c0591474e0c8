use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::types::{Config, ConfigFile};
use crate::utils::{from_non_empty_or_default, parse_extra_properties};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("project must be defined in config file")]
    MissingProject,
    #[error("invalid extra testsuites property {property:?}: {reason} (expected <name>:<value>)")]
    InvalidExtraProperty { property: String, reason: String },
    #[error("could not parse config file: {0}")]
    Parse(String),
}

pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<ConfigFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    Ok(parse_config(&contents)?)
}

pub fn parse_config(contents: &str) -> Result<ConfigFile, ConfigError> {
    // An empty document deserializes as null rather than as an empty mapping
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
}

pub fn validate(
    config_file: ConfigFile,
    extra_testsuites_properties: Option<String>,
) -> Result<Config, ConfigError> {
    let ConfigFile {
        project,
        keep_test_case_identifier,
        mut testsuites_properties,
    } = config_file;

    let project = match project {
        Some(project) if !project.trim().is_empty() => project,
        _ => return Err(ConfigError::MissingProject),
    };

    let extra_properties = from_non_empty_or_default(
        extra_testsuites_properties,
        Ok(Vec::new()),
        |properties| parse_extra_properties(&properties),
    )?;
    if !extra_properties.is_empty() {
        log::debug!(
            "Appending {} extra testsuites properties",
            extra_properties.len()
        );
    }
    testsuites_properties.extend(extra_properties);

    Ok(Config {
        project,
        keep_test_case_identifier,
        testsuites_properties,
    })
}
