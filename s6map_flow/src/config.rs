//! Configuration of a mapping run.
//!
//! A [`FlowConfig`] can be assembled with [`FlowConfig::builder`] or read from
//! JSON; every field has a default, so a partial file is valid:
//!
//! ```ignore
//! {"part": "xc6slx9-tqg144-2", "mapper": "single", "mapper_options": {"order": "reverse"}}
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use s6map_lut::MapperKind;
use serde::{Deserialize, Serialize};

use crate::FlowError;

/// Target device when none is given.
pub const DEFAULT_PART: &str = "xc6slx45-fgg484-2";

/// Settings of a mapping run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Device written into the netlist's `PART` property.
    pub part: String,
    /// Technology-independent LUT mapper.
    pub mapper: MapperKind,
    /// Extra `key=value` options handed to the mapper.
    pub mapper_options: BTreeMap<String, String>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            part: DEFAULT_PART.to_string(),
            mapper: MapperKind::default(),
            mapper_options: BTreeMap::new(),
        }
    }
}

impl FlowConfig {
    /// Starts from the defaults.
    pub fn builder() -> FlowConfigBuilder {
        FlowConfigBuilder::default()
    }

    /// # Errors
    ///
    /// Fails on malformed JSON or unknown mapper names.
    pub fn from_json(text: &str) -> Result<Self, FlowError> {
        Ok(serde_json::from_str(text)?)
    }

    /// # Errors
    ///
    /// Fails if the file cannot be read or does not hold a valid configuration.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FlowError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(FlowError::io(path))?;
        Self::from_json(&text)
    }

    /// # Errors
    ///
    /// Serialization of this type does not fail in practice.
    pub fn to_json(&self) -> Result<String, FlowError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder for [`FlowConfig`].
#[derive(Clone, Debug, Default)]
pub struct FlowConfigBuilder {
    config: FlowConfig,
}

impl From<FlowConfig> for FlowConfigBuilder {
    /// Starts from an existing configuration, for example one read from a file.
    fn from(config: FlowConfig) -> Self {
        Self { config }
    }
}

impl FlowConfigBuilder {
    /// Sets the target device.
    pub fn part(mut self, part: impl Into<String>) -> Self {
        self.config.part = part.into();
        self
    }

    /// Selects the LUT mapper.
    pub fn mapper(mut self, mapper: MapperKind) -> Self {
        self.config.mapper = mapper;
        self
    }

    /// Adds one mapper option.
    pub fn mapper_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.mapper_options.insert(key.into(), value.into());
        self
    }

    /// Adds every option from `options`, overriding earlier values.
    pub fn mapper_options(mut self, options: impl IntoIterator<Item = (String, String)>) -> Self {
        self.config.mapper_options.extend(options);
        self
    }

    /// Finishes the configuration.
    pub fn build(self) -> FlowConfig {
        self.config
    }
}
