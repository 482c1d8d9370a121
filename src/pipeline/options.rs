//! Typed configuration options declared by tasks
//!
//! Each task declares the options it reads. The registries of every task in
//! a command are merged into the flag surface the CLI exposes.

use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Parsed option values handed to every task of a pipeline
pub type Configuration = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    String,
    Boolean,
    Number,
    Path,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptionType::String => "string",
            OptionType::Boolean => "boolean",
            OptionType::Number => "number",
            OptionType::Path => "path",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum OptionError {
    #[error("Option '{key}' is declared as both {existing} and {declared}")]
    Conflict {
        key: String,
        existing: OptionType,
        declared: OptionType,
    },

    #[error("Invalid value '{value}' for option '{key}': expected {expected}")]
    InvalidValue {
        key: String,
        expected: OptionType,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationOption {
    pub description: String,
    pub option_type: OptionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Shown in help instead of the literal default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl ConfigurationOption {
    pub fn new(option_type: OptionType, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            option_type,
            default: None,
            default_description: None,
            aliases: Vec::new(),
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_default_description(mut self, description: impl Into<String>) -> Self {
        self.default_description = Some(description.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Converts a raw command-line value into this option's JSON type.
    pub fn parse_value(&self, key: &str, raw: &str) -> Result<Value, OptionError> {
        let invalid = || OptionError::InvalidValue {
            key: key.to_string(),
            expected: self.option_type,
            value: raw.to_string(),
        };

        match self.option_type {
            OptionType::String | OptionType::Path => Ok(Value::String(raw.to_string())),
            OptionType::Boolean => raw.parse::<bool>().map(Value::Bool).map_err(|_| invalid()),
            OptionType::Number => {
                if let Ok(n) = raw.parse::<i64>() {
                    return Ok(Value::Number(n.into()));
                }
                raw.parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(invalid)
            }
        }
    }
}

/// Option key → descriptor. Keys iterate in sorted order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionRegistry {
    options: BTreeMap<String, ConfigurationOption>,
}

impl OptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, option: ConfigurationOption) -> Self {
        self.options.insert(key.into(), option);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ConfigurationOption> {
        self.options.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigurationOption)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Adds `other`'s options, replacing same-named ones. Redeclaring a key
    /// with a different type is a conflict and leaves `self` unchanged.
    pub fn merge(&mut self, other: &OptionRegistry) -> Result<(), OptionError> {
        for (key, option) in &other.options {
            if let Some(existing) = self.options.get(key) {
                if existing.option_type != option.option_type {
                    return Err(OptionError::Conflict {
                        key: key.clone(),
                        existing: existing.option_type,
                        declared: option.option_type,
                    });
                }
            }
        }

        for (key, option) in &other.options {
            self.options.insert(key.clone(), option.clone());
        }
        Ok(())
    }

    pub fn merged<'a>(registries: impl IntoIterator<Item = &'a OptionRegistry>) -> Result<Self, OptionError> {
        let mut merged = Self::new();
        for registry in registries {
            merged.merge(registry)?;
        }
        Ok(merged)
    }

    /// Fills declared defaults into `provided` for keys it does not set.
    pub fn apply_defaults(&self, mut provided: Configuration) -> Configuration {
        for (key, option) in &self.options {
            if let Some(default) = &option.default {
                provided
                    .entry(key.clone())
                    .or_insert_with(|| default.clone());
            }
        }
        provided
    }
}
