// Registry extension file (JSON)
//
// {
//   "format_codes":     [{ "dtype": { "kind": "complex", "precision": 16 }, "code": "O" }],
//   "check_predicates": { "string": "PyUnicode_Check" },
//   "type_flags":       [{ "dtype": { "kind": "complex", "precision": 16 }, "flag": 11 }]
// }

use anyhow::{Context, Result};
use pyrite_ast::{DataKind, DataType};
use pyrite_diagnostics::{error_codes, Diagnostic, SymbolRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::registry::{FormatCode, RegistryBuilder, ARRAY_OBJECT};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub format_codes: Vec<FormatCodeEntry>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub check_predicates: BTreeMap<DataKind, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_flags: Vec<TypeFlagEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatCodeEntry {
    pub dtype: DataType,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_descriptor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeFlagEntry {
    pub dtype: DataType,
    pub flag: u8,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("empty format code for {dtype}")]
    EmptyFormatCode { dtype: DataType },

    #[error("format code `{code}` for {dtype} needs a type descriptor")]
    MissingTypeDescriptor { dtype: DataType, code: String },

    #[error("empty check predicate name for {kind}")]
    EmptyPredicate { kind: DataKind },

    #[error("type flag {flag} is assigned to both {first} and {second}")]
    DuplicateTypeFlag {
        flag: u8,
        first: DataType,
        second: DataType,
    },
}

impl ConfigError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(error_codes::INVALID_REGISTRY_ENTRY, self.to_string())
            .with_symbol(SymbolRef::new(
                pyrite_diagnostics::SymbolKind::Registry,
                "registry extension",
            ))
    }
}

impl RegistryConfig {
    /// Parse an extension file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.as_ref().display()))?;

        Self::from_str(&content)
            .with_context(|| format!("Invalid registry extension {}", path.as_ref().display()))
    }

    pub fn from_str(content: &str) -> Result<Self> {
        let config: RegistryConfig =
            serde_json::from_str(content).context("Failed to parse registry extension")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        for entry in &self.format_codes {
            if entry.code.is_empty() {
                return Err(ConfigError::EmptyFormatCode { dtype: entry.dtype });
            }
            if entry.code == ARRAY_OBJECT && entry.type_descriptor.is_none() {
                return Err(ConfigError::MissingTypeDescriptor {
                    dtype: entry.dtype,
                    code: entry.code.clone(),
                });
            }
        }

        if let Some((kind, _)) = self.check_predicates.iter().find(|(_, name)| name.is_empty()) {
            return Err(ConfigError::EmptyPredicate { kind: *kind });
        }

        for (i, entry) in self.type_flags.iter().enumerate() {
            if let Some(other) = self.type_flags[..i]
                .iter()
                .find(|other| other.flag == entry.flag && other.dtype != entry.dtype)
            {
                return Err(ConfigError::DuplicateTypeFlag {
                    flag: entry.flag,
                    first: other.dtype,
                    second: entry.dtype,
                });
            }
        }

        Ok(())
    }

    /// Register every entry on `builder`
    pub fn apply(&self, mut builder: RegistryBuilder) -> RegistryBuilder {
        for entry in &self.format_codes {
            let code = match &entry.type_descriptor {
                Some(descriptor) => FormatCode::with_descriptor(entry.code.clone(), descriptor.clone()),
                None => FormatCode::new(entry.code.clone()),
            };
            builder = builder.format_code(entry.dtype, code);
        }
        for (kind, predicate) in &self.check_predicates {
            builder = builder.check_predicate(*kind, predicate.clone());
        }
        for entry in &self.type_flags {
            builder = builder.type_flag(entry.dtype, entry.flag);
        }
        log::debug!(
            "applied registry extension: {} format code(s), {} predicate(s), {} type flag(s)",
            self.format_codes.len(),
            self.check_predicates.len(),
            self.type_flags.len()
        );
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registries;

    #[test]
    fn test_parse_extension() {
        let json = r#"{
            "format_codes": [
                { "dtype": { "kind": "complex", "precision": 16 }, "code": "O" }
            ],
            "check_predicates": { "string": "PyUnicode_Check" },
            "type_flags": [
                { "dtype": { "kind": "complex", "precision": 16 }, "flag": 11 }
            ]
        }"#;

        let config = RegistryConfig::from_str(json).unwrap();
        assert_eq!(config.format_codes.len(), 1);
        assert_eq!(config.check_predicates[&DataKind::String], "PyUnicode_Check");

        let registries = config.apply(Registries::builder()).build();
        assert_eq!(registries.format_code(DataType::complex(16)).unwrap().code, "O");
        assert_eq!(registries.type_flag(DataType::complex(16)), Some(11));
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = RegistryConfig::from_str("{}").unwrap();
        assert_eq!(config, RegistryConfig::default());
    }

    #[test]
    fn test_array_code_needs_descriptor() {
        let config = RegistryConfig {
            format_codes: vec![FormatCodeEntry {
                dtype: DataType::host_array_object(),
                code: "O!".to_string(),
                type_descriptor: None,
            }],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingTypeDescriptor { .. })
        ));
    }

    #[test]
    fn test_duplicate_type_flag() {
        let config = RegistryConfig {
            type_flags: vec![
                TypeFlagEntry {
                    dtype: DataType::integer(16),
                    flag: 12,
                },
                TypeFlagEntry {
                    dtype: DataType::real(16),
                    flag: 12,
                },
            ],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "type flag 12 is assigned to both int128 and float128");
        assert_eq!(err.to_diagnostic().code, error_codes::INVALID_REGISTRY_ENTRY);
    }
}
