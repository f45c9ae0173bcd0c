//! Static tables consulted by the wrapper generator.
//!
//! A [`Registries`] value is assembled once, either the process-wide
//! [`Registries::standard`] tables or a [`RegistryBuilder`] extending them,
//! and is only read afterwards. Generators borrow it, so any number of
//! units can be generated in parallel against the same tables.

pub mod cast_functions;
pub mod check_predicates;
pub mod format_codes;
pub mod host_api;

use pyrite_ast::{DataKind, DataType};
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

pub use cast_functions::{CastExpr, CastFunction, ARRAY_DESCRIPTOR};
pub use check_predicates::{TypeCheck, ARRAY_RANK_CHECK, ARRAY_TYPE_CHECK};
pub use format_codes::{FormatCode, ARRAY_OBJECT, ARRAY_TYPE_DESCRIPTOR, OPAQUE_OBJECT};
pub use host_api::{c_type_name, HostFunction, HOST_CONSTANTS, HOST_FUNCTIONS};

static STANDARD: OnceLock<Registries> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Registries {
    format_codes: HashMap<DataType, FormatCode>,
    check_predicates: HashMap<DataKind, String>,
    casts: BTreeMap<&'static str, CastFunction>,
    type_flags: HashMap<DataType, u8>,
}

impl Registries {
    /// The built-in tables, initialised on first use
    pub fn standard() -> &'static Registries {
        STANDARD.get_or_init(|| {
            log::debug!("initialising standard registries");
            Self::standard_tables()
        })
    }

    fn standard_tables() -> Self {
        Self {
            format_codes: format_codes::standard(),
            check_predicates: check_predicates::standard(),
            casts: cast_functions::standard()
                .into_iter()
                .map(|cast| (cast.name, cast))
                .collect(),
            type_flags: host_api::standard_type_flags(),
        }
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn format_code(&self, dtype: DataType) -> Option<&FormatCode> {
        self.format_codes.get(&dtype)
    }

    pub fn check_predicate(&self, kind: DataKind) -> Option<&str> {
        self.check_predicates.get(&kind).map(String::as_str)
    }

    pub fn cast(&self, name: &str) -> Option<&CastFunction> {
        self.casts.get(name)
    }

    /// The cast converting `input` into `output`, if one is catalogued
    pub fn cast_between(&self, input: DataType, output: DataType) -> Option<&CastFunction> {
        self.casts
            .values()
            .find(|cast| cast.input == input && cast.output == output)
    }

    /// Casts ordered by name
    pub fn casts(&self) -> impl Iterator<Item = &CastFunction> {
        self.casts.values()
    }

    pub fn type_flag(&self, dtype: DataType) -> Option<u8> {
        self.type_flags.get(&dtype).copied()
    }

    pub fn collector(&self, kind: DataKind) -> Option<&'static HostFunction> {
        host_api::collector(kind)
    }

    pub fn host_function(&self, name: &str) -> Option<&'static HostFunction> {
        host_api::host_function(name)
    }

    /// Format codes ordered by (kind, precision)
    pub fn format_codes(&self) -> Vec<(DataType, &FormatCode)> {
        let mut codes: Vec<_> = self.format_codes.iter().map(|(d, c)| (*d, c)).collect();
        codes.sort_by_key(|(dtype, _)| (dtype.kind, dtype.precision));
        codes
    }

    pub fn check_predicates(&self) -> Vec<(DataKind, &str)> {
        let mut predicates: Vec<_> = self
            .check_predicates
            .iter()
            .map(|(k, name)| (*k, name.as_str()))
            .collect();
        predicates.sort_by_key(|(kind, _)| *kind);
        predicates
    }

    pub fn type_flags(&self) -> Vec<(DataType, u8)> {
        let mut flags: Vec<_> = self.type_flags.iter().map(|(d, f)| (*d, *f)).collect();
        flags.sort_by_key(|(_, flag)| *flag);
        flags
    }

    /// Cast bodies referring to primitives missing from the host catalogue
    pub fn unresolved_primitives(&self) -> Vec<(&'static str, &'static str)> {
        self.casts
            .values()
            .flat_map(|cast| {
                cast.body
                    .primitives()
                    .into_iter()
                    .filter(|p| host_api::host_function(p).is_none() && !host_api::is_host_constant(p))
                    .map(move |p| (cast.name, p))
            })
            .collect()
    }
}

/// Extends the standard tables before any generation takes place
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    tables: Registries,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            tables: Registries::standard().clone(),
        }
    }

    /// Registers or replaces the format code of `dtype`
    pub fn format_code(mut self, dtype: DataType, code: FormatCode) -> Self {
        if let Some(previous) = self.tables.format_codes.insert(dtype, code) {
            log::debug!("format code for {} replaced (was {})", dtype, previous);
        }
        self
    }

    pub fn check_predicate(mut self, kind: DataKind, predicate: impl Into<String>) -> Self {
        self.tables.check_predicates.insert(kind, predicate.into());
        self
    }

    pub fn type_flag(mut self, dtype: DataType, flag: u8) -> Self {
        self.tables.type_flags.insert(dtype, flag);
        self
    }

    pub fn cast(mut self, cast: CastFunction) -> Self {
        self.tables.casts.insert(cast.name, cast);
        self
    }

    pub fn build(self) -> Registries {
        self.tables
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_registries_are_shareable() {
        assert_send_sync::<Registries>();
        assert!(std::ptr::eq(Registries::standard(), Registries::standard()));
    }

    #[test]
    fn test_every_cast_primitive_is_catalogued() {
        assert!(Registries::standard().unresolved_primitives().is_empty());
    }

    #[test]
    fn test_cast_lookup_by_types() {
        let registries = Registries::standard();
        let cast = registries
            .cast_between(DataType::host_object(), DataType::complex(4))
            .unwrap();
        assert_eq!(cast.name, "PyComplex_to_Complex64");
        assert!(registries
            .cast_between(DataType::host_object(), DataType::string())
            .is_none());
    }

    #[test]
    fn test_builder_extends_without_touching_standard() {
        let extended = Registries::builder()
            .format_code(DataType::complex(16), FormatCode::new("O"))
            .check_predicate(DataKind::String, "PyUnicode_Check")
            .type_flag(DataType::complex(16), 11)
            .build();

        assert_eq!(extended.format_code(DataType::complex(16)).unwrap().code, "O");
        assert_eq!(extended.check_predicate(DataKind::String), Some("PyUnicode_Check"));
        assert_eq!(extended.type_flag(DataType::complex(16)), Some(11));

        let standard = Registries::standard();
        assert!(standard.format_code(DataType::complex(16)).is_none());
        assert!(standard.check_predicate(DataKind::String).is_none());
    }

    #[test]
    fn test_sorted_listings() {
        let registries = Registries::standard();
        let codes = registries.format_codes();
        assert_eq!(codes[0].0, DataType::integer(1));
        assert_eq!(codes.len(), 12);

        let flags = registries.type_flags();
        assert_eq!(flags.first().map(|f| f.1), Some(1));
        assert_eq!(flags.last().map(|f| f.1), Some(10));
    }
}
