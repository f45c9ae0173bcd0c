//! Data kinds, precisions and the numeric promotion ladder.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic kind of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    Integer,
    Real,
    Complex,
    Bool,
    String,
    /// Unresolved or heterogeneous
    Generic,
    Void,
    /// Opaque reference to a host-runtime object
    HostObject,
    /// Opaque reference to a host-runtime array object
    HostArrayObject,
}

impl DataKind {
    /// Position on the promotion ladder: Bool < Integer < Real < Complex
    pub fn promotion_rank(&self) -> Option<u8> {
        match self {
            DataKind::Bool => Some(0),
            DataKind::Integer => Some(1),
            DataKind::Real => Some(2),
            DataKind::Complex => Some(3),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.promotion_rank().is_some()
    }

    pub const fn default_precision(&self) -> u8 {
        match self {
            DataKind::Integer => 4,
            DataKind::Real => 8,
            DataKind::Complex => 8,
            DataKind::Bool => 4,
            _ => 0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataKind::Integer => "int",
            DataKind::Real => "float",
            DataKind::Complex => "complex",
            DataKind::Bool => "bool",
            DataKind::String => "str",
            DataKind::Generic => "generic",
            DataKind::Void => "void",
            DataKind::HostObject => "pyobject",
            DataKind::HostArrayObject => "pyarrayobject",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Highest rung of the promotion ladder among `kinds`, ignoring non-numeric kinds
pub fn promote<I>(kinds: I) -> Option<DataKind>
where
    I: IntoIterator<Item = DataKind>,
{
    kinds
        .into_iter()
        .filter(|k| k.is_numeric())
        .max_by_key(|k| k.promotion_rank())
}

/// A data kind paired with its storage width in bytes
///
/// Two dtypes are equal when kind and precision are equal; this is the key
/// of every boundary-crossing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataType {
    pub kind: DataKind,
    pub precision: u8,
}

impl DataType {
    pub const fn new(kind: DataKind, precision: u8) -> Self {
        Self { kind, precision }
    }

    /// The kind at its default precision
    pub const fn of(kind: DataKind) -> Self {
        Self::new(kind, kind.default_precision())
    }

    pub const fn integer(precision: u8) -> Self {
        Self::new(DataKind::Integer, precision)
    }

    pub const fn real(precision: u8) -> Self {
        Self::new(DataKind::Real, precision)
    }

    pub const fn complex(precision: u8) -> Self {
        Self::new(DataKind::Complex, precision)
    }

    pub const fn bool() -> Self {
        Self::of(DataKind::Bool)
    }

    pub const fn string() -> Self {
        Self::new(DataKind::String, 0)
    }

    pub const fn generic() -> Self {
        Self::new(DataKind::Generic, 0)
    }

    pub const fn void() -> Self {
        Self::new(DataKind::Void, 0)
    }

    pub const fn host_object() -> Self {
        Self::new(DataKind::HostObject, 0)
    }

    pub const fn host_array_object() -> Self {
        Self::new(DataKind::HostArrayObject, 0)
    }

    pub fn is_complex(&self) -> bool {
        self.kind == DataKind::Complex
    }

    pub fn is_generic(&self) -> bool {
        self.kind == DataKind::Generic
    }
}

impl fmt::Display for DataType {
    /// numpy-style names: `int32`, `float64`, `complex128`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits = u32::from(self.precision) * 8;
        match self.kind {
            DataKind::Integer | DataKind::Real => write!(f, "{}{}", self.kind, bits),
            // a complex of precision p stores two p-byte floats
            DataKind::Complex => write!(f, "complex{}", bits * 2),
            _ => write!(f, "{}", self.kind),
        }
    }
}

/// Memory layout of an array value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Order {
    #[default]
    #[serde(rename = "C")]
    RowMajor,
    #[serde(rename = "F")]
    ColumnMajor,
}

/// Whether a node owns its value or aliases an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
    #[default]
    Owned,
    Alias,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_promotion_ladder() {
        use DataKind::*;
        assert_eq!(promote([Integer, Real, Bool]), Some(Real));
        assert_eq!(promote([Bool, Complex, Integer]), Some(Complex));
        assert_eq!(promote([Bool]), Some(Bool));
        assert_eq!(promote([String, HostObject]), None);
    }

    #[test]
    fn test_dtype_is_structural_map_key() {
        let mut codes = HashMap::new();
        codes.insert(DataType::integer(4), 'i');
        codes.insert(DataType::integer(8), 'l');

        assert_eq!(codes.get(&DataType::new(DataKind::Integer, 4)), Some(&'i'));
        assert_eq!(codes.get(&DataType::integer(2)), None);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(DataType::integer(4).to_string(), "int32");
        assert_eq!(DataType::real(8).to_string(), "float64");
        assert_eq!(DataType::complex(8).to_string(), "complex128");
        assert_eq!(DataType::complex(4).to_string(), "complex64");
        assert_eq!(DataType::host_array_object().to_string(), "pyarrayobject");
    }

    #[test]
    fn test_default_precisions() {
        assert_eq!(DataType::of(DataKind::Integer), DataType::integer(4));
        assert_eq!(DataType::of(DataKind::Real), DataType::real(8));
        assert_eq!(DataType::bool().precision, 4);
        assert_eq!(DataType::string().precision, 0);
    }
}
