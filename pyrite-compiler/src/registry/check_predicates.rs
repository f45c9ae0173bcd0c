// Host-side type checks run on an opaque argument before it is converted

use pyrite_ast::DataKind;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Rank check applied to every array argument
pub const ARRAY_RANK_CHECK: &str = "PyArray_Check_Rank";
/// Element type check against a runtime type flag
pub const ARRAY_TYPE_CHECK: &str = "PyArray_Check_Type";

pub(crate) fn standard() -> HashMap<DataKind, String> {
    [
        (DataKind::Integer, "PyLong_Check"),
        (DataKind::Complex, "PyComplex_Check"),
        (DataKind::Real, "PyFloat_Check"),
        (DataKind::Bool, "PyBool_Check"),
    ]
    .into_iter()
    .map(|(kind, name)| (kind, name.to_string()))
    .collect()
}

/// A predicate bound to the opaque argument `o`, plus any extra arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCheck {
    pub predicate: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_args: Vec<String>,
}

impl TypeCheck {
    pub fn new(predicate: impl Into<String>) -> Self {
        Self {
            predicate: predicate.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn array_rank(rank: usize) -> Self {
        Self {
            predicate: ARRAY_RANK_CHECK.to_string(),
            extra_args: vec![rank.to_string()],
        }
    }

    pub fn array_type(flag: u8) -> Self {
        Self {
            predicate: ARRAY_TYPE_CHECK.to_string(),
            extra_args: vec![flag.to_string()],
        }
    }
}

impl fmt::Display for TypeCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(o", self.predicate)?;
        for arg in &self.extra_args {
            write!(f, ", {}", arg)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_predicate_per_numeric_kind() {
        let predicates = standard();
        assert_eq!(predicates[&DataKind::Integer], "PyLong_Check");
        assert_eq!(predicates[&DataKind::Complex], "PyComplex_Check");
        assert_eq!(predicates[&DataKind::Real], "PyFloat_Check");
        assert_eq!(predicates[&DataKind::Bool], "PyBool_Check");
        assert!(!predicates.contains_key(&DataKind::String));
    }

    #[test]
    fn test_check_rendering() {
        assert_eq!(TypeCheck::new("PyLong_Check").to_string(), "PyLong_Check(o)");
        assert_eq!(TypeCheck::array_rank(2).to_string(), "PyArray_Check_Rank(o, 2)");
        assert_eq!(TypeCheck::array_type(5).to_string(), "PyArray_Check_Type(o, 5)");
    }
}
