//! Symbol references for diagnostics
//!
//! The typed-value model and the wrapper generator never see source text,
//! so a diagnostic points at the thing that caused it: a parameter, a
//! builtin, a dtype or a node of the typed AST.

use serde::Serialize;
use std::fmt;

/// What kind of entity a diagnostic refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Parameter,
    Result,
    Function,
    Builtin,
    DataType,
    Node,
    Registry,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            SymbolKind::Parameter => "parameter",
            SymbolKind::Result => "result",
            SymbolKind::Function => "function",
            SymbolKind::Builtin => "builtin",
            SymbolKind::DataType => "dtype",
            SymbolKind::Node => "node",
            SymbolKind::Registry => "registry",
        };
        f.write_str(name)
    }
}

/// Named reference to the offending symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SymbolRef {
    pub kind: SymbolKind,
    pub name: String,
}

impl SymbolRef {
    pub fn new(kind: SymbolKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        Self::new(SymbolKind::Parameter, name)
    }

    pub fn result(name: impl Into<String>) -> Self {
        Self::new(SymbolKind::Result, name)
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self::new(SymbolKind::Function, name)
    }

    pub fn builtin(name: impl Into<String>) -> Self {
        Self::new(SymbolKind::Builtin, name)
    }

    pub fn dtype(name: impl Into<String>) -> Self {
        Self::new(SymbolKind::DataType, name)
    }
}

impl fmt::Display for SymbolRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} `{}`", self.kind, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_display() {
        assert_eq!(SymbolRef::parameter("x").to_string(), "parameter `x`");
        assert_eq!(SymbolRef::dtype("complex32").to_string(), "dtype `complex32`");
    }
}
