use pyrite_ast::{DataKind, DataType};
use pyrite_diagnostics::{error_codes, Diagnostic, SymbolRef};
use thiserror::Error;

/// Fatal error; generation of the current unit stops
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WrapperError {
    #[error("type {dtype} of {symbol} is not implemented for boundary crossing")]
    TypeNotImplemented { symbol: SymbolRef, dtype: DataType },

    #[error("no type-check predicate for {kind} values ({symbol})")]
    MissingCheckPredicate { symbol: SymbolRef, kind: DataKind },

    #[error("no cast function from {from} to {to} ({symbol})")]
    MissingCastFunction {
        symbol: SymbolRef,
        from: DataType,
        to: DataType,
    },
}

impl WrapperError {
    pub fn code(&self) -> &'static str {
        match self {
            WrapperError::TypeNotImplemented { .. } => error_codes::TYPE_NOT_IMPLEMENTED,
            WrapperError::MissingCheckPredicate { .. } => error_codes::MISSING_CHECK_PREDICATE,
            WrapperError::MissingCastFunction { .. } => error_codes::MISSING_CAST_FUNCTION,
        }
    }

    pub fn symbol(&self) -> &SymbolRef {
        match self {
            WrapperError::TypeNotImplemented { symbol, .. }
            | WrapperError::MissingCheckPredicate { symbol, .. }
            | WrapperError::MissingCastFunction { symbol, .. } => symbol,
        }
    }

    pub fn to_diagnostic(&self, function: &str) -> Diagnostic {
        let diag = Diagnostic::fatal(self.code(), self.to_string())
            .with_symbol(self.symbol().clone())
            .with_note(format!("in wrapper for function `{}`", function));

        match self {
            WrapperError::TypeNotImplemented { dtype, .. } => diag.with_help(format!(
                "register a format code for ({}, {}) in a registry extension",
                dtype.kind, dtype.precision
            )),
            WrapperError::MissingCheckPredicate { kind, .. } => {
                diag.with_help(format!("register a check predicate for `{}`", kind))
            }
            WrapperError::MissingCastFunction { .. } => diag,
        }
    }
}
