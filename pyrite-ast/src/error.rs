use thiserror::Error;

use crate::dtype::DataType;

/// Invalid arguments to a builtin; the node is never constructed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstructError {
    #[error("`{builtin}` takes {expected} argument(s) but {found} were given")]
    Arity {
        builtin: &'static str,
        expected: &'static str,
        found: usize,
    },

    #[error("unknown operand type {dtype} for `{builtin}`")]
    UnknownOperand {
        builtin: &'static str,
        dtype: DataType,
    },

    #[error("cannot determine a common dtype for {count} element(s) of type {dtype}")]
    UndeterminedDtype { dtype: DataType, count: usize },

    #[error("`{builtin}` cannot be applied to the literal {literal}")]
    InvalidLiteral {
        builtin: &'static str,
        literal: String,
    },
}

impl ConstructError {
    /// Name of the builtin the error refers to, if any
    pub fn builtin(&self) -> Option<&'static str> {
        match self {
            ConstructError::Arity { builtin, .. }
            | ConstructError::UnknownOperand { builtin, .. }
            | ConstructError::InvalidLiteral { builtin, .. } => Some(builtin),
            ConstructError::UndeterminedDtype { .. } => None,
        }
    }
}

pub type ConstructResult<T> = Result<T, ConstructError>;
