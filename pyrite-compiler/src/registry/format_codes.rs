// Argument-parsing / value-building format codes of the host call convention

use pyrite_ast::{DataKind, DataType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Code for a value passed as an opaque host object
pub const OPAQUE_OBJECT: &str = "O";
/// Code for an array object validated against a type descriptor
pub const ARRAY_OBJECT: &str = "O!";
/// Type descriptor accompanying [`ARRAY_OBJECT`]
pub const ARRAY_TYPE_DESCRIPTOR: &str = "PyArray_Type";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatCode {
    pub code: String,
    /// Second token of a two-token code, naming the expected host type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_descriptor: Option<String>,
}

impl FormatCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            type_descriptor: None,
        }
    }

    pub fn with_descriptor(code: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            type_descriptor: Some(descriptor.into()),
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.code == OPAQUE_OBJECT
    }

    pub fn token_count(&self) -> usize {
        if self.type_descriptor.is_some() {
            2
        } else {
            1
        }
    }
}

impl fmt::Display for FormatCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.type_descriptor {
            Some(descriptor) => write!(f, "{} ({})", self.code, descriptor),
            None => f.write_str(&self.code),
        }
    }
}

pub(crate) fn standard() -> HashMap<DataType, FormatCode> {
    use DataKind::*;

    let entries: [(DataKind, u8, &str); 11] = [
        (Integer, 4, "i"),
        (Integer, 8, "l"),
        (Integer, 2, "h"),
        (Integer, 1, "b"),
        (Real, 8, "d"),
        (Real, 4, "f"),
        // complex values are always boxed
        (Complex, 4, OPAQUE_OBJECT),
        (Complex, 8, OPAQUE_OBJECT),
        (Bool, 4, "p"),
        (String, 0, "s"),
        (HostObject, 0, OPAQUE_OBJECT),
    ];

    let mut codes: HashMap<DataType, FormatCode> = entries
        .into_iter()
        .map(|(kind, precision, code)| (DataType::new(kind, precision), FormatCode::new(code)))
        .collect();

    codes.insert(
        DataType::host_array_object(),
        FormatCode::with_descriptor(ARRAY_OBJECT, ARRAY_TYPE_DESCRIPTOR),
    );
    codes
}
