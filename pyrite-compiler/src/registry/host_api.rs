//! Host runtime primitives the generated glue may call.
//!
//! Every primitive referenced by a cast body must be declared here, either
//! as a function or as one of the singleton constants.

use pyrite_ast::{DataKind, DataType};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HostFunction {
    pub name: &'static str,
    pub params: &'static [DataType],
    pub returns: DataType,
}

impl fmt::Display for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", c_type_name(self.returns), self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(c_type_name(*param))?;
        }
        f.write_str(")")
    }
}

const OBJECT: DataType = DataType::host_object();
const LONG: DataType = DataType::integer(8);
const INT: DataType = DataType::integer(4);
const DOUBLE: DataType = DataType::real(8);
const FLOAT: DataType = DataType::real(4);

macro_rules! host_fn {
    ($name:literal ($($param:expr),*) -> $ret:expr) => {
        HostFunction {
            name: $name,
            params: &[$($param),*],
            returns: $ret,
        }
    };
}

pub static HOST_FUNCTIONS: &[HostFunction] = &[
    host_fn!("Py_DECREF"(OBJECT) -> DataType::void()),
    host_fn!("PyLong_AsLong"(OBJECT) -> LONG),
    host_fn!("PyLong_AsLongLong"(OBJECT) -> LONG),
    host_fn!("PyLong_FromLongLong"(LONG) -> OBJECT),
    host_fn!("PyFloat_AsDouble"(OBJECT) -> DOUBLE),
    host_fn!("PyFloat_FromDouble"(DOUBLE) -> OBJECT),
    host_fn!("PyErr_SetString"(OBJECT, DataType::string()) -> DataType::void()),
    host_fn!("PyComplex_FromDoubles"(DOUBLE, DOUBLE) -> OBJECT),
    host_fn!("PyComplex_RealAsDouble"(OBJECT) -> DOUBLE),
    host_fn!("PyComplex_ImagAsDouble"(OBJECT) -> DOUBLE),
    host_fn!("PyArray_Check_Rank"(OBJECT, INT) -> DataType::bool()),
    host_fn!("PyArray_Check_Type"(OBJECT, INT) -> DataType::bool()),
    host_fn!("creal"(DataType::complex(8)) -> DOUBLE),
    host_fn!("cimag"(DataType::complex(8)) -> DOUBLE),
    host_fn!("crealf"(DataType::complex(4)) -> FLOAT),
    host_fn!("cimagf"(DataType::complex(4)) -> FLOAT),
    host_fn!("CMPLX"(DOUBLE, DOUBLE) -> DataType::complex(8)),
    host_fn!("CMPLXF"(FLOAT, FLOAT) -> DataType::complex(4)),
];

/// Canonical singleton objects; compared by identity
pub static HOST_CONSTANTS: &[&str] = &["Py_True", "Py_False", "Py_None"];

pub fn host_function(name: &str) -> Option<&'static HostFunction> {
    HOST_FUNCTIONS.iter().find(|f| f.name == name)
}

pub fn is_host_constant(name: &str) -> bool {
    HOST_CONSTANTS.contains(&name)
}

/// Function reading a native scalar straight out of an opaque object
pub fn collector(kind: DataKind) -> Option<&'static HostFunction> {
    match kind {
        DataKind::Integer => host_function("PyLong_AsLong"),
        DataKind::Real => host_function("PyFloat_AsDouble"),
        _ => None,
    }
}

/// Runtime type flags shared with the native support library
pub(crate) fn standard_type_flags() -> HashMap<DataType, u8> {
    use DataKind::*;

    [
        (Integer, 4, 1),
        (Integer, 8, 2),
        (Integer, 2, 3),
        (Integer, 1, 4),
        (Real, 8, 5),
        (Real, 4, 6),
        (Complex, 4, 7),
        (Complex, 8, 8),
        (Bool, 4, 9),
        (String, 0, 10),
    ]
    .into_iter()
    .map(|(kind, precision, flag)| (DataType::new(kind, precision), flag))
    .collect()
}

/// C spelling of a native dtype
pub fn c_type_name(dtype: DataType) -> &'static str {
    match (dtype.kind, dtype.precision) {
        (DataKind::Integer, 1) => "int8_t",
        (DataKind::Integer, 2) => "int16_t",
        (DataKind::Integer, 4) => "int32_t",
        (DataKind::Integer, 8) => "int64_t",
        (DataKind::Real, 4) => "float",
        (DataKind::Real, 8) => "double",
        (DataKind::Complex, 4) => "float complex",
        (DataKind::Complex, 8) => "double complex",
        (DataKind::Bool, _) => "bool",
        (DataKind::String, _) => "char *",
        (DataKind::HostObject, _) => "PyObject *",
        (DataKind::HostArrayObject, _) => "PyArrayObject *",
        (DataKind::Generic, _) => "t_ndarray",
        _ => "void",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collectors() {
        assert_eq!(collector(DataKind::Integer).map(|f| f.name), Some("PyLong_AsLong"));
        assert_eq!(collector(DataKind::Real).map(|f| f.name), Some("PyFloat_AsDouble"));
        assert!(collector(DataKind::Complex).is_none());
    }

    #[test]
    fn test_type_flags() {
        let flags = standard_type_flags();
        assert_eq!(flags[&DataType::integer(4)], 1);
        assert_eq!(flags[&DataType::integer(1)], 4);
        assert_eq!(flags[&DataType::real(4)], 6);
        assert_eq!(flags[&DataType::complex(8)], 8);
        assert_eq!(flags[&DataType::bool()], 9);
        assert_eq!(flags[&DataType::string()], 10);
    }

    #[test]
    fn test_signature_rendering() {
        let f = host_function("PyComplex_FromDoubles").unwrap();
        assert_eq!(f.to_string(), "PyObject * PyComplex_FromDoubles(double, double)");
        assert!(is_host_constant("Py_True"));
        assert!(!is_host_constant("Py_Ellipsis"));
    }
}
