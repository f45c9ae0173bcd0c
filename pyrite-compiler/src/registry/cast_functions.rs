// Named conversions between host objects and native values

use pyrite_ast::DataType;
use serde::Serialize;
use std::fmt;

use super::host_api::c_type_name;

/// Native side of `PyArray_to_ndarray`; shape and strides are filled in by
/// the support library
pub const ARRAY_DESCRIPTOR: DataType = DataType::generic();

/// Body of a cast function, over host primitives and the single argument
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CastExpr {
    Arg,
    Const(&'static str),
    Call {
        primitive: &'static str,
        args: Vec<CastExpr>,
    },
    /// Numeric conversion to a narrower or wider native type
    Convert { to: DataType, value: Box<CastExpr> },
    /// Pointer identity
    Is(Box<CastExpr>, Box<CastExpr>),
    Select {
        cond: Box<CastExpr>,
        then: Box<CastExpr>,
        otherwise: Box<CastExpr>,
    },
    Stub,
}

impl CastExpr {
    fn call(primitive: &'static str, args: Vec<CastExpr>) -> Self {
        CastExpr::Call { primitive, args }
    }

    fn call_on_arg(primitive: &'static str) -> Self {
        Self::call(primitive, vec![CastExpr::Arg])
    }

    fn convert(to: DataType, value: CastExpr) -> Self {
        CastExpr::Convert {
            to,
            value: Box::new(value),
        }
    }

    /// Host primitives and constants the body refers to
    pub fn primitives(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        self.collect_primitives(&mut out);
        out
    }

    fn collect_primitives(&self, out: &mut Vec<&'static str>) {
        match self {
            CastExpr::Arg | CastExpr::Stub => {}
            CastExpr::Const(name) => out.push(*name),
            CastExpr::Call { primitive, args } => {
                out.push(*primitive);
                for arg in args {
                    arg.collect_primitives(out);
                }
            }
            CastExpr::Convert { value, .. } => value.collect_primitives(out),
            CastExpr::Is(left, right) => {
                left.collect_primitives(out);
                right.collect_primitives(out);
            }
            CastExpr::Select {
                cond,
                then,
                otherwise,
            } => {
                cond.collect_primitives(out);
                then.collect_primitives(out);
                otherwise.collect_primitives(out);
            }
        }
    }
}

impl fmt::Display for CastExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastExpr::Arg => f.write_str("x"),
            CastExpr::Const(name) => f.write_str(name),
            CastExpr::Call { primitive, args } => {
                write!(f, "{}(", primitive)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            CastExpr::Convert { to, value } => write!(f, "({}){}", c_type_name(*to), value),
            CastExpr::Is(left, right) => write!(f, "{} == {}", left, right),
            CastExpr::Select {
                cond,
                then,
                otherwise,
            } => write!(f, "{} ? {} : {}", cond, then, otherwise),
            CastExpr::Stub => f.write_str("/* unimplemented */"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CastFunction {
    pub name: &'static str,
    pub input: DataType,
    pub output: DataType,
    pub body: CastExpr,
}

impl fmt::Display for CastFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}({} x) {{ return {}; }}",
            c_type_name(self.output),
            self.name,
            c_type_name(self.input),
            self.body
        )
    }
}

pub(crate) fn standard() -> Vec<CastFunction> {
    let object = DataType::host_object();
    let int = DataType::integer;
    let real = DataType::real;
    let complex = DataType::complex;

    let cast = |name, input, output, body| CastFunction {
        name,
        input,
        output,
        body,
    };

    vec![
        cast(
            "Bool_to_PyBool",
            DataType::bool(),
            object,
            CastExpr::Select {
                cond: Box::new(CastExpr::Arg),
                then: Box::new(CastExpr::Const("Py_True")),
                otherwise: Box::new(CastExpr::Const("Py_False")),
            },
        ),
        // bool singletons are canonical, so identity decides
        cast(
            "PyBool_to_Bool",
            object,
            DataType::bool(),
            CastExpr::Is(Box::new(CastExpr::Arg), Box::new(CastExpr::Const("Py_True"))),
        ),
        cast(
            "Complex64_to_PyComplex",
            complex(4),
            object,
            CastExpr::call(
                "PyComplex_FromDoubles",
                vec![
                    CastExpr::convert(real(8), CastExpr::call_on_arg("crealf")),
                    CastExpr::convert(real(8), CastExpr::call_on_arg("cimagf")),
                ],
            ),
        ),
        cast(
            "Complex128_to_PyComplex",
            complex(8),
            object,
            CastExpr::call(
                "PyComplex_FromDoubles",
                vec![CastExpr::call_on_arg("creal"), CastExpr::call_on_arg("cimag")],
            ),
        ),
        cast(
            "PyComplex_to_Complex64",
            object,
            complex(4),
            CastExpr::call(
                "CMPLXF",
                vec![
                    CastExpr::convert(real(4), CastExpr::call_on_arg("PyComplex_RealAsDouble")),
                    CastExpr::convert(real(4), CastExpr::call_on_arg("PyComplex_ImagAsDouble")),
                ],
            ),
        ),
        cast(
            "PyComplex_to_Complex128",
            object,
            complex(8),
            CastExpr::call(
                "CMPLX",
                vec![
                    CastExpr::call_on_arg("PyComplex_RealAsDouble"),
                    CastExpr::call_on_arg("PyComplex_ImagAsDouble"),
                ],
            ),
        ),
        cast(
            "PyArray_to_ndarray",
            DataType::host_array_object(),
            ARRAY_DESCRIPTOR,
            CastExpr::Stub,
        ),
        cast(
            "PyInt64_to_Int64",
            object,
            int(8),
            CastExpr::convert(int(8), CastExpr::call_on_arg("PyLong_AsLongLong")),
        ),
        cast(
            "PyInt32_to_Int32",
            object,
            int(4),
            CastExpr::convert(int(4), CastExpr::call_on_arg("PyLong_AsLong")),
        ),
        cast(
            "PyInt16_to_Int16",
            object,
            int(2),
            CastExpr::convert(int(2), CastExpr::call_on_arg("PyLong_AsLong")),
        ),
        cast(
            "PyInt8_to_Int8",
            object,
            int(1),
            CastExpr::convert(int(1), CastExpr::call_on_arg("PyLong_AsLong")),
        ),
        cast(
            "PyFloat_to_Float",
            object,
            real(4),
            CastExpr::convert(real(4), CastExpr::call_on_arg("PyFloat_AsDouble")),
        ),
        cast(
            "PyDouble_to_Double",
            object,
            real(8),
            CastExpr::call_on_arg("PyFloat_AsDouble"),
        ),
        cast(
            "Int64_to_PyInt64",
            int(8),
            object,
            CastExpr::call_on_arg("PyLong_FromLongLong"),
        ),
        cast(
            "Double_to_PyDouble",
            real(8),
            object,
            CastExpr::call_on_arg("PyFloat_FromDouble"),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(name: &str) -> CastFunction {
        standard()
            .into_iter()
            .find(|c| c.name == name)
            .expect("cast in catalogue")
    }

    #[test]
    fn test_bool_casts_compare_singletons() {
        let to_bool = find("PyBool_to_Bool");
        assert_eq!(to_bool.body.to_string(), "x == Py_True");
        assert_eq!(to_bool.output, DataType::bool());

        let to_object = find("Bool_to_PyBool");
        assert_eq!(to_object.body.to_string(), "x ? Py_True : Py_False");
    }

    #[test]
    fn test_complex_casts() {
        assert_eq!(
            find("Complex64_to_PyComplex").body.to_string(),
            "PyComplex_FromDoubles((double)crealf(x), (double)cimagf(x))"
        );
        assert_eq!(
            find("PyComplex_to_Complex128").body.to_string(),
            "CMPLX(PyComplex_RealAsDouble(x), PyComplex_ImagAsDouble(x))"
        );
        assert_eq!(
            find("PyComplex_to_Complex64").body.primitives(),
            vec!["CMPLXF", "PyComplex_RealAsDouble", "PyComplex_ImagAsDouble"]
        );
    }

    #[test]
    fn test_array_cast_is_stubbed() {
        let array = find("PyArray_to_ndarray");
        assert_eq!(array.input, DataType::host_array_object());
        assert_eq!(array.body, CastExpr::Stub);
        assert!(array.body.primitives().is_empty());
    }

    #[test]
    fn test_cast_names_are_unique() {
        let mut names: Vec<_> = standard().into_iter().map(|c| c.name).collect();
        let count = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), count);
    }

    #[test]
    fn test_signature_rendering() {
        assert_eq!(
            find("PyDouble_to_Double").to_string(),
            "double PyDouble_to_Double(PyObject * x) { return PyFloat_AsDouble(x); }"
        );
    }
}
