//! Wrapper protocol generation.
//!
//! Turns a [`FunctionSignature`] into a [`WrapperSpec`]: the format strings
//! handed to the host runtime's argument-parsing and value-building calls,
//! plus the check and cast applied to every value crossing the boundary.
//! Everything is looked up in borrowed [`Registries`]; nothing is defaulted.

use log::{debug, trace, warn};
use pyrite_ast::DataType;
use pyrite_diagnostics::{Diagnostic, DiagnosticEngine, SymbolRef};
use serde::Serialize;

use super::error::WrapperError;
use super::format::{build_format, parse_format};
use super::signature::{FunctionSignature, Parameter};
use crate::registry::{FormatCode, Registries, TypeCheck, ARRAY_DESCRIPTOR};

/// Name of the generated keyword list
pub const KEYWORD_LIST_NAME: &str = "kwlist";

/// Names under which arguments may be passed by keyword
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgKeywords {
    pub name: String,
    pub arg_names: Vec<String>,
}

/// How one argument is pulled out of the host call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArgConversion {
    pub name: String,
    pub native: DataType,
    pub rank: usize,
    /// Type of the parse target
    pub target: DataType,
    pub format: FormatCode,
    /// Follows the optional separator
    pub optional: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<TypeCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cast: Option<String>,
}

/// How one result is handed back to the host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultConversion {
    pub name: String,
    pub native: DataType,
    pub rank: usize,
    pub target: DataType,
    pub format: FormatCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cast: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrapperSpec {
    pub function: String,
    pub parse_format: String,
    pub build_format: String,
    pub arguments: Vec<ArgConversion>,
    pub results: Vec<ResultConversion>,
    pub keywords: ArgKeywords,
}

impl WrapperSpec {
    pub fn argument(&self, name: &str) -> Option<&ArgConversion> {
        self.arguments.iter().find(|a| a.name == name)
    }

    pub fn result(&self, name: &str) -> Option<&ResultConversion> {
        self.results.iter().find(|r| r.name == name)
    }
}

/// A generated value together with the warnings raised while producing it
#[derive(Debug, Clone)]
pub struct Generated<T> {
    pub value: T,
    pub warnings: Vec<Diagnostic>,
}

impl<T> Generated<T> {
    pub fn into_parts(self) -> (T, Vec<Diagnostic>) {
        (self.value, self.warnings)
    }
}

pub struct WrapperGenerator<'r> {
    registries: &'r Registries,
}

impl WrapperGenerator<'static> {
    pub fn standard() -> Self {
        Self::new(Registries::standard())
    }
}

impl<'r> WrapperGenerator<'r> {
    pub fn new(registries: &'r Registries) -> Self {
        Self { registries }
    }

    pub fn registries(&self) -> &'r Registries {
        self.registries
    }

    pub fn generate(
        &self,
        sig: &FunctionSignature,
    ) -> Result<Generated<WrapperSpec>, WrapperError> {
        debug!(
            "generating wrapper for `{}` ({} argument(s), {} result(s))",
            sig.name,
            sig.params.len(),
            sig.results.len()
        );

        let mut optional = false;
        let mut arguments = Vec::with_capacity(sig.params.len());
        for param in &sig.params {
            optional |= param.has_default;
            arguments.push(self.convert_argument(param, optional)?);
        }

        let results = sig
            .results
            .iter()
            .map(|result| self.convert_result(result))
            .collect::<Result<Vec<_>, _>>()?;

        let parse_format = parse_format(
            sig.params
                .iter()
                .zip(&arguments)
                .map(|(param, arg)| (&arg.format, param.has_default)),
        );
        let build_format = build_format(results.iter().map(|r| &r.format));

        let mut warnings = DiagnosticEngine::new();
        for param in sig.params.iter().filter(|p| p.keyword_only && !p.has_default) {
            warn!(
                "`{}`: keyword-only argument `{}` has no default value",
                sig.name, param.name
            );
            warnings.keyword_only_without_default(&sig.name, &param.name);
        }

        let spec = WrapperSpec {
            function: sig.name.clone(),
            parse_format,
            build_format,
            arguments,
            results,
            keywords: ArgKeywords {
                name: KEYWORD_LIST_NAME.to_string(),
                arg_names: sig.params.iter().map(|p| p.name.clone()).collect(),
            },
        };
        debug!(
            "`{}`: parse format \"{}\", build format \"{}\"",
            spec.function, spec.parse_format, spec.build_format
        );

        Ok(Generated {
            value: spec,
            warnings: warnings.into_diagnostics(),
        })
    }

    /// Generate one unit, recording its warnings or its fatal error in `engine`
    pub fn generate_into(
        &self,
        sig: &FunctionSignature,
        engine: &mut DiagnosticEngine,
    ) -> Option<WrapperSpec> {
        match self.generate(sig) {
            Ok(generated) => {
                let (spec, warnings) = generated.into_parts();
                engine.extend(warnings);
                Some(spec)
            }
            Err(err) => {
                debug!("`{}`: generation aborted: {}", sig.name, err);
                engine.emit(err.to_diagnostic(&sig.name));
                None
            }
        }
    }

    /// Generate independent units; a fatal error only drops its own unit
    pub fn generate_all(&self, sigs: &[FunctionSignature]) -> (Vec<WrapperSpec>, DiagnosticEngine) {
        let mut engine = DiagnosticEngine::new();
        let specs = sigs
            .iter()
            .filter_map(|sig| self.generate_into(sig, &mut engine))
            .collect();
        (specs, engine)
    }

    fn format_code(&self, symbol: SymbolRef, dtype: DataType) -> Result<FormatCode, WrapperError> {
        self.registries
            .format_code(dtype)
            .cloned()
            .ok_or(WrapperError::TypeNotImplemented { symbol, dtype })
    }

    fn cast_name(
        &self,
        symbol: SymbolRef,
        from: DataType,
        to: DataType,
    ) -> Result<String, WrapperError> {
        self.registries
            .cast_between(from, to)
            .map(|cast| cast.name.to_string())
            .ok_or(WrapperError::MissingCastFunction { symbol, from, to })
    }

    fn convert_argument(
        &self,
        param: &Parameter,
        optional: bool,
    ) -> Result<ArgConversion, WrapperError> {
        let symbol = SymbolRef::parameter(&param.name);
        let target = param.boundary_type();
        let format = self.format_code(symbol.clone(), target)?;

        let (checks, cast) = if param.is_callable {
            (Vec::new(), None)
        } else if param.rank > 0 {
            let flag = self.registries.type_flag(param.dtype).ok_or_else(|| {
                WrapperError::TypeNotImplemented {
                    symbol: symbol.clone(),
                    dtype: param.dtype,
                }
            })?;
            let cast = self.cast_name(symbol, DataType::host_array_object(), ARRAY_DESCRIPTOR)?;
            (
                vec![TypeCheck::array_rank(param.rank), TypeCheck::array_type(flag)],
                Some(cast),
            )
        } else if format.is_opaque() && !param.is_host_object() {
            let predicate = self.registries.check_predicate(param.dtype.kind).ok_or_else(|| {
                WrapperError::MissingCheckPredicate {
                    symbol: symbol.clone(),
                    kind: param.dtype.kind,
                }
            })?;
            let cast = self.cast_name(symbol, DataType::host_object(), param.dtype)?;
            (vec![TypeCheck::new(predicate)], Some(cast))
        } else {
            (Vec::new(), None)
        };

        trace!(
            "argument `{}`: {} -> {} code {} checks {:?} cast {:?}",
            param.name,
            param.dtype,
            target,
            format,
            checks,
            cast
        );

        Ok(ArgConversion {
            name: param.name.clone(),
            native: param.dtype,
            rank: param.rank,
            target,
            format,
            optional,
            checks,
            cast,
        })
    }

    fn convert_result(&self, result: &Parameter) -> Result<ResultConversion, WrapperError> {
        let symbol = SymbolRef::result(&result.name);
        let target = result.boundary_type();
        let format = self.format_code(symbol.clone(), target)?;

        let cast = if result.rank > 0 {
            Some(self.cast_name(symbol, ARRAY_DESCRIPTOR, target)?)
        } else if format.is_opaque() && !result.is_host_object() {
            Some(self.cast_name(symbol, result.dtype, DataType::host_object())?)
        } else {
            None
        };

        trace!(
            "result `{}`: {} -> {} code {} cast {:?}",
            result.name,
            result.dtype,
            target,
            format,
            cast
        );

        Ok(ResultConversion {
            name: result.name.clone(),
            native: result.dtype,
            rank: result.rank,
            target,
            format,
            cast,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyrite_ast::DataKind;

    #[test]
    fn test_positional_then_defaulted() {
        let sig = FunctionSignature::new("f")
            .param(Parameter::new("x", DataType::integer(4)))
            .param(Parameter::new("y", DataType::real(8)).with_default());

        let spec = WrapperGenerator::standard().generate(&sig).unwrap().value;
        assert_eq!(spec.parse_format, "i|d");
        assert!(!spec.argument("x").unwrap().optional);
        assert!(spec.argument("y").unwrap().optional);
        assert_eq!(spec.keywords.name, "kwlist");
        assert_eq!(spec.keywords.arg_names, vec!["x", "y"]);
    }

    #[test]
    fn test_complex_argument_is_checked_and_cast() {
        let sig = FunctionSignature::new("f").param(Parameter::new("z", DataType::complex(4)));
        let spec = WrapperGenerator::standard().generate(&sig).unwrap().value;

        let z = spec.argument("z").unwrap();
        assert_eq!(z.format.code, "O");
        assert_eq!(z.checks, vec![TypeCheck::new("PyComplex_Check")]);
        assert_eq!(z.cast.as_deref(), Some("PyComplex_to_Complex64"));
    }

    #[test]
    fn test_plain_scalars_need_no_conversion() {
        let sig = FunctionSignature::new("f")
            .param(Parameter::new("n", DataType::integer(8)))
            .param(Parameter::new("flag", DataType::bool()))
            .param(Parameter::new("s", DataType::string()));
        let spec = WrapperGenerator::standard().generate(&sig).unwrap().value;

        assert_eq!(spec.parse_format, "lps");
        assert!(spec.arguments.iter().all(|a| a.checks.is_empty() && a.cast.is_none()));
    }

    #[test]
    fn test_array_argument_uses_two_token_code() {
        let sig = FunctionSignature::new("f")
            .param(Parameter::new("a", DataType::real(8)).with_rank(2));
        let spec = WrapperGenerator::standard().generate(&sig).unwrap().value;

        let a = spec.argument("a").unwrap();
        assert_eq!(spec.parse_format, "O!");
        assert_eq!(a.target, DataType::host_array_object());
        assert_eq!(a.format.type_descriptor.as_deref(), Some("PyArray_Type"));
        assert_eq!(
            a.checks,
            vec![TypeCheck::array_rank(2), TypeCheck::array_type(5)]
        );
        assert_eq!(a.cast.as_deref(), Some("PyArray_to_ndarray"));
    }

    #[test]
    fn test_array_element_type_without_flag_is_fatal() {
        let sig = FunctionSignature::new("f")
            .param(Parameter::new("a", DataType::real(16)).with_rank(1));

        let err = WrapperGenerator::standard().generate(&sig).unwrap_err();
        assert_eq!(
            err,
            WrapperError::TypeNotImplemented {
                symbol: SymbolRef::parameter("a"),
                dtype: DataType::real(16)
            }
        );
    }

    #[test]
    fn test_array_element_flag_follows_dtype() {
        let sig = FunctionSignature::new("f")
            .param(Parameter::new("a", DataType::integer(4)).with_rank(1));
        let spec = WrapperGenerator::standard().generate(&sig).unwrap().value;

        assert_eq!(
            spec.argument("a").unwrap().checks[1].to_string(),
            "PyArray_Check_Type(o, 1)"
        );
    }

    #[test]
    fn test_callable_is_opaque_regardless_of_dtype() {
        let sig = FunctionSignature::new("f")
            .param(Parameter::new("g", DataType::real(8)).callable());
        let spec = WrapperGenerator::standard().generate(&sig).unwrap().value;

        let g = spec.argument("g").unwrap();
        assert_eq!(spec.parse_format, "O");
        assert!(g.checks.is_empty());
        assert!(g.cast.is_none());
    }

    #[test]
    fn test_complex_result_is_cast_to_object() {
        let sig = FunctionSignature::new("f")
            .result(Parameter::new("r", DataType::integer(8)))
            .result(Parameter::new("z", DataType::complex(8)));
        let spec = WrapperGenerator::standard().generate(&sig).unwrap().value;

        assert_eq!(spec.build_format, "lO");
        assert_eq!(spec.result("r").unwrap().cast, None);
        assert_eq!(
            spec.result("z").unwrap().cast.as_deref(),
            Some("Complex128_to_PyComplex")
        );
    }

    #[test]
    fn test_missing_predicate_is_fatal() {
        let registries = Registries::builder()
            .format_code(DataType::string(), FormatCode::new("O"))
            .build();
        let sig = FunctionSignature::new("f").param(Parameter::new("s", DataType::string()));

        let err = WrapperGenerator::new(&registries).generate(&sig).unwrap_err();
        assert_eq!(
            err,
            WrapperError::MissingCheckPredicate {
                symbol: SymbolRef::parameter("s"),
                kind: DataKind::String
            }
        );
    }

    #[test]
    fn test_array_result_without_cast_is_fatal() {
        let sig = FunctionSignature::new("f")
            .result(Parameter::new("out", DataType::real(8)).with_rank(1));
        let err = WrapperGenerator::standard().generate(&sig).unwrap_err();
        assert!(matches!(err, WrapperError::MissingCastFunction { .. }));
        assert_eq!(err.symbol(), &SymbolRef::result("out"));
    }
}
