// Builtin call lowering: name resolution, construction and diagnostics

use log::debug;
use pyrite_ast::{construct_builtin, AstArena, Builtin, BuiltinKind, ConstructError, Construct, Node};
use pyrite_diagnostics::{error_codes, fuzzy, Diagnostic, DiagnosticEngine, SymbolRef};

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion
const SUGGESTION_THRESHOLD: f64 = 0.8;
const MAX_SUGGESTIONS: usize = 3;

/// Resolves builtin calls of one compilation unit into typed nodes
pub struct BuiltinLowering<'a, 'e> {
    arena: &'a AstArena<'a>,
    engine: &'e mut DiagnosticEngine,
}

impl<'a, 'e> BuiltinLowering<'a, 'e> {
    pub fn new(arena: &'a AstArena<'a>, engine: &'e mut DiagnosticEngine) -> Self {
        Self { arena, engine }
    }

    /// Lower `name(args...)`; `None` when a diagnostic was emitted instead
    pub fn lower_call(&mut self, name: &str, args: &[&'a Node<'a>]) -> Option<Builtin<'a>> {
        let Some(kind) = BuiltinKind::from_name(name) else {
            let candidates: Vec<&str> = BuiltinKind::names().collect();
            let suggestions = fuzzy::find_similar_names(
                name,
                &candidates,
                SUGGESTION_THRESHOLD,
                MAX_SUGGESTIONS,
            );
            self.engine.unknown_builtin(name, suggestions);
            return None;
        };

        match construct_builtin(self.arena, kind, args) {
            Ok(builtin) => {
                if let Builtin::Value(construct) = &builtin {
                    self.note_shortcut(kind, construct);
                }
                Some(builtin)
            }
            Err(err) => {
                debug!("`{}` rejected: {}", name, err);
                self.report(kind, &err);
                None
            }
        }
    }

    fn note_shortcut(&mut self, kind: BuiltinKind, construct: &Construct<'a>) {
        let (code, message) = match construct {
            Construct::Folded(node) => (
                error_codes::CONSTANT_FOLDED,
                format!("`{}` call folded into `{}`", kind, node),
            ),
            Construct::Passthrough(node) => (
                error_codes::CAST_ELIDED,
                format!("`{}` of `{}` is the value itself", kind, node),
            ),
            _ => return,
        };
        self.engine
            .emit(Diagnostic::info(code, message).with_symbol(SymbolRef::builtin(kind.name())));
    }

    fn report(&mut self, kind: BuiltinKind, err: &ConstructError) {
        match err {
            ConstructError::Arity {
                builtin,
                expected,
                found,
            } => self.engine.argument_count_mismatch(builtin, expected, *found),
            ConstructError::UndeterminedDtype { .. } => self.engine.emit(
                Diagnostic::fatal(error_codes::UNDETERMINED_DTYPE, err.to_string())
                    .with_symbol(SymbolRef::builtin(kind.name())),
            ),
            ConstructError::UnknownOperand { dtype, .. } => self.engine.emit(
                Diagnostic::error(error_codes::UNKNOWN_OPERAND, err.to_string())
                    .with_symbol(SymbolRef::builtin(kind.name()))
                    .with_note(format!("operand has type {}", dtype))
                    .with_help(operand_help(kind).to_string()),
            ),
            ConstructError::InvalidLiteral { .. } => self.engine.emit_error(
                error_codes::INVALID_LITERAL,
                err.to_string(),
                SymbolRef::builtin(kind.name()),
            ),
        }
    }
}

fn operand_help(kind: BuiltinKind) -> &'static str {
    match kind {
        BuiltinKind::Sum | BuiltinKind::Max | BuiltinKind::Min => {
            "reductions need an iterable of numbers"
        }
        BuiltinKind::Imag => "`imag` needs a numeric or boolean value",
        _ => "the operand type is not supported here",
    }
}
