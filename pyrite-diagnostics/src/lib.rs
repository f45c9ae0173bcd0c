// Diagnostics for the Pyrite compiler core
// Severity-tagged messages that name the symbol they are about

use colored::Colorize;
use serde::Serialize;
use std::fmt;

pub mod symbol;
pub use symbol::{SymbolKind, SymbolRef};

/// Error severity levels
///
/// `Fatal` aborts generation of the current compilation unit, `Error`
/// rejects a construct but lets the unit continue, `Warning` and below
/// never stop anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorLevel {
    Fatal,
    Error,
    Warning,
    Info,
    Note,
    Help,
}

impl ErrorLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorLevel::Fatal => "fatal",
            ErrorLevel::Error => "error",
            ErrorLevel::Warning => "warning",
            ErrorLevel::Info => "info",
            ErrorLevel::Note => "note",
            ErrorLevel::Help => "help",
        }
    }
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorLevel::Fatal => write!(f, "{}", "fatal".red().bold()),
            ErrorLevel::Error => write!(f, "{}", "error".red().bold()),
            ErrorLevel::Warning => write!(f, "{}", "warning".yellow().bold()),
            ErrorLevel::Info => write!(f, "{}", "info".blue().bold()),
            ErrorLevel::Note => write!(f, "{}", "note".cyan().bold()),
            ErrorLevel::Help => write!(f, "{}", "help".green().bold()),
        }
    }
}

/// Structured diagnostic message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub level: ErrorLevel,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<SymbolRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn new(level: ErrorLevel, code: &str, message: String) -> Self {
        Self {
            level,
            code: code.to_string(),
            message,
            symbol: None,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn fatal(code: &str, message: String) -> Self {
        Self::new(ErrorLevel::Fatal, code, message)
    }

    pub fn error(code: &str, message: String) -> Self {
        Self::new(ErrorLevel::Error, code, message)
    }

    pub fn warning(code: &str, message: String) -> Self {
        Self::new(ErrorLevel::Warning, code, message)
    }

    pub fn info(code: &str, message: String) -> Self {
        Self::new(ErrorLevel::Info, code, message)
    }

    pub fn note(message: String) -> Self {
        Self::new(ErrorLevel::Note, "", message)
    }

    pub fn with_symbol(mut self, symbol: SymbolRef) -> Self {
        self.symbol = Some(symbol);
        self
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    fn header(&self) -> String {
        let mut output = if self.code.is_empty() {
            format!("{}: {}\n", self.level, self.message.bold())
        } else {
            format!("{}[{}]: {}\n", self.level, self.code, self.message.bold())
        };

        if let Some(symbol) = &self.symbol {
            output.push_str(&format!(" {} in {}\n", "-->".cyan().bold(), symbol));
        }
        output
    }

    fn trailer(&self) -> String {
        let mut output = String::new();
        for note in &self.notes {
            output.push_str(&format!(" {} {}\n", "=".cyan().bold(), note.cyan()));
        }
        if let Some(help) = &self.help {
            output.push_str(&format!(" {} {}\n", "help:".green().bold(), help));
        }
        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.header(), self.trailer())
    }
}

/// Diagnostic collection and reporting engine
#[derive(Debug, Default)]
pub struct DiagnosticEngine {
    diagnostics: Vec<Diagnostic>,
    fatal_count: usize,
    error_count: usize,
    warning_count: usize,
    info_count: usize,
}

#[derive(Serialize)]
struct JsonReport<'d> {
    diagnostics: &'d [Diagnostic],
}

impl DiagnosticEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        match diagnostic.level {
            ErrorLevel::Fatal => self.fatal_count += 1,
            ErrorLevel::Error => self.error_count += 1,
            ErrorLevel::Warning => self.warning_count += 1,
            ErrorLevel::Info => self.info_count += 1,
            _ => {}
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.emit(diagnostic);
        }
    }

    pub fn emit_error(&mut self, code: &str, message: String, symbol: SymbolRef) {
        self.emit(Diagnostic::error(code, message).with_symbol(symbol));
    }

    pub fn has_fatal(&self) -> bool {
        self.fatal_count > 0
    }

    /// True when any fatal or error diagnostic was emitted
    pub fn has_errors(&self) -> bool {
        self.fatal_count > 0 || self.error_count > 0
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn fatal_count(&self) -> usize {
        self.fatal_count
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn info_count(&self) -> usize {
        self.info_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn at_level(&self, level: ErrorLevel) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.level == level)
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Print all diagnostics to stderr
    pub fn print_all(&self) {
        for diag in &self.diagnostics {
            eprintln!("{}", diag);
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let counts = [
            (self.fatal_count, "fatal error".red().bold()),
            (self.error_count, "error".red().bold()),
            (self.warning_count, "warning".yellow().bold()),
            (self.info_count, "info message".blue().bold()),
        ];
        for (count, label) in counts {
            if count > 0 {
                eprintln!("{} {}{} emitted", count, label, if count == 1 { "" } else { "s" });
            }
        }
    }

    /// Export diagnostics as JSON for tooling
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&JsonReport {
            diagnostics: &self.diagnostics,
        })
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.fatal_count = 0;
        self.error_count = 0;
        self.warning_count = 0;
        self.info_count = 0;
    }
}

/// Helper functions for common diagnostic patterns
impl DiagnosticEngine {
    /// Wrong number of arguments to a builtin; the construct cannot exist
    pub fn argument_count_mismatch(&mut self, builtin: &str, expected: &str, found: usize) {
        self.emit(
            Diagnostic::fatal(
                error_codes::ARGUMENT_COUNT,
                format!(
                    "`{}` takes {} argument{} but {} {} supplied",
                    builtin,
                    expected,
                    if expected == "1" { "" } else { "s" },
                    found,
                    if found == 1 { "was" } else { "were" }
                ),
            )
            .with_symbol(SymbolRef::builtin(builtin)),
        );
    }

    /// Unknown builtin name with "did you mean?" suggestions
    pub fn unknown_builtin(&mut self, name: &str, suggestions: Vec<String>) {
        let mut diag = Diagnostic::error(
            error_codes::UNKNOWN_BUILTIN,
            format!("cannot find builtin `{}`", name),
        )
        .with_symbol(SymbolRef::builtin(name));

        if !suggestions.is_empty() {
            diag = diag.with_help(format!("did you mean `{}`?", suggestions.join("`, `")));
        }

        self.emit(diag);
    }

    /// Keyword-only parameter that the host call convention cannot enforce
    pub fn keyword_only_without_default(&mut self, function: &str, parameter: &str) {
        self.emit(
            Diagnostic::warning(
                error_codes::KWONLY_WITHOUT_DEFAULT,
                format!(
                    "keyword-only argument `{}` has no default value; the host will not raise an error if it is not passed",
                    parameter
                ),
            )
            .with_symbol(SymbolRef::parameter(parameter))
            .with_note(format!("in wrapper for function `{}`", function)),
        );
    }
}

/// Common error codes
pub mod error_codes {
    // Construction errors (E0100-E0199)
    pub const ARGUMENT_COUNT: &str = "E0101";
    pub const UNKNOWN_OPERAND: &str = "E0102";
    pub const UNDETERMINED_DTYPE: &str = "E0103";
    pub const UNKNOWN_BUILTIN: &str = "E0104";
    pub const INVALID_LITERAL: &str = "E0105";

    // Boundary-crossing errors (E0200-E0299)
    pub const TYPE_NOT_IMPLEMENTED: &str = "E0201";
    pub const MISSING_CHECK_PREDICATE: &str = "E0202";
    pub const MISSING_CAST_FUNCTION: &str = "E0203";

    // Configuration errors (E0300-E0399)
    pub const INVALID_REGISTRY_ENTRY: &str = "E0301";

    // Warnings (W0001-W9999)
    pub const KWONLY_WITHOUT_DEFAULT: &str = "W0101";

    // Info messages (I0001-I9999)
    pub const CONSTANT_FOLDED: &str = "I0001";
    pub const CAST_ELIDED: &str = "I0002";
}

/// Fuzzy matching utilities for "did you mean?" suggestions
pub mod fuzzy {
    use std::cmp::Ordering;
    use strsim::jaro_winkler;

    /// Names with Jaro-Winkler similarity above `threshold`, best first
    pub fn find_similar_names<S: AsRef<str>>(
        target: &str,
        candidates: &[S],
        threshold: f64,
        max_suggestions: usize,
    ) -> Vec<String> {
        let mut scored: Vec<(&str, f64)> = candidates
            .iter()
            .map(|candidate| {
                let candidate = candidate.as_ref();
                (candidate, jaro_winkler(target, candidate))
            })
            .filter(|(_, score)| *score > threshold)
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        scored
            .into_iter()
            .take(max_suggestions)
            .map(|(name, _)| name.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display_names_symbol() {
        let diag = Diagnostic::error(error_codes::ARGUMENT_COUNT, "bad call".to_string())
            .with_symbol(SymbolRef::parameter("y"))
            .with_note("declared keyword-only".to_string())
            .with_help("give `y` a default value".to_string());

        let formatted = diag.to_string();

        assert!(formatted.contains("E0101"));
        assert!(formatted.contains("bad call"));
        assert!(formatted.contains("parameter `y`"));
        assert!(formatted.contains("declared keyword-only"));
        assert!(formatted.contains("give `y` a default value"));
    }

    #[test]
    fn test_engine_counts_by_level() {
        let mut engine = DiagnosticEngine::new();
        engine.keyword_only_without_default("f", "y");
        engine.emit(Diagnostic::fatal(
            error_codes::TYPE_NOT_IMPLEMENTED,
            "no format code".to_string(),
        ));
        engine.emit(Diagnostic::note("extra".to_string()));

        assert_eq!(engine.warning_count(), 1);
        assert_eq!(engine.fatal_count(), 1);
        assert!(engine.has_fatal());
        assert!(engine.has_errors());
        assert_eq!(engine.at_level(ErrorLevel::Warning).count(), 1);

        engine.clear();
        assert!(!engine.has_diagnostics());
        assert!(!engine.has_errors());
    }

    #[test]
    fn test_unknown_builtin_help() {
        let mut engine = DiagnosticEngine::new();
        let candidates = ["range", "real", "len"];
        let suggestions = fuzzy::find_similar_names("rang", &candidates, 0.8, 2);
        engine.unknown_builtin("rang", suggestions);

        let diag = &engine.diagnostics()[0];
        assert_eq!(diag.code, error_codes::UNKNOWN_BUILTIN);
        assert_eq!(diag.help.as_deref(), Some("did you mean `range`?"));
    }
}
