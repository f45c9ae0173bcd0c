use pyrite_diagnostics::{error_codes, Diagnostic, DiagnosticEngine, SymbolRef};
use serde_json::Value;

#[test]
fn test_diagnostics_json_shape() {
    let mut engine = DiagnosticEngine::new();

    engine.emit(
        Diagnostic::fatal(
            error_codes::TYPE_NOT_IMPLEMENTED,
            "type complex32 is not implemented for boundary crossing".to_string(),
        )
        .with_symbol(SymbolRef::parameter("z"))
        .with_help("register a format code for (complex, 16)".to_string()),
    );
    engine.keyword_only_without_default("solve", "tol");

    let json = engine.to_json().expect("diagnostics serialize");
    let v: Value = serde_json::from_str(&json).expect("valid json");

    let diagnostics = v["diagnostics"].as_array().expect("array of diagnostics");
    assert_eq!(diagnostics.len(), 2);

    assert_eq!(diagnostics[0]["level"], "fatal");
    assert_eq!(diagnostics[0]["code"], "E0201");
    assert_eq!(diagnostics[0]["symbol"]["kind"], "parameter");
    assert_eq!(diagnostics[0]["symbol"]["name"], "z");
    assert!(diagnostics[0].get("notes").is_none());

    assert_eq!(diagnostics[1]["level"], "warning");
    assert_eq!(diagnostics[1]["symbol"]["name"], "tol");
    assert_eq!(diagnostics[1]["notes"][0], "in wrapper for function `solve`");
}

#[test]
fn test_messages_with_quotes_stay_valid_json() {
    let mut engine = DiagnosticEngine::new();
    engine.emit(Diagnostic::error(
        error_codes::UNKNOWN_OPERAND,
        "unknown operand type \"str\" for `sum`".to_string(),
    ));

    let json = engine.to_json().expect("diagnostics serialize");
    let v: Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(
        v["diagnostics"][0]["message"],
        "unknown operand type \"str\" for `sum`"
    );
}
