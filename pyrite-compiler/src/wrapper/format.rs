// Format strings of the host argument-parsing and value-building calls

use crate::registry::FormatCode;

/// Marks every following code as optional
pub const OPTIONAL_SEPARATOR: char = '|';

/// Codes in declared order, with one separator before the first defaulted target
pub fn parse_format<'c>(targets: impl IntoIterator<Item = (&'c FormatCode, bool)>) -> String {
    let mut flags = String::new();
    let mut optional = false;
    for (format, has_default) in targets {
        if has_default && !optional {
            flags.push(OPTIONAL_SEPARATOR);
            optional = true;
        }
        flags.push_str(&format.code);
    }
    flags
}

/// Codes of the results in order; every result is always produced
pub fn build_format<'c>(results: impl IntoIterator<Item = &'c FormatCode>) -> String {
    results.into_iter().map(|f| f.code.as_str()).collect()
}
