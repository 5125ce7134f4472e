//! Cypher literal rendering for batch submissions.
//!
//! Generated batches are rendered as inline `UNWIND [...]` lists instead of
//! driver-side list parameters; every value the workload produces is an
//! integer, a float, or a string under our control.

/// Escape a string for use inside a single-quoted Cypher literal.
pub fn escape_str(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t");
    format!("'{escaped}'")
}

/// Render a map literal from already-rendered `key: value` entries.
pub fn map_literal(entries: &[String]) -> String {
    format!("{{{}}}", entries.join(", "))
}

/// Render a list literal from already-rendered elements.
pub fn list_literal(elements: &[String]) -> String {
    format!("[{}]", elements.join(", "))
}
