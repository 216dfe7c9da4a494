pub mod airlines;
pub mod airports;
pub mod countries;
pub mod users;

/// Maximum number of rows returned by list queries.
pub const MAX_LIST_ROWS: i64 = 200;

/// Builds a `like` pattern matching `needle` anywhere, escaping wildcards with `\`.
///
/// SQLite compares ASCII letters case-insensitively in `like`.
pub fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');

    pattern
}
