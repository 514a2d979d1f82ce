//! Free-text search expression building.
//!
//! A search string is split into terms on whitespace, commas and semicolons.
//! Every term becomes a prefix match and terms are OR-ed, so `"life lov"`
//! matches content containing a word starting with `life` *or* `lov`.
//!
//! The output is an FTS5 `MATCH` expression. It is always bound as a query
//! parameter; each term is wrapped in double quotes so operator keywords and
//! punctuation in user input are treated as plain text.

/// Split raw search text into terms.
#[must_use]
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter(|term| !term.is_empty())
        .collect()
}

/// Build the full-text match expression for `text`.
///
/// Terms without any alphanumeric character would match nothing after the
/// index tokenizer strips punctuation, so they are dropped. Returns `None`
/// when no usable term remains.
#[must_use]
pub fn match_expression(text: &str) -> Option<String> {
    let terms: Vec<String> = tokenize(text)
        .into_iter()
        .filter(|term| term.chars().any(char::is_alphanumeric))
        .map(prefix_term)
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

fn prefix_term(term: &str) -> String {
    let escaped = term.replace('"', "\"\"");
    format!("\"{escaped}\"*")
}
