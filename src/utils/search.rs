/// Splits a `search` query value into terms. Commas count as whitespace.
pub fn search_terms(raw: &str) -> Vec<String> {
    raw.replace('\0', "")
        .replace(',', " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// `%term%` pattern for `LIKE ... ESCAPE '\'` with the LIKE wildcards in the
/// term itself escaped. Case is left to `LIKE`, so both sides fold the same way.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace_and_commas() {
        assert_eq!(search_terms("  ada, lovelace\tEng "), vec!["ada", "lovelace", "Eng"]);
    }

    #[test]
    fn blank_search_has_no_terms() {
        assert!(search_terms(" , ").is_empty());
    }

    #[test]
    fn like_pattern_keeps_non_ascii_as_typed() {
        assert_eq!(like_pattern("Élodie"), "%Élodie%");
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_Off"), "%50\\%\\_Off%");
    }
}
