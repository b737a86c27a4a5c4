/// Extracts the trailing partial token a completion request applies to.
///
/// Scans backward from the end of the fragment and stops at the first
/// character that is not alphanumeric, underscore, whitespace, dot, or an
/// opening parenthesis; everything before that boundary is fixed context.
/// Within the remaining region the token is the trailing run of identifier
/// and dot characters, so `print(os.pa` completes `os.pa`.
pub(crate) fn partial_token(source: &str) -> &str {
    let region_start = source
        .char_indices()
        .rev()
        .find(|(_, ch)| !is_region_char(*ch))
        .map(|(i, ch)| i + ch.len_utf8())
        .unwrap_or(0);
    let region = &source[region_start..];

    let token_start = region
        .char_indices()
        .rev()
        .find(|(_, ch)| !is_token_char(*ch))
        .map(|(i, ch)| i + ch.len_utf8())
        .unwrap_or(0);
    &region[token_start..]
}

fn is_region_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch.is_whitespace() || ch == '_' || ch == '.' || ch == '('
}

fn is_token_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '.'
}

#[cfg(test)]
mod tests {
    use super::partial_token;

    #[test]
    fn bare_dotted_path_is_the_token() {
        assert_eq!(partial_token("os.pa"), "os.pa");
    }

    #[test]
    fn token_after_assignment_boundary() {
        assert_eq!(partial_token("x = os.pa"), "os.pa");
    }

    #[test]
    fn open_call_keeps_inner_token() {
        assert_eq!(partial_token("print(os.pa"), "os.pa");
    }

    #[test]
    fn empty_and_operator_endings_yield_empty_token() {
        assert_eq!(partial_token(""), "");
        assert_eq!(partial_token("1 + "), "");
        assert_eq!(partial_token("x ="), "");
    }

    #[test]
    fn string_boundary_stops_the_scan() {
        assert_eq!(partial_token("\"text\" + cou"), "cou");
    }
}
