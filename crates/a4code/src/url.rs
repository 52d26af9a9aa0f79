//! Link target validation shared by every HTML renderer.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

fn scheme_regex() -> &'static Regex {
    static SCHEME_REGEX: OnceLock<Regex> = OnceLock::new();
    SCHEME_REGEX
        .get_or_init(|| Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*):").expect("Invalid scheme regex"))
}

/// Returns the scheme of `raw` in lowercase, if it has one.
pub fn scheme(raw: &str) -> Option<String> {
    scheme_regex()
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

/// Validates a link target for use in an `href`.
///
/// Returns the HTML-escaped target together with `true` when the scheme is
/// `http` or `https`. Any other target comes back escaped with `false`, to be
/// shown as text instead of linked.
pub fn sanitize_url(raw: &str) -> (String, bool) {
    let safe = escape_attr(raw).into_owned();
    let ok = !raw.chars().any(char::is_control)
        && matches!(scheme(raw).as_deref(), Some("http" | "https"));
    (safe, ok)
}

/// Escapes `& < >` for HTML body text.
pub fn escape_text(s: &str) -> Cow<'_, str> {
    html_escape::encode_text(s)
}

/// Escapes a value for a double-quoted HTML attribute.
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("http://example.com", true)]
    #[case("https://example.com/a?b=c&d", true)]
    #[case("HTTPS://EXAMPLE.COM", true)]
    #[case("javascript:alert(1)", false)]
    #[case("ftp://example.com", false)]
    #[case("example.com", false)]
    #[case("/relative/path", false)]
    #[case("", false)]
    #[case("http://exa\u{7}mple.com", false)]
    fn only_http_schemes_are_linkable(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(sanitize_url(raw).1, ok);
    }

    #[test]
    fn sanitized_targets_are_escaped() {
        assert_eq!(
            sanitize_url("http://x/?a=1&b=\"2\""),
            ("http://x/?a=1&amp;b=&quot;2&quot;".to_string(), true)
        );
        assert_eq!(
            sanitize_url("<script>"),
            ("&lt;script&gt;".to_string(), false)
        );
    }

    #[test]
    fn scheme_is_lowercased() {
        assert_eq!(scheme("Mailto:me@example.com").as_deref(), Some("mailto"));
        assert_eq!(scheme("no scheme here"), None);
    }
}
