//! Text handling for iCalendar property values.
//!
//! - [`escape_text`] / [`unescape_text`]: RFC 5545 TEXT value escaping
//! - [`html_to_text`]: reduces operator-supplied HTML descriptions to plain text

use std::sync::LazyLock;

use regex::Regex;

/// Matches `<br>`, `<br/>` and `<br />` in any case.
static BREAK_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("Invalid break tag regex"));

/// Matches any remaining markup tag.
static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid tag regex"));

/// Matches runs of three or more newlines.
static BLANK_RUN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("Invalid blank run regex"));

/// Legacy references browsers accept without the trailing semicolon.
static BARE_ENTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(amp|lt|gt|quot|nbsp|copy|reg)([^A-Za-z0-9;]|$)").expect("Invalid bare entity regex")
});

/// Escapes a value for a TEXT property (`SUMMARY`, `DESCRIPTION`, `LOCATION`).
///
/// Backslashes are escaped first so the sequences inserted for `;`, `,`
/// and newlines are not escaped a second time.
pub fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

/// Reverses [`escape_text`].
///
/// Unknown escape sequences are kept verbatim, `\N` is accepted as a newline.
pub fn unescape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some(';') => out.push(';'),
            Some(',') => out.push(','),
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Converts an HTML fragment to plain text.
///
/// Line-break tags become newlines, every other tag is dropped, character
/// references are decoded and runs of blank lines collapse to one.
pub fn html_to_text(html: &str) -> String {
    let text = BREAK_TAG_REGEX.replace_all(html, "\n");
    let text = TAG_REGEX.replace_all(&text, "");
    let text = decode_entities(&text);
    let text = BLANK_RUN_REGEX.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Decodes HTML character references, named (the full HTML5 set) and
/// numeric. Unrecognized names are left as-is.
pub fn decode_entities(text: &str) -> String {
    let terminated = BARE_ENTITY_REGEX.replace_all(text, "&$1;$2");
    html_escape::decode_html_entities(&terminated).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_order_backslash_first() {
        assert_eq!(escape_text(r"a\;b"), r"a\\\;b");
        assert_eq!(escape_text("one, two; three\nfour"), r"one\, two\; three\nfour");
    }

    #[test]
    fn escape_unescape_recovers_input() {
        let samples = [
            "",
            "plain",
            r"C:\path\to;file,list",
            "line one\nline two",
            "\\n is not a newline",
            "trailing backslash \\",
            ";;,,\\\\\n\n",
            "mixed \\; already-escaped-looking \\, text\n",
        ];
        for s in samples {
            assert_eq!(unescape_text(&escape_text(s)), s, "round trip failed for {:?}", s);
        }
    }

    #[test]
    fn unescape_keeps_unknown_sequences() {
        assert_eq!(unescape_text(r"a\tb"), r"a\tb");
        assert_eq!(unescape_text(r"A\NB"), "A\nB");
    }

    #[test]
    fn html_breaks_and_tags() {
        let html = "<p>Agenda<br>Item&nbsp;1<BR />Item 2</p>";
        assert_eq!(html_to_text(html), "Agenda\nItem\u{a0}1\nItem 2");
    }

    #[test]
    fn html_collapses_blank_runs() {
        let html = "First<br><br><br><br>Second";
        assert_eq!(html_to_text(html), "First\n\nSecond");
    }

    #[test]
    fn html_decodes_entities() {
        assert_eq!(
            html_to_text("Q&amp;A &lt;tbd&gt; &#39;x&#x27; &unknown;"),
            "Q&A <tbd> 'x' &unknown;"
        );
        assert_eq!(
            html_to_text("caf&eacute; &frac12; hour, &sect;4.2"),
            "caf\u{e9} \u{bd} hour, \u{a7}4.2"
        );
    }

    #[test]
    fn html_decodes_references_without_semicolon() {
        assert_eq!(decode_entities("R&amp D"), "R& D");
        assert_eq!(decode_entities("Q&A &amp"), "Q&A &");
        assert_eq!(decode_entities("&copy 2025"), "\u{a9} 2025");
    }

    #[test]
    fn html_empty_input() {
        assert_eq!(html_to_text(""), "");
        assert_eq!(html_to_text("<div>  </div>"), "");
    }
}
