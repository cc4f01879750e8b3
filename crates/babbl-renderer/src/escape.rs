//! HTML and URL escaping.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Bytes left as-is in URLs: unreserved characters plus delimiters that are
/// already meaningful in a link, so pre-encoded URLs survive unchanged.
const URL_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/')
    .remove(b'#')
    .remove(b':')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'?')
    .remove(b'=')
    .remove(b'%')
    .remove(b'@')
    .remove(b'+')
    .remove(b',')
    .remove(b'&');

/// Escape text for HTML body or attribute position.
///
/// Existing entities are decoded first so `&amp;` is not double-escaped.
/// `&`, `<`, `>` and `"` are encoded; the apostrophe stays literal.
///
/// ```
/// use babbl_renderer::escape_html;
///
/// assert_eq!(escape_html("<script>"), "&lt;script&gt;");
/// assert_eq!(escape_html("it's"), "it's");
/// assert_eq!(escape_html("a &amp; b"), "a &amp; b");
/// ```
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let decoded = html_escape::decode_html_entities(raw);
    html_escape::encode_double_quoted_attribute(&decoded).into_owned()
}

/// Escape a URL for an `href` or `src` attribute.
///
/// Entities are decoded, everything outside the safe set is percent-encoded
/// as UTF-8, and the result is HTML-escaped.
///
/// ```
/// use babbl_renderer::escape_url;
///
/// assert_eq!(escape_url("https://a.b/c d?x=1&y=2"), "https://a.b/c%20d?x=1&amp;y=2");
/// assert_eq!(escape_url("/path%20ok"), "/path%20ok");
/// ```
#[must_use]
pub fn escape_url(raw: &str) -> String {
    let decoded = html_escape::decode_html_entities(raw);
    let encoded = utf8_percent_encode(&decoded, URL_SAFE).to_string();
    html_escape::encode_double_quoted_attribute(&encoded).into_owned()
}

/// Escape literal code content.
///
/// Unlike [`escape_html`] nothing is decoded: `&amp;` in code stays visible as
/// written. The apostrophe is encoded too.
///
/// ```
/// use babbl_renderer::escape_code;
///
/// assert_eq!(escape_code("a < 'b'"), "a &lt; &#x27;b&#x27;");
/// ```
#[must_use]
pub fn escape_code(code: &str) -> String {
    html_escape::encode_quoted_attribute(code).into_owned()
}
