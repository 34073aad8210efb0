// util.rs
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::QuoteError;

/// Extension of the flat files backing each quote database.
pub const QDB_EXTENSION: &str = "qdb";

/// Escapes the characters that are significant inside HTML text and attribute values.
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn read_file(path: &Path) -> Result<String, QuoteError> {
    fs::read_to_string(path).map_err(QuoteError::io(path))
}

/// Overwrites `path` with `contents`, creating the file if needed.
pub fn write_file(path: &Path, contents: &str) -> Result<(), QuoteError> {
    let mut file = fs::File::create(path).map_err(QuoteError::io(path))?;
    file.write_all(contents.as_bytes())
        .and_then(|_| file.flush())
        .map_err(QuoteError::io(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<script>alert("x & 'y'")</script>"#),
            "&lt;script&gt;alert(&quot;x &amp; &#39;y&#39;&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("plain text"), "plain text");
    }
}
