use std::collections::HashMap;

use url::form_urlencoded;

use crate::error::QuoteError;

/// Decoded `key=value` pairs of a request's query string.
#[derive(Debug, Default)]
pub struct QueryParams {
    pairs: HashMap<String, String>,
}

impl QueryParams {
    /// Parses a raw query string.
    ///
    /// Every `&`-separated segment must hold exactly one `=`. Keys and values are
    /// URL-decoded (`%XX` escapes and `+` as space); a repeated key keeps its last value.
    pub fn parse(raw: Option<&str>) -> Result<Self, QuoteError> {
        let raw = match raw {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Err(QuoteError::MalformedQuery("missing query string".into())),
        };

        let mut pairs = HashMap::new();
        for segment in raw.split('&') {
            match segment.split_once('=') {
                Some((key, value)) if !key.is_empty() && !value.contains('=') => {}
                _ => return Err(QuoteError::MalformedQuery(format!("bad pair {:?}", segment))),
            }
            for (key, value) in form_urlencoded::parse(segment.as_bytes()) {
                pairs.insert(key.into_owned(), value.into_owned());
            }
        }
        Ok(Self { pairs })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.get(key).map(String::as_str)
    }

    pub fn require(&self, key: &'static str) -> Result<&str, QuoteError> {
        self.get(key).ok_or(QuoteError::MissingParameter(key))
    }
}
