use std::path::Path;

use log::info;

use crate::error::QuoteError;
use crate::util::{escape_html, read_file};

pub const NAME_OPTIONS: &str = "%NAME_OPTIONS%";
pub const COUNTER: &str = "%COUNTER%";
pub const NAME: &str = "%NAME%";
pub const QUOTE: &str = "%QUOTE%";

/// The four page templates, read once at startup.
#[derive(Debug, Clone, Default)]
pub struct Templates {
    index: String,
    add: String,
    add_database: String,
    quote: String,
}

impl Templates {
    pub fn load(root_dir: &Path) -> Result<Self, QuoteError> {
        let load = |file: &str| {
            let path = root_dir.join(file);
            let html = read_file(&path)?;
            info!("Loaded template {}", path.display());
            Ok::<_, QuoteError>(html)
        };
        Ok(Self {
            index: load("index.html")?,
            add: load("add.html")?,
            add_database: load("adddb.html")?,
            quote: load("quote.html")?,
        })
    }

    pub fn from_strings(index: &str, add: &str, add_database: &str, quote: &str) -> Self {
        Self {
            index: index.to_string(),
            add: add.to_string(),
            add_database: add_database.to_string(),
            quote: quote.to_string(),
        }
    }

    /// Index page: one link per database and the hit count.
    pub fn render_index(&self, names: &[String], hits: u64) -> String {
        let links = names
            .iter()
            .map(|name| {
                let name = escape_html(name);
                format!("<a href=\"/quote/{}\">{}</a><br/>", name, name)
            })
            .collect::<Vec<_>>()
            .join("\n");
        self.index
            .replace(NAME_OPTIONS, &links)
            .replace(COUNTER, &hits.to_string())
    }

    /// "Add quote" form with every database as a selectable option.
    pub fn render_add(&self, names: &[String]) -> String {
        let options = names
            .iter()
            .map(|name| {
                let name = escape_html(name);
                format!("<option value=\"{}\">{}</option>", name, name)
            })
            .collect::<Vec<_>>()
            .join("\n");
        self.add.replace(NAME_OPTIONS, &options)
    }

    pub fn render_add_database(&self) -> String {
        self.add_database.clone()
    }

    pub fn render_quote(&self, name: &str, quote: &str) -> String {
        self.quote
            .replace(NAME, &escape_html(name))
            .replace(QUOTE, &escape_html(quote))
    }
}
