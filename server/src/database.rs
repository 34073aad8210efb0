// database.rs

use std::path::{Path, PathBuf};

use log::debug;
use rand::Rng;

use crate::error::QuoteError;
use crate::util::{self, QDB_EXTENSION};

/// Lowercases `raw` and checks that it is usable as a database name.
///
/// Names double as file stems, so only `[a-z0-9_-]` is accepted.
pub fn normalize_name(raw: &str) -> Result<String, QuoteError> {
    let name = raw.trim().to_lowercase();
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if valid {
        Ok(name)
    } else {
        Err(QuoteError::InvalidName(raw.to_string()))
    }
}

/// Location of the backing file for database `name` inside `data_dir`.
pub fn database_path(data_dir: &Path, name: &str) -> PathBuf {
    data_dir.join(format!("{}.{}", name, QDB_EXTENSION))
}

/// An ordered, duplicate-free list of quotes persisted as one quote per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteDatabase {
    name: String,
    quotes: Vec<String>,
}

impl QuoteDatabase {
    pub fn create(name: &str) -> Self {
        Self::with_quotes(name, Vec::new())
    }

    /// Seeds a database with `quotes`, keeping the first occurrence of any duplicate.
    pub fn with_quotes(name: &str, quotes: Vec<String>) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(quotes.len());
        for quote in quotes {
            if !unique.contains(&quote) {
                unique.push(quote);
            }
        }
        Self {
            name: name.to_lowercase(),
            quotes: unique,
        }
    }

    pub fn load(data_dir: &Path, name: &str) -> Result<Self, QuoteError> {
        Self::load_file(&database_path(data_dir, name), name)
    }

    /// Reads the quotes stored at `path` into a database called `name`.
    pub fn load_file(path: &Path, name: &str) -> Result<Self, QuoteError> {
        let content = util::read_file(path)?;
        let quotes = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(String::from)
            .collect();
        let db = Self::with_quotes(name, quotes);
        debug!("Loaded {} quotes from {}", db.size(), path.display());
        Ok(db)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quotes(&self) -> &[String] {
        &self.quotes
    }

    pub fn size(&self) -> usize {
        self.quotes.len()
    }

    pub fn get_quote(&self, index: usize) -> Result<&str, QuoteError> {
        self.quotes
            .get(index)
            .map(String::as_str)
            .ok_or(QuoteError::IndexOutOfRange {
                index,
                size: self.size(),
            })
    }

    pub fn random_quote(&self) -> Result<&str, QuoteError> {
        if self.quotes.is_empty() {
            return Err(QuoteError::EmptyDatabase(self.name.clone()));
        }
        let index = rand::thread_rng().gen_range(0..self.quotes.len());
        self.get_quote(index)
    }

    /// Appends `quote` and rewrites the backing file.
    ///
    /// Returns `Ok(false)` when the quote is already present. If the save fails the
    /// append is undone, so memory never holds a quote the file lacks.
    pub fn add_quote(&mut self, data_dir: &Path, quote: &str) -> Result<bool, QuoteError> {
        if quote.trim().is_empty() {
            return Err(QuoteError::InvalidQuote("quote is empty"));
        }
        if quote.contains('\n') || quote.contains('\r') {
            return Err(QuoteError::InvalidQuote("quote contains a line break"));
        }
        if self.quotes.iter().any(|q| q == quote) {
            return Ok(false);
        }
        self.quotes.push(quote.to_string());
        if let Err(e) = self.save(data_dir) {
            self.quotes.pop();
            return Err(e);
        }
        Ok(true)
    }

    pub fn save(&self, data_dir: &Path) -> Result<(), QuoteError> {
        let mut content = String::new();
        for quote in &self.quotes {
            content.push_str(quote);
            content.push('\n');
        }
        util::write_file(&database_path(data_dir, &self.name), &content)
    }
}
