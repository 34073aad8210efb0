// error.rs
use std::io;
use std::path::PathBuf;

use log::{error, warn};
use rocket::http::{ContentType, Status};
use rocket::response::{self, Responder};
use rocket::Request;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("no such database: {0}")]
    DatabaseNotFound(String),

    #[error("database {0} has no quotes")]
    EmptyDatabase(String),

    #[error("index {index} out of range for database of size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("malformed query: {0}")]
    MalformedQuery(String),

    #[error("missing query parameter: {0}")]
    MissingParameter(&'static str),

    #[error("invalid database name: {0:?}")]
    InvalidName(String),

    #[error("invalid quote: {0}")]
    InvalidQuote(&'static str),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl QuoteError {
    /// Wraps an I/O error with the path it happened on, for use with `map_err`.
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> QuoteError {
        let path = path.into();
        move |source| QuoteError::Io { path, source }
    }

    pub fn status(&self) -> Status {
        match self {
            QuoteError::DatabaseNotFound(_)
            | QuoteError::EmptyDatabase(_)
            | QuoteError::IndexOutOfRange { .. } => Status::NotFound,
            QuoteError::MalformedQuery(_)
            | QuoteError::MissingParameter(_)
            | QuoteError::InvalidName(_)
            | QuoteError::InvalidQuote(_) => Status::BadRequest,
            QuoteError::Io { .. } => Status::InternalServerError,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for QuoteError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        if status == Status::InternalServerError {
            error!("{} {}: {}", req.method(), req.uri(), self);
        } else {
            warn!("{} {}: {}", req.method(), req.uri(), self);
        }
        (status, (ContentType::Plain, self.to_string())).respond_to(req)
    }
}
