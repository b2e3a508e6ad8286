use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum QueryError {
    #[error("invalid pattern in search term '{term}': {source}")]
    InvalidPattern {
        term: String,
        #[source]
        source: regex::Error,
    },

    #[error("empty path segment in search term '{term}'")]
    EmptySegment { term: String },

    #[error("search term '{term}' has a pattern but no key")]
    MissingKey { term: String },
}
