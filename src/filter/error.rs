use thiserror::Error;

/// Errors that can occur when compiling search terms
#[derive(Debug, Error)]
pub enum FilterParseError {
    #[error("Empty search term. Omit --search to match every message")]
    EmptyTerm,

    #[error("Search term '{0}' has an empty segment around the '~~' chain delimiter")]
    EmptyChainToken(String),

    #[error("Invalid search term '{term}': {source}")]
    InvalidTerm {
        term: String,
        #[source]
        source: regex::Error,
    },
}
