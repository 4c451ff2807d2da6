//! Search term compilation and line matching
//!
//! Search terms are brute-force: they are matched against the whole raw
//! record line as emitted by the consumer (topic, key, headers, payload),
//! not against a single field.
//!
//! # Syntax
//!
//! ```text
//! term                 Line matches if the regex fragment occurs anywhere
//! a~~b~~c              Line matches if a, b and c all occur, in any order
//! term1 term2          Several terms combine with OR
//! ```
//!
//! With no terms at all every non-empty line matches.
//!
//! # Examples
//!
//! ```text
//! -s order-1234                       # Messages mentioning one order
//! -s customer-9~~FAILED               # Failures for one customer
//! -s timeout refused -i               # Either word, any case
//! ```

pub mod error;
pub mod matcher;
pub mod parser;

pub use error::FilterParseError;
pub use matcher::{CompiledPattern, LineMatcher, MatchOptions};
pub use parser::{CHAIN_DELIMITER, SearchQuery, SearchTerm};
