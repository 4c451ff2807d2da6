use super::error::FilterParseError;

/// Separator that chains several tokens into one AND-ed search term
pub const CHAIN_DELIMITER: &str = "~~";

/// A single search term (e.g. "timeout" or "order-42~~FAILED")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    /// The term as given on the command line
    pub raw: String,
    /// Tokens that must all occur in a line; one entry for plain terms
    pub tokens: Vec<String>,
}

impl SearchTerm {
    /// Parse a single search term, splitting it on every chain delimiter
    pub fn parse(s: &str) -> Result<Self, FilterParseError> {
        if s.is_empty() {
            return Err(FilterParseError::EmptyTerm);
        }

        let tokens: Vec<String> = s.split(CHAIN_DELIMITER).map(str::to_string).collect();
        if tokens.iter().any(|t| t.is_empty()) {
            return Err(FilterParseError::EmptyChainToken(s.to_string()));
        }

        Ok(SearchTerm {
            raw: s.to_string(),
            tokens,
        })
    }

    /// Whether this term is an AND-chain of several tokens
    pub fn is_chain(&self) -> bool {
        self.tokens.len() > 1
    }
}

/// An ordered set of search terms combined with OR logic
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub terms: Vec<SearchTerm>,
}

impl SearchQuery {
    /// Parse every raw term, keeping their order
    pub fn parse<S: AsRef<str>>(raw_terms: &[S]) -> Result<Self, FilterParseError> {
        let terms = raw_terms
            .iter()
            .map(|t| SearchTerm::parse(t.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SearchQuery { terms })
    }

    /// Check if this query is empty (no filtering)
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
