use super::error::FilterParseError;
use super::parser::{SearchQuery, SearchTerm};
use regex::{Regex, RegexBuilder};

/// Something that decides whether a raw record line is a hit
pub trait LineMatcher {
    fn matches(&self, text: &str) -> bool;
}

/// Options that change how terms are turned into matchers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    pub case_insensitive: bool,
    /// Treat terms as literal text instead of regex fragments
    pub fixed_strings: bool,
}

/// The compiled form of a search query
///
/// `expression` is the single-regex rendering of the query, e.g.
/// `(?:alpha|^(?=.*(?:foo))(?=.*(?:bar)).*$)`. The `regex` crate has no
/// look-ahead, so matching runs as an OR over conjunctions that are each
/// equivalent to one alternative of that expression. Chain tokens are
/// grouped so a `|` inside a token stays inside its look-ahead.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    expression: String,
    alternatives: Vec<Vec<Regex>>,
    case_insensitive: bool,
}

impl CompiledPattern {
    /// Compile raw command-line terms
    pub fn compile<S: AsRef<str>>(
        raw_terms: &[S],
        options: MatchOptions,
    ) -> Result<Self, FilterParseError> {
        let query = SearchQuery::parse(raw_terms)?;
        Self::from_query(&query, options)
    }

    /// Compile an already parsed query
    pub fn from_query(
        query: &SearchQuery,
        options: MatchOptions,
    ) -> Result<Self, FilterParseError> {
        if query.is_empty() {
            return Ok(Self::match_all(options.case_insensitive));
        }

        let mut rendered = Vec::with_capacity(query.terms.len());
        let mut alternatives = Vec::with_capacity(query.terms.len());

        for term in &query.terms {
            let fragments: Vec<String> = term
                .tokens
                .iter()
                .map(|token| fragment(token, options.fixed_strings))
                .collect();

            let conjunction = fragments
                .iter()
                .map(|f| build_regex(term, f, options.case_insensitive))
                .collect::<Result<Vec<_>, _>>()?;

            rendered.push(render_alternative(term, &fragments));
            alternatives.push(conjunction);
        }

        Ok(CompiledPattern {
            expression: format!("(?:{})", rendered.join("|")),
            alternatives,
            case_insensitive: options.case_insensitive,
        })
    }

    /// A pattern that accepts every non-empty line
    pub fn match_all(case_insensitive: bool) -> Self {
        CompiledPattern {
            expression: String::new(),
            alternatives: Vec::new(),
            case_insensitive,
        }
    }

    /// The single-expression rendering; empty when nothing is filtered
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn is_match_all(&self) -> bool {
        self.alternatives.is_empty()
    }
}

impl LineMatcher for CompiledPattern {
    fn matches(&self, text: &str) -> bool {
        if self.alternatives.is_empty() {
            return !text.is_empty();
        }

        self.alternatives
            .iter()
            .any(|conjunction| conjunction.iter().all(|re| re.is_match(text)))
    }
}

fn fragment(token: &str, fixed_strings: bool) -> String {
    if fixed_strings {
        regex::escape(token)
    } else {
        token.to_string()
    }
}

fn render_alternative(term: &SearchTerm, fragments: &[String]) -> String {
    if term.is_chain() {
        let lookaheads: String = fragments.iter().map(|f| format!("(?=.*(?:{f}))")).collect();
        format!("^{lookaheads}.*$")
    } else {
        fragments.concat()
    }
}

fn build_regex(
    term: &SearchTerm,
    fragment: &str,
    case_insensitive: bool,
) -> Result<Regex, FilterParseError> {
    RegexBuilder::new(fragment)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|source| FilterParseError::InvalidTerm {
            term: term.raw.clone(),
            source,
        })
}
