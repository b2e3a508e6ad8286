use crate::node::ConfigNode;
use crate::search::errors::QueryError;
use crate::search::term::SearchTerm;
use std::fmt;

/// Terms combined with logical OR.
///
/// A query with no terms matches nothing; add the empty term to match
/// everything.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    terms: Vec<SearchTerm>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query holding the single term `text`.
    pub fn parse(text: &str) -> Result<Self, QueryError> {
        let mut query = Self::new();
        query.or(text)?;
        Ok(query)
    }

    pub fn from_terms<I, S>(terms: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut query = Self::new();
        for term in terms {
            query.or(term.as_ref())?;
        }
        Ok(query)
    }

    /// Query matching every node.
    pub fn everything() -> Self {
        Self {
            terms: vec![SearchTerm::wildcard()],
        }
    }

    /// Append a term to the alternatives.
    pub fn or(&mut self, text: &str) -> Result<&mut Self, QueryError> {
        self.terms.push(SearchTerm::parse(text)?);
        Ok(self)
    }

    pub fn or_term(&mut self, term: SearchTerm) -> &mut Self {
        self.terms.push(term);
        self
    }

    pub fn terms(&self) -> &[SearchTerm] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// True as soon as one term matches.
    pub fn matches(&self, node: &ConfigNode) -> bool {
        self.terms.iter().any(|term| term.matches(node))
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, term) in self.terms.iter().enumerate() {
            if idx > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(text: &str) -> ConfigNode {
        ConfigNode::parse(text).unwrap()
    }

    #[test]
    fn or_semantics() {
        let query = SearchQuery::from_terms(["A/B", "C/D"]).unwrap();
        assert!(query.matches(&tree("C\n{\nD\n{\n}\n}\n")));
        assert!(query.matches(&tree("A\n{\nB\n{\n}\n}\n")));
        assert!(!query.matches(&tree("A\n{\nD\n{\n}\n}\nC\n{\nB\n{\n}\n}\n")));
    }

    #[test]
    fn empty_query_matches_nothing() {
        let query = SearchQuery::new();
        assert!(query.is_empty());
        assert!(!query.matches(&ConfigNode::new("PART")));
    }

    #[test]
    fn everything_matches() {
        assert!(SearchQuery::everything().matches(&ConfigNode::new("PART")));
    }

    #[test]
    fn or_chains_and_reports_errors() {
        let mut query = SearchQuery::new();
        query.or("A").unwrap().or("B").unwrap();
        assert_eq!(query.len(), 2);
        assert!(query.or("x:(").is_err());
        assert_eq!(query.len(), 2);
        assert_eq!(query.to_string(), "A | B");
    }
}
