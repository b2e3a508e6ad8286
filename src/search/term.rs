use crate::cache;
use crate::node::{ConfigNode, Operator};
use crate::search::errors::QueryError;
use regex::Regex;
use std::fmt;

/// A path expression over a node tree.
///
/// Syntax: `SEG/SEG/.../key:pattern`. Segments are node names compared
/// exactly. Text after the first `:` is a regular expression anchored at
/// the start of the string; the path piece right before the `:` is the key
/// it applies to. Without `:` the term is a pure path. Empty text matches
/// every node.
///
/// ```text
/// PART                          node is (or has a child) PART
/// MODULE/name:ModuleEngines     some MODULE child is named ModuleEngines*
/// RESOURCE/name:LiquidFuel$     some RESOURCE is exactly LiquidFuel
/// name:.*[Ww]ing                the node's own name contains Wing/wing
/// ```
#[derive(Debug, Clone)]
pub struct SearchTerm {
    text: String,
    path: Vec<String>,
    predicate: Option<ValuePredicate>,
}

#[derive(Debug, Clone)]
struct ValuePredicate {
    key: String,
    pattern: Regex,
}

impl ValuePredicate {
    /// A value named `key`, or a child named `key` whose `name` value
    /// matches. Deletions never match.
    fn matches(&self, node: &ConfigNode) -> bool {
        node.values_named(&self.key)
            .filter(|v| !v.is_delete())
            .any(|v| self.pattern.is_match(v.value()))
            || node
                .children_named(&self.key)
                .filter(|c| c.prefix() != Some(Operator::Delete))
                .filter_map(|c| c.value("name"))
                .any(|name| self.pattern.is_match(name))
    }
}

impl SearchTerm {
    pub fn parse(text: &str) -> Result<Self, QueryError> {
        let text = text.trim();
        let (path_text, pattern) = match text.split_once(':') {
            Some((path, pattern)) => (path, Some(pattern)),
            None => (text, None),
        };

        let mut path = Vec::new();
        if !path_text.is_empty() {
            for segment in path_text.split('/') {
                let segment = segment.trim();
                if segment.is_empty() {
                    return Err(QueryError::EmptySegment {
                        term: text.to_string(),
                    });
                }
                path.push(segment.to_string());
            }
        }

        let predicate = match pattern {
            None => None,
            Some(pattern) => {
                let key = path.pop().ok_or_else(|| QueryError::MissingKey {
                    term: text.to_string(),
                })?;
                let pattern = cache::get_or_compile_anchored(pattern).map_err(|source| {
                    QueryError::InvalidPattern {
                        term: text.to_string(),
                        source,
                    }
                })?;
                Some(ValuePredicate { key, pattern })
            }
        };

        Ok(Self {
            text: text.to_string(),
            path,
            predicate,
        })
    }

    /// Term matching every node.
    pub fn wildcard() -> Self {
        Self {
            text: String::new(),
            path: Vec::new(),
            predicate: None,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.path.is_empty() && self.predicate.is_none()
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn key(&self) -> Option<&str> {
        self.predicate.as_ref().map(|p| p.key.as_str())
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The first segment may name `node` itself or one of its children;
    /// both readings are tried.
    pub fn matches(&self, node: &ConfigNode) -> bool {
        if self.is_wildcard() {
            return true;
        }
        let at_self = self
            .path
            .split_first()
            .is_some_and(|(first, rest)| first == node.name() && self.descend(node, rest));
        at_self || self.descend(node, &self.path)
    }

    /// Every same-named child is tried until one satisfies the rest of
    /// the path.
    fn descend(&self, node: &ConfigNode, path: &[String]) -> bool {
        match path.split_first() {
            None => self.predicate.as_ref().map_or(true, |p| p.matches(node)),
            Some((segment, rest)) => node
                .children_named(segment)
                .any(|child| self.descend(child, rest)),
        }
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
