use crate::node::errors::SyntaxError;
use std::fmt;

/// Patch operator that may prefix a node header or a value key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `@` - edit an existing entry
    Replace,
    /// `!` - delete an existing entry
    Delete,
    /// `%` - edit the entry, creating it when absent
    EditOrCreate,
    /// `+` - copy the entry, then edit the copy
    Copy,
}

impl Operator {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '@' => Some(Operator::Replace),
            '!' => Some(Operator::Delete),
            '%' => Some(Operator::EditOrCreate),
            '+' => Some(Operator::Copy),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Operator::Replace => '@',
            Operator::Delete => '!',
            Operator::EditOrCreate => '%',
            Operator::Copy => '+',
        }
    }

    /// Split a leading operator character off `text`.
    ///
    /// The remainder may be empty; callers decide whether that is legal.
    pub fn split_prefix(text: &str) -> (Option<Self>, &str) {
        let mut chars = text.chars();
        match chars.next().and_then(Operator::from_char) {
            Some(op) => (Some(op), chars.as_str()),
            None => (None, text),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A single `key = value` entry of a [`ConfigNode`](super::ConfigNode).
///
/// The key never carries the operator character; it lives in `prefix`.
/// Keys must be non-empty. The parser enforces this for text input;
/// [`Value::from_raw_key`] enforces it for keys taken from user input.
///
/// The text form has no quoting. A key or value holding `//`, `{`, `}`
/// or a line break would be read back as a comment, a block or a new
/// entry, so such text is rejected by [`Value::check_text`] before it
/// reaches a tree. A delete keeps its value and writes it out, so
/// `!mass = DEL` survives a round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    prefix: Option<Operator>,
    key: String,
    value: String,
    comment: Option<String>,
}

impl Value {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            prefix: None,
            key: key.into(),
            value: value.into(),
            comment: None,
        }
    }

    pub fn with_operator(op: Operator, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            prefix: Some(op),
            ..Self::new(key, value)
        }
    }

    /// A `!key` entry holding no value.
    pub fn delete(key: impl Into<String>) -> Self {
        Self::with_operator(Operator::Delete, key, "")
    }

    /// Build a value from a raw key that may start with an operator, e.g. `@title`.
    ///
    /// Fails when nothing is left of the key once the operator is removed,
    /// or when the key or value could not be read back from text.
    pub fn from_raw_key(raw_key: &str, value: impl Into<String>) -> Result<Self, SyntaxError> {
        let (prefix, key) = Operator::split_prefix(raw_key.trim());
        let key = key.trim();
        if key.is_empty() {
            return Err(SyntaxError::EmptyKey);
        }
        if key.contains('=') {
            return Err(SyntaxError::ReservedText {
                text: key.to_string(),
            });
        }
        Self::check_text(key)?;
        let value = value.into();
        Self::check_text(&value)?;
        Ok(Self {
            prefix,
            ..Self::new(key, value)
        })
    }

    /// Reject text that the parser would split into a comment, a block
    /// or another line.
    pub fn check_text(text: &str) -> Result<(), SyntaxError> {
        if text.contains("//") || text.contains(['{', '}', '\n', '\r']) {
            return Err(SyntaxError::ReservedText {
                text: text.to_string(),
            });
        }
        Ok(())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn prefix(&self) -> Option<Operator> {
        self.prefix
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn set_comment(&mut self, comment: Option<String>) {
        self.comment = comment.filter(|c| !c.trim().is_empty());
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.set_comment(Some(comment.into()));
        self
    }

    pub fn is_delete(&self) -> bool {
        self.prefix == Some(Operator::Delete)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(op) = self.prefix {
            write!(f, "{op}")?;
        }
        write!(f, "{} =", self.key)?;
        if !self.value.is_empty() {
            write!(f, " {}", self.value)?;
        }
        if let Some(comment) = &self.comment {
            write!(f, " // {comment}")?;
        }
        Ok(())
    }
}
