use crate::node::errors::ParseError;
use crate::node::parser;
use crate::node::value::{Operator, Value};
use std::fs;
use std::path::Path;

/// A named block of the config dialect.
///
/// Values and children keep declaration order and duplicates; consumers
/// decide what uniqueness means. A node owns its whole subtree.
///
/// The header of a node is `<prefix><name>[<selector>]<filter>`, e.g.
/// `@PART[fuelTank]:FOR[ConfigurableContainers]` has prefix `@`, name
/// `PART`, selector `fuelTank` and filter `:FOR[ConfigurableContainers]`.
///
/// The root of a parsed document has an empty name and renders only its
/// contents.
///
/// Lookups by key or name ignore operators: on a patch node `value("title")`
/// finds `@title` and `set_value("Volume", ..)` rewrites an `@Volume`
/// entry in place, keeping its operator. Use [`ConfigNode::value_with`]
/// and [`ConfigNode::child_with`] to tell `title` from `@title`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigNode {
    name: String,
    prefix: Option<Operator>,
    selector: Option<String>,
    filter: Option<String>,
    values: Vec<Value>,
    children: Vec<ConfigNode>,
}

impl ConfigNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Empty document root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a whole document. The result is a root node holding the
    /// top-level values and blocks.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        parser::parse_document(text)
    }

    /// Read and parse a file. Syntax errors carry the path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|err| err.with_path(path))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> Option<Operator> {
        self.prefix
    }

    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.name.is_empty() && self.prefix.is_none()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_prefix(&mut self, prefix: Option<Operator>) {
        self.prefix = prefix;
    }

    pub fn set_selector(&mut self, selector: Option<String>) {
        self.selector = selector;
    }

    pub fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter.filter(|f| !f.is_empty());
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: Operator) -> Self {
        self.prefix = Some(prefix);
        self
    }

    #[must_use]
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.set_filter(Some(filter.into()));
        self
    }

    /// Header text as it appears before the opening brace.
    pub fn header(&self) -> String {
        let mut header = String::new();
        if let Some(op) = self.prefix {
            header.push(op.as_char());
        }
        header.push_str(&self.name);
        if let Some(selector) = &self.selector {
            header.push('[');
            header.push_str(selector);
            header.push(']');
        }
        if let Some(filter) = &self.filter {
            header.push_str(filter);
        }
        header
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [Value] {
        &mut self.values
    }

    pub fn children(&self) -> &[ConfigNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [ConfigNode] {
        &mut self.children
    }

    pub fn into_children(self) -> Vec<ConfigNode> {
        self.children
    }

    /// First value stored under `key`.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.key() == key)
            .map(Value::value)
    }

    /// Every value stored under `key`, in declaration order.
    pub fn values_named<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.values.iter().filter(move |v| v.key() == key)
    }

    pub fn has_value(&self, key: &str) -> bool {
        self.values.iter().any(|v| v.key() == key)
    }

    /// First value under `key` carrying exactly `prefix`; `None` selects
    /// plain entries.
    pub fn value_with(&self, prefix: Option<Operator>, key: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|v| v.prefix() == prefix && v.key() == key)
    }

    /// First child with the given name.
    pub fn child(&self, name: &str) -> Option<&ConfigNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut ConfigNode> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// Every child with the given name, in declaration order.
    pub fn children_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a ConfigNode> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.children.iter().any(|c| c.name == name)
    }

    /// First child named `name` whose header carries exactly `prefix`.
    pub fn child_with(&self, prefix: Option<Operator>, name: &str) -> Option<&ConfigNode> {
        self.children
            .iter()
            .find(|c| c.prefix == prefix && c.name == name)
    }

    /// Append a plain `key = value` entry, keeping any existing ones.
    pub fn add_value(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Value {
        self.add_value_item(Value::new(key, value))
    }

    pub fn add_value_item(&mut self, value: Value) -> &mut Value {
        self.values.push(value);
        let last = self.values.len() - 1;
        &mut self.values[last]
    }

    /// Overwrite the first value under `key`, or append one.
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) -> &mut Value {
        match self.values.iter().position(|v| v.key() == key) {
            Some(idx) => {
                self.values[idx].set_value(value);
                &mut self.values[idx]
            }
            None => self.add_value(key, value),
        }
    }

    /// Remove every value under `key`; returns how many were removed.
    pub fn remove_values(&mut self, key: &str) -> usize {
        let before = self.values.len();
        self.values.retain(|v| v.key() != key);
        before - self.values.len()
    }

    /// Attach a trailing comment to the first value under `key`.
    ///
    /// Returns `false` when no such value exists.
    pub fn set_comment(&mut self, key: &str, text: impl Into<String>) -> bool {
        match self.values.iter_mut().find(|v| v.key() == key) {
            Some(value) => {
                value.set_comment(Some(text.into()));
                true
            }
            None => false,
        }
    }

    pub fn add_child(&mut self, child: ConfigNode) -> &mut ConfigNode {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Remove every child with the given name; returns how many were removed.
    pub fn remove_children(&mut self, name: &str) -> usize {
        let before = self.children.len();
        self.children.retain(|c| c.name != name);
        before - self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.children.is_empty()
    }
}
