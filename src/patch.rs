//! Patch nodes rendered with the module-manager operator syntax.
//!
//! A patch header is `<op><TAG>[<target>]<clause>`, e.g.
//! `@PART[fuelTank]:FOR[ConfigurableContainers]`. The clause is opaque text
//! supplied by the caller. Children render with their own operator prefix.

use crate::node::{ConfigNode, Operator, SyntaxError, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    node: ConfigNode,
}

impl Patch {
    /// Patch addressing `tag` nodes named `target`. An empty target or
    /// clause is omitted from the header.
    pub fn new(op: Operator, tag: &str, target: &str, clause: &str) -> Self {
        let mut node = ConfigNode::new(tag).with_prefix(op);
        if !target.is_empty() {
            node.set_selector(Some(target.to_string()));
        }
        node.set_filter(Some(clause.to_string()));
        Self { node }
    }

    /// Plain insertion of a new `tag` block.
    pub fn insert(tag: &str) -> Self {
        Self {
            node: ConfigNode::new(tag),
        }
    }

    pub fn operator(&self) -> Option<Operator> {
        self.node.prefix()
    }

    pub fn target(&self) -> Option<&str> {
        self.node.selector()
    }

    pub fn clause(&self) -> Option<&str> {
        self.node.filter()
    }

    pub fn add_child(&mut self, child: impl Into<ConfigNode>) -> &mut ConfigNode {
        self.node.add_child(child.into())
    }

    /// Add a value whose key may start with an operator, e.g. `@title`.
    pub fn add_value(
        &mut self,
        key: &str,
        value: impl Into<String>,
    ) -> Result<&mut Value, SyntaxError> {
        Ok(self.node.add_value_item(Value::from_raw_key(key, value)?))
    }

    pub fn add_value_item(&mut self, value: Value) -> &mut Value {
        self.node.add_value_item(value)
    }

    /// Add `<op>key = value`.
    pub fn add_operation(&mut self, op: Operator, key: &str, value: impl Into<String>) -> &mut Value {
        self.node
            .add_value_item(Value::with_operator(op, key, value))
    }

    /// Delete the value `key` from the target.
    pub fn delete_value(&mut self, key: &str) -> &mut Value {
        self.node.add_value_item(Value::delete(key))
    }

    /// Delete the child block `tag[target]` from the target.
    pub fn delete_child(&mut self, tag: &str, target: &str) -> &mut ConfigNode {
        self.add_child(Patch::new(Operator::Delete, tag, target, ""))
    }

    pub fn set_comment(&mut self, key: &str, text: impl Into<String>) -> bool {
        self.node.set_comment(key, text)
    }

    pub fn node(&self) -> &ConfigNode {
        &self.node
    }

    pub fn into_node(self) -> ConfigNode {
        self.node
    }
}

impl From<Patch> for ConfigNode {
    fn from(patch: Patch) -> Self {
        patch.node
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_carries_operator_target_and_clause() {
        let patch = Patch::new(
            Operator::Replace,
            "PART",
            "fuelTank",
            ":FOR[ConfigurableContainers]:HAS[!MODULE[InterstellarFuelSwitch]]",
        );
        assert_eq!(
            patch.to_string(),
            "@PART[fuelTank]:FOR[ConfigurableContainers]:HAS[!MODULE[InterstellarFuelSwitch]]\n{\n}\n"
        );
        assert_eq!(patch.target(), Some("fuelTank"));
    }

    #[test]
    fn children_render_with_their_own_operators() {
        let mut patch = Patch::new(Operator::Replace, "PART", "xenonTank", "");
        patch.delete_child("RESOURCE", "XenonGas");
        patch.add_value("@title", "PB-X150 Pressurized Gas Container").unwrap();
        patch.add_operation(Operator::EditOrCreate, "cost", "1200");
        patch.delete_value("mass");
        let module = patch.add_child(ConfigNode::new("MODULE"));
        module.add_value("name", "ModuleSwitchableTank");

        assert_eq!(
            patch.to_string(),
            "@PART[xenonTank]\n{\n\t@title = PB-X150 Pressurized Gas Container\n\t%cost = 1200\n\t!mass =\n\t!RESOURCE[XenonGas]\n\t{\n\t}\n\tMODULE\n\t{\n\t\tname = ModuleSwitchableTank\n\t}\n}\n"
        );
    }

    #[test]
    fn copy_patch_with_comment() {
        let mut patch = Patch::new(Operator::Copy, "PART", "fuelTank", "");
        patch.add_value("@name", "fuelTankCopy").unwrap();
        assert!(patch.set_comment("name", "renamed copy"));
        assert_eq!(
            patch.to_string(),
            "+PART[fuelTank]\n{\n\t@name = fuelTankCopy // renamed copy\n}\n"
        );
    }

    #[test]
    fn rendered_patch_reparses_to_same_tree() {
        let mut patch = Patch::new(Operator::Replace, "PART", "a", ":FOR[X]");
        patch.delete_child("RESOURCE", "Ore");
        patch.add_value("@title", "New").unwrap();
        let text = patch.to_string();
        let root = ConfigNode::parse(&text).unwrap();
        assert_eq!(root.children()[0], *patch.node());
    }

    #[test]
    fn bare_operator_is_not_a_key() {
        let mut patch = Patch::new(Operator::Replace, "PART", "a", "");
        assert_eq!(patch.add_value("@", "v").unwrap_err(), SyntaxError::EmptyKey);
        assert!(patch.add_value("@title", "{ nested }").is_err());
        assert!(patch.node().values().is_empty());
    }

    #[test]
    fn insert_has_no_operator() {
        let mut patch = Patch::insert("TANK");
        patch.add_value("name", "LFO").unwrap();
        assert_eq!(patch.operator(), None);
        assert_eq!(patch.to_string(), "TANK\n{\n\tname = LFO\n}\n");
    }
}
