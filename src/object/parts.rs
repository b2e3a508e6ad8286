use crate::node::ConfigNode;
use crate::object::errors::{FieldError, TypeError};
use crate::object::named::{ChildrenSnapshot, NamedObject};
use crate::object::schema::{ChildrenSpec, FieldSpec, Schema};

pub const PART_TAG: &str = "PART";
pub const RESOURCE_TAG: &str = "RESOURCE";
pub const MODULE_TAG: &str = "MODULE";

const PART_NAME: FieldSpec = FieldSpec::text("name", "name").required();
const PART_TITLE: FieldSpec = FieldSpec::text("title", "title");

/// A `PART` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    node: ConfigNode,
}

impl Part {
    pub fn part_name(&self) -> Result<String, FieldError> {
        self.read_required(&PART_NAME)
    }

    pub fn title(&self) -> Result<Option<String>, FieldError> {
        self.read(&PART_TITLE)
    }

    /// Snapshot of the part's `RESOURCE` blocks keyed by resource name.
    pub fn resources(&self) -> Result<ChildrenSnapshot<Resource>, TypeError> {
        self.children("resources")
    }

    /// Names of the part's `MODULE` blocks, in declaration order.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.node
            .children_named(MODULE_TAG)
            .filter_map(|m| m.value("name"))
    }
}

impl NamedObject for Part {
    const SCHEMA: &'static Schema = &Schema {
        tag: Some(PART_TAG),
        fields: &[PART_NAME, PART_TITLE],
        children: &[ChildrenSpec {
            name: "resources",
            tag: RESOURCE_TAG,
        }],
    };

    fn wrap(node: ConfigNode) -> Result<Self, TypeError> {
        Ok(Self { node })
    }

    fn node(&self) -> &ConfigNode {
        &self.node
    }

    fn node_mut(&mut self) -> &mut ConfigNode {
        &mut self.node
    }

    fn into_node(self) -> ConfigNode {
        self.node
    }
}

const RESOURCE_NAME: FieldSpec = FieldSpec::text("name", "name").required();
const AMOUNT: FieldSpec = FieldSpec::float("amount", "amount");
const MAX_AMOUNT: FieldSpec = FieldSpec::float("max_amount", "maxAmount");

/// A `RESOURCE` block of a part.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    node: ConfigNode,
}

impl Resource {
    pub fn new(name: &str, amount: f64, max_amount: f64) -> Self {
        let mut resource = Self {
            node: ConfigNode::new(RESOURCE_TAG),
        };
        resource.write(&RESOURCE_NAME, name.to_string());
        resource.write(&AMOUNT, amount);
        resource.write(&MAX_AMOUNT, max_amount);
        resource
    }

    pub fn resource_name(&self) -> Result<String, FieldError> {
        self.read_required(&RESOURCE_NAME)
    }

    /// Current amount; absent means empty.
    pub fn amount(&self) -> Result<f64, FieldError> {
        Ok(self.read(&AMOUNT)?.unwrap_or(0.0))
    }

    /// Capacity; absent means zero.
    pub fn max_amount(&self) -> Result<f64, FieldError> {
        Ok(self.read(&MAX_AMOUNT)?.unwrap_or(0.0))
    }
}

impl NamedObject for Resource {
    const SCHEMA: &'static Schema = &Schema {
        tag: Some(RESOURCE_TAG),
        fields: &[RESOURCE_NAME, AMOUNT, MAX_AMOUNT],
        children: &[],
    };

    fn wrap(node: ConfigNode) -> Result<Self, TypeError> {
        Ok(Self { node })
    }

    fn node(&self) -> &ConfigNode {
        &self.node
    }

    fn node_mut(&mut self) -> &mut ConfigNode {
        &mut self.node
    }

    fn into_node(self) -> ConfigNode {
        self.node
    }
}

const MODULE_NAME: FieldSpec = FieldSpec::text("name", "name");

/// Any `MODULE` block.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    node: ConfigNode,
}

impl Module {
    pub fn new(module_name: &str) -> Self {
        let mut module = Self {
            node: ConfigNode::new(MODULE_TAG),
        };
        module.write(&MODULE_NAME, module_name.to_string());
        module
    }
}

impl NamedObject for Module {
    const SCHEMA: &'static Schema = &Schema {
        tag: Some(MODULE_TAG),
        fields: &[MODULE_NAME],
        children: &[],
    };

    fn wrap(node: ConfigNode) -> Result<Self, TypeError> {
        Ok(Self { node })
    }

    fn node(&self) -> &ConfigNode {
        &self.node
    }

    fn node_mut(&mut self) -> &mut ConfigNode {
        &mut self.node
    }

    fn into_node(self) -> ConfigNode {
        self.node
    }
}

impl From<Part> for ConfigNode {
    fn from(view: Part) -> Self {
        view.node
    }
}

impl From<Resource> for ConfigNode {
    fn from(view: Resource) -> Self {
        view.node
    }
}

impl From<Module> for ConfigNode {
    fn from(view: Module) -> Self {
        view.node
    }
}
