//! Tag → typed view dispatch.
//!
//! The set of views is closed and known at compile time, so the registry is
//! a static table of factory functions rather than a runtime map.

use crate::node::ConfigNode;
use crate::object::errors::TypeError;
use crate::object::named::NamedObject;
use crate::object::parts::{Module, Part, Resource, MODULE_TAG, PART_TAG, RESOURCE_TAG};
use crate::object::tanks::{
    ModuleSwitchableTank, ModuleTankManager, Tank, TankType, SWITCHABLE_TANK_MODULE, TANK_MANAGER_MODULE,
    TANK_TAG, TANK_TYPE_TAG,
};

/// A node loaded through the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedObject {
    Part(Part),
    Resource(Resource),
    Module(Module),
    TankManager(ModuleTankManager),
    SwitchableTank(ModuleSwitchableTank),
    TankType(TankType),
    Tank(Tank),
}

type Factory = fn(ConfigNode) -> Result<TypedObject, TypeError>;

static REGISTRY: &[(&str, Factory)] = &[
    (PART_TAG, load_part),
    (RESOURCE_TAG, load_resource),
    (MODULE_TAG, load_module),
    (TANK_TYPE_TAG, load_tank_type),
    (TANK_TAG, load_tank),
];

fn load_part(node: ConfigNode) -> Result<TypedObject, TypeError> {
    Part::load(node).map(TypedObject::Part)
}

fn load_resource(node: ConfigNode) -> Result<TypedObject, TypeError> {
    Resource::load(node).map(TypedObject::Resource)
}

/// Modules with a known class get their dedicated view.
fn load_module(node: ConfigNode) -> Result<TypedObject, TypeError> {
    match node.value("name") {
        Some(TANK_MANAGER_MODULE) => ModuleTankManager::load(node).map(TypedObject::TankManager),
        Some(SWITCHABLE_TANK_MODULE) => {
            ModuleSwitchableTank::load(node).map(TypedObject::SwitchableTank)
        }
        _ => Module::load(node).map(TypedObject::Module),
    }
}

fn load_tank_type(node: ConfigNode) -> Result<TypedObject, TypeError> {
    TankType::load(node).map(TypedObject::TankType)
}

fn load_tank(node: ConfigNode) -> Result<TypedObject, TypeError> {
    Tank::load(node).map(TypedObject::Tank)
}

impl TypedObject {
    /// Load `node` with the view registered for its tag.
    pub fn from_node(node: ConfigNode) -> Result<Self, TypeError> {
        let factory = REGISTRY
            .iter()
            .find(|(tag, _)| *tag == node.name())
            .map(|(_, factory)| *factory)
            .ok_or_else(|| TypeError::Unregistered {
                tag: node.name().to_string(),
            })?;
        factory(node)
    }

    pub fn registered_tags() -> impl Iterator<Item = &'static str> {
        REGISTRY.iter().map(|(tag, _)| *tag)
    }

    pub fn node(&self) -> &ConfigNode {
        match self {
            TypedObject::Part(view) => view.node(),
            TypedObject::Resource(view) => view.node(),
            TypedObject::Module(view) => view.node(),
            TypedObject::TankManager(view) => view.node(),
            TypedObject::SwitchableTank(view) => view.node(),
            TypedObject::TankType(view) => view.node(),
            TypedObject::Tank(view) => view.node(),
        }
    }

    pub fn into_node(self) -> ConfigNode {
        match self {
            TypedObject::Part(view) => view.into_node(),
            TypedObject::Resource(view) => view.into_node(),
            TypedObject::Module(view) => view.into_node(),
            TypedObject::TankManager(view) => view.into_node(),
            TypedObject::SwitchableTank(view) => view.into_node(),
            TypedObject::TankType(view) => view.into_node(),
            TypedObject::Tank(view) => view.into_node(),
        }
    }

    pub fn tag(&self) -> &str {
        self.node().name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(text: &str) -> ConfigNode {
        ConfigNode::parse(text).unwrap().into_children().remove(0)
    }

    #[test]
    fn dispatches_by_tag() {
        let obj = TypedObject::from_node(first("PART\n{\nname = probe\n}\n")).unwrap();
        assert!(matches!(obj, TypedObject::Part(_)));
        assert_eq!(obj.tag(), "PART");
    }

    #[test]
    fn modules_dispatch_by_class() {
        let obj =
            TypedObject::from_node(first("MODULE\n{\nname = ModuleTankManager\n}\n")).unwrap();
        assert!(matches!(obj, TypedObject::TankManager(_)));
        let obj = TypedObject::from_node(first("MODULE\n{\nname = ModuleEngines\n}\n")).unwrap();
        assert!(matches!(obj, TypedObject::Module(_)));
    }

    #[test]
    fn unknown_tag_is_unregistered() {
        let err = TypedObject::from_node(first("EFFECTS\n{\n}\n")).unwrap_err();
        assert_eq!(
            err,
            TypeError::Unregistered {
                tag: "EFFECTS".to_string()
            }
        );
    }

    #[test]
    fn field_errors_surface_through_factory() {
        let err = TypedObject::from_node(first("RESOURCE\n{\nname = Ore\nmaxAmount = x\n}\n"))
            .unwrap_err();
        assert!(matches!(err, TypeError::Field { .. }));
    }

    #[test]
    fn registered_tags_are_listed() {
        let tags: Vec<_> = TypedObject::registered_tags().collect();
        assert!(tags.contains(&"TANKTYPE"));
        assert!(tags.contains(&"MODULE"));
    }
}
