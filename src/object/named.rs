use crate::node::{ConfigNode, Operator, Value};
use crate::object::errors::{FieldError, TypeError};
use crate::object::schema::{ChildrenSpec, FieldSpec, FieldValue, Schema};
use crate::patch::Patch;
use std::collections::btree_map::{self, BTreeMap};

/// A typed view owning a [`ConfigNode`].
///
/// Typed reads and writes go straight through to the node's values, so the
/// node is always the single source of truth. Only derived collections
/// ([`ChildrenSnapshot`], parsed ratio tables) are copies.
pub trait NamedObject: Sized {
    const SCHEMA: &'static Schema;

    /// Wrap a node whose tag and fields were already checked by [`load`].
    ///
    /// Views with derived state build it here.
    ///
    /// [`load`]: NamedObject::load
    fn wrap(node: ConfigNode) -> Result<Self, TypeError>;

    fn node(&self) -> &ConfigNode;

    fn node_mut(&mut self) -> &mut ConfigNode;

    fn into_node(self) -> ConfigNode;

    /// Check the node tag and every declared field, then wrap it.
    fn load(node: ConfigNode) -> Result<Self, TypeError> {
        if let Some(tag) = Self::SCHEMA.tag {
            if node.name() != tag {
                return Err(TypeError::Mismatch {
                    expected: tag.to_string(),
                    found: node.name().to_string(),
                });
            }
        }
        Self::SCHEMA
            .validate(&node)
            .map_err(|source| TypeError::field(Self::SCHEMA.tag, source))?;
        Self::wrap(node)
    }

    fn name(&self) -> Option<&str> {
        self.node().value("name")
    }

    fn read<T: FieldValue>(&self, spec: &FieldSpec) -> Result<Option<T>, FieldError> {
        if !T::accepts(spec.kind) {
            return Err(FieldError::KindMismatch {
                field: spec.name.to_string(),
                requested: T::KIND,
            });
        }
        match self.node().value(spec.key) {
            Some(raw) => T::decode(raw, spec).map(Some),
            None if spec.required => Err(FieldError::Missing {
                key: spec.key.to_string(),
            }),
            None => Ok(None),
        }
    }

    fn read_required<T: FieldValue>(&self, spec: &FieldSpec) -> Result<T, FieldError> {
        self.read(spec)?.ok_or_else(|| FieldError::Missing {
            key: spec.key.to_string(),
        })
    }

    /// Encode `value` with the field's converter (rounding floats when
    /// declared) and store it under the field's key.
    fn write<T: FieldValue>(&mut self, spec: &FieldSpec, value: T) {
        debug_assert!(T::accepts(spec.kind), "{} is not a {} field", spec.name, T::KIND);
        let text = value.encode(spec);
        self.node_mut().set_value(spec.key, text);
    }

    fn field_spec(field: &str) -> Result<&'static FieldSpec, FieldError> {
        Self::SCHEMA.field(field).ok_or_else(|| FieldError::Unknown {
            tag: Self::SCHEMA.tag_name().to_string(),
            field: field.to_string(),
        })
    }

    /// Read a field by its declared name.
    fn get<T: FieldValue>(&self, field: &str) -> Result<Option<T>, FieldError> {
        let spec = Self::field_spec(field)?;
        self.read(spec)
    }

    /// Write a field by its declared name.
    fn set<T: FieldValue>(&mut self, field: &str, value: T) -> Result<(), FieldError> {
        let spec = Self::field_spec(field)?;
        if !T::accepts(spec.kind) {
            return Err(FieldError::KindMismatch {
                field: field.to_string(),
                requested: T::KIND,
            });
        }
        self.write(spec, value);
        Ok(())
    }

    fn set_comment(&mut self, key: &str, text: impl Into<String>) -> bool {
        self.node_mut().set_comment(key, text)
    }

    fn add_value(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Value {
        self.node_mut().add_value(key, value)
    }

    fn add_child(&mut self, child: impl Into<ConfigNode>) -> &mut ConfigNode {
        self.node_mut().add_child(child.into())
    }

    /// Snapshot the children collection declared as `dict`.
    fn children<C: NamedObject>(&self, dict: &str) -> Result<ChildrenSnapshot<C>, TypeError> {
        let spec = Self::SCHEMA.children_dict(dict).ok_or_else(|| {
            TypeError::field(
                Self::SCHEMA.tag,
                FieldError::Unknown {
                    tag: Self::SCHEMA.tag_name().to_string(),
                    field: dict.to_string(),
                },
            )
        })?;
        ChildrenSnapshot::collect(self.node(), spec)
    }

    /// Start a patch addressing nodes of this view's tag.
    fn patch(op: Operator, target: &str, clause: &str) -> Patch {
        Patch::new(op, Self::SCHEMA.tag_name(), target, clause)
    }
}

/// Immutable name → view mapping taken from a node's children.
///
/// The snapshot copies the children when it is taken; later changes to the
/// source node are not reflected. Take a new snapshot to observe them.
/// When several children share a name the last one wins. Children carrying
/// a patch operator are not declarations and are skipped.
#[derive(Debug, Clone)]
pub struct ChildrenSnapshot<T> {
    entries: BTreeMap<String, T>,
}

impl<T: NamedObject> ChildrenSnapshot<T> {
    pub fn collect(parent: &ConfigNode, spec: &ChildrenSpec) -> Result<Self, TypeError> {
        let mut entries = BTreeMap::new();
        for child in parent
            .children_named(spec.tag)
            .filter(|c| c.prefix().is_none())
        {
            let view = T::load(child.clone())?;
            let name = view
                .name()
                .ok_or_else(|| {
                    TypeError::field(
                        Some(spec.tag),
                        FieldError::Missing {
                            key: "name".to_string(),
                        },
                    )
                })?
                .to_string();
            entries.insert(name, view);
        }
        Ok(Self { entries })
    }
}

impl<T> ChildrenSnapshot<T> {
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, T> {
        self.entries.iter()
    }
}

impl<T> Default for ChildrenSnapshot<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<'a, T> IntoIterator for &'a ChildrenSnapshot<T> {
    type Item = (&'a String, &'a T);
    type IntoIter = btree_map::Iter<'a, String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
