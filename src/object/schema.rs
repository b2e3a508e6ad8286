//! Static field descriptors for typed views.
//!
//! Every view declares a [`Schema`]: the node tag it expects, the values it
//! mirrors as typed fields and the child collections it can snapshot.
//! Generic get/set routines consult the descriptor instead of per-type
//! reflection.

use crate::node::ConfigNode;
use crate::object::errors::FieldError;

/// Decimal digits kept by rounded float fields.
pub const DEFAULT_DECIMALS: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Float, rounded to `decimals` digits on write when set.
    Float {
        decimals: Option<u32>,
    },
    Bool,
}

impl FieldKind {
    pub fn describe(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Float { .. } => "float",
            FieldKind::Bool => "bool",
        }
    }
}

/// A mirrored field: typed name, backing key, converter, and whether
/// absence is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub key: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn text(name: &'static str, key: &'static str) -> Self {
        Self {
            name,
            key,
            kind: FieldKind::Text,
            required: false,
        }
    }

    pub const fn float(name: &'static str, key: &'static str) -> Self {
        Self {
            name,
            key,
            kind: FieldKind::Float { decimals: None },
            required: false,
        }
    }

    /// Float field rounded to [`DEFAULT_DECIMALS`] on write.
    pub const fn rounded(name: &'static str, key: &'static str) -> Self {
        Self {
            name,
            key,
            kind: FieldKind::Float {
                decimals: Some(DEFAULT_DECIMALS),
            },
            required: false,
        }
    }

    pub const fn flag(name: &'static str, key: &'static str) -> Self {
        Self {
            name,
            key,
            kind: FieldKind::Bool,
            required: false,
        }
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    /// Check that the stored value, if any, converts to the declared kind.
    pub fn validate(&self, node: &ConfigNode) -> Result<(), FieldError> {
        match node.value(self.key) {
            None if self.required => Err(FieldError::Missing {
                key: self.key.to_string(),
            }),
            None => Ok(()),
            Some(raw) => match self.kind {
                FieldKind::Text => Ok(()),
                FieldKind::Float { .. } => f64::decode(raw, self).map(|_| ()),
                FieldKind::Bool => bool::decode(raw, self).map(|_| ()),
            },
        }
    }
}

/// A named collection of same-tag children, keyed by their `name` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildrenSpec {
    pub name: &'static str,
    pub tag: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct Schema {
    /// Expected node tag; `None` accepts any node (document roots).
    pub tag: Option<&'static str>,
    pub fields: &'static [FieldSpec],
    pub children: &'static [ChildrenSpec],
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn children_dict(&self, name: &str) -> Option<&ChildrenSpec> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn tag_name(&self) -> &'static str {
        self.tag.unwrap_or("<root>")
    }

    pub fn validate(&self, node: &ConfigNode) -> Result<(), FieldError> {
        self.fields.iter().try_for_each(|field| field.validate(node))
    }
}

/// Conversion between a typed field value and its text form.
pub trait FieldValue: Sized {
    const KIND: &'static str;

    fn accepts(kind: FieldKind) -> bool;

    fn decode(raw: &str, spec: &FieldSpec) -> Result<Self, FieldError>;

    fn encode(&self, spec: &FieldSpec) -> String;
}

impl FieldValue for String {
    const KIND: &'static str = "text";

    fn accepts(kind: FieldKind) -> bool {
        kind == FieldKind::Text
    }

    fn decode(raw: &str, _spec: &FieldSpec) -> Result<Self, FieldError> {
        Ok(raw.to_string())
    }

    fn encode(&self, _spec: &FieldSpec) -> String {
        self.clone()
    }
}

impl FieldValue for f64 {
    const KIND: &'static str = "float";

    fn accepts(kind: FieldKind) -> bool {
        matches!(kind, FieldKind::Float { .. })
    }

    fn decode(raw: &str, spec: &FieldSpec) -> Result<Self, FieldError> {
        raw.trim().parse::<f64>().map_err(|_| FieldError::Invalid {
            key: spec.key.to_string(),
            value: raw.to_string(),
            expected: Self::KIND,
        })
    }

    fn encode(&self, spec: &FieldSpec) -> String {
        match spec.kind {
            FieldKind::Float {
                decimals: Some(decimals),
            } => format_float(round_to(*self, decimals)),
            _ => format_float(*self),
        }
    }
}

impl FieldValue for bool {
    const KIND: &'static str = "bool";

    fn accepts(kind: FieldKind) -> bool {
        kind == FieldKind::Bool
    }

    fn decode(raw: &str, spec: &FieldSpec) -> Result<Self, FieldError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(FieldError::Invalid {
                key: spec.key.to_string(),
                value: raw.to_string(),
                expected: Self::KIND,
            }),
        }
    }

    fn encode(&self, _spec: &FieldSpec) -> String {
        let text = if *self { "True" } else { "False" };
        text.to_string()
    }
}

pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Shortest decimal text that reads back as the same float, never in
/// exponent notation.
pub fn format_float(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOLUME: FieldSpec = FieldSpec::rounded("volume", "Volume");
    const FLAG: FieldSpec = FieldSpec::flag("flag", "DoCostPatch");

    #[test]
    fn rounding_keeps_six_digits() {
        assert_eq!(0.1234567f64.encode(&VOLUME), "0.123457");
        assert_eq!(100.0f64.encode(&VOLUME), "100");
        assert_eq!(0.025f64.encode(&VOLUME), "0.025");
    }

    #[test]
    fn rounding_is_stable_across_cycles() {
        let mut text = 0.1234567f64.encode(&VOLUME);
        for _ in 0..5 {
            let value = f64::decode(&text, &VOLUME).unwrap();
            let next = value.encode(&VOLUME);
            assert_eq!(next, text);
            text = next;
        }
        assert_eq!(text, "0.123457");
    }

    #[test]
    fn unrounded_float_keeps_precision() {
        let spec = FieldSpec::float("ratio", "UsefulVolumeRatio");
        assert_eq!(0.1234567f64.encode(&spec), "0.1234567");
    }

    #[test]
    fn negative_zero_renders_as_zero() {
        assert_eq!((-0.0f64).encode(&VOLUME), "0");
    }

    #[test]
    fn bool_round_trip() {
        assert_eq!(true.encode(&FLAG), "True");
        assert!(bool::decode("true", &FLAG).unwrap());
        assert!(!bool::decode("FALSE", &FLAG).unwrap());
        assert!(matches!(
            bool::decode("yes", &FLAG),
            Err(FieldError::Invalid { .. })
        ));
    }

    #[test]
    fn validate_reports_missing_required() {
        let spec = FieldSpec::text("name", "name").required();
        let node = ConfigNode::new("PART");
        assert_eq!(
            spec.validate(&node),
            Err(FieldError::Missing {
                key: "name".to_string()
            })
        );
    }

    #[test]
    fn validate_reports_bad_float() {
        let mut node = ConfigNode::new("MODULE");
        node.add_value("Volume", "lots");
        assert!(matches!(
            VOLUME.validate(&node),
            Err(FieldError::Invalid { .. })
        ));
    }
}
