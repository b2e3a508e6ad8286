use crate::node::SyntaxError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("missing required field '{key}'")]
    Missing { key: String },

    #[error("field '{key}' has invalid {expected} value '{value}'")]
    Invalid {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("'{tag}' declares no field named '{field}'")]
    Unknown { tag: String, field: String },

    #[error("field '{field}' does not hold {requested} values")]
    KindMismatch {
        field: String,
        requested: &'static str,
    },

    #[error("value '{key}' cannot be written: {source}")]
    Unwritable {
        key: String,
        #[source]
        source: SyntaxError,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("expected a '{expected}' node, found '{found}'")]
    Mismatch { expected: String, found: String },

    #[error("no typed view is registered for '{tag}' nodes")]
    Unregistered { tag: String },

    #[error("invalid '{tag}' node: {source}")]
    Field {
        tag: String,
        #[source]
        source: FieldError,
    },
}

impl TypeError {
    pub(crate) fn field(tag: Option<&str>, source: FieldError) -> Self {
        TypeError::Field {
            tag: tag.unwrap_or("<root>").to_string(),
            source,
        }
    }
}
