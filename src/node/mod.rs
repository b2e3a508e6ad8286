pub mod errors;
pub(crate) mod parser;
pub mod tree;
pub mod value;
mod writer;

pub use errors::{ParseError, SyntaxError};
pub use tree::ConfigNode;
pub use value::{Operator, Value};
