//! Tank Patcher: switchable-tank patch generation for part config databases
//!
//! Part configs are brace-delimited trees of `key = value` pairs. This crate
//! parses them into [`ConfigNode`] trees, layers typed views over the nodes
//! ([`NamedObject`]), selects nodes with path-and-pattern queries
//! ([`SearchQuery`]) and renders [`Patch`] nodes that retarget resource
//! tanks to switchable tank modules.
//!
//! # Architecture
//!
//! Everything is a [`ConfigNode`]. Typed views own a node and read or write
//! its values in place; a patch is a node whose header carries an operator,
//! a target name and a selection clause. The generator scans part files,
//! sizes each tank from the tank-type table and renders one patch file.
//!
//! # Example
//!
//! ```
//! use tank_patcher::{ConfigNode, SearchQuery};
//!
//! let tree = ConfigNode::parse(
//!     "PART\n{\n\tname = wingTank\n\tMODULE\n\t{\n\t\tname = ModuleEngines\n\t}\n}\n",
//! )
//! .unwrap();
//! let part = &tree.children()[0];
//!
//! let query = SearchQuery::parse("MODULE/name:ModuleEngines").unwrap();
//! assert!(query.matches(part));
//! assert_eq!(ConfigNode::parse(&tree.serialize()).unwrap(), tree);
//! ```

pub mod cache;
pub mod config;
pub mod node;
pub mod object;
pub mod output;
pub mod patch;
pub mod scan;
pub mod search;
pub mod tanks;

// Re-exports
pub use config::{
    generate, load_from_path, load_from_str, render, ConfigError, GenerateError, Generation,
    Generator, GeneratorConfig, Section,
};
pub use node::{ConfigNode, Operator, ParseError, SyntaxError, Value};
pub use object::{FieldError, NamedObject, Part, Resource, TypeError, TypedObject};
pub use output::{write_output, WriteError, WriteResult};
pub use patch::Patch;
pub use scan::{scan_parts, PartRecord, ScanError, ScanReport};
pub use search::{QueryError, SearchQuery, SearchTerm};
pub use tanks::{LibraryError, Recipe, TankLibrary};
