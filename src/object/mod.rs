pub mod errors;
pub mod named;
pub mod parts;
pub mod registry;
pub mod schema;
pub mod tanks;

pub use errors::{FieldError, TypeError};
pub use named::{ChildrenSnapshot, NamedObject};
pub use parts::{Module, Part, Resource};
pub use registry::TypedObject;
pub use schema::{ChildrenSpec, FieldKind, FieldSpec, FieldValue, Schema};
pub use tanks::{ModuleSwitchableTank, ModuleTankManager, Tank, TankType, TanksLib};
