pub mod errors;
pub mod query;
pub mod term;

pub use errors::QueryError;
pub use query::SearchQuery;
pub use term::SearchTerm;
