pub mod generator;
pub mod loader;
pub mod schema;

pub use generator::{
    generate, render, GenerateError, Generation, Generator, Section, GENERATED_BY, MODE_LINE,
};
pub use loader::{load_from_path, load_from_str, load_paths, ConfigError};
pub use schema::{
    ExtraValue, GeneratorConfig, Metadata, Paths, RecipeDefinition, ValidationError,
    ValidationIssue,
};
