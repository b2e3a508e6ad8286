//! Tank-type table and the recipes that size tanks from it.

pub mod library;
pub mod recipes;

pub use library::{LibraryError, RatioError, TankLibrary};
pub use recipes::{LiquidFuelOxidizer, Recipe, RecipeError, SingleResource};
