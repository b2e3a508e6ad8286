use crate::node::Value;
use crate::search::SearchTerm;
use crate::tanks::recipes::{DEFAULT_LFO_TANK_TYPE, LFO_FUEL_SHARE, MANAGER_THRESHOLD};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Default, Clone)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub recipes: Vec<RecipeDefinition>,
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.recipes.is_empty() {
            issues.push(ValidationIssue::EmptyRecipeList);
        }
        if self.paths.extension.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                recipe: None,
                field: "paths.extension",
            });
        }
        for term in &self.meta.skip {
            if let Err(err) = SearchTerm::parse(term) {
                issues.push(ValidationIssue::InvalidTerm {
                    recipe: None,
                    message: err.to_string(),
                });
            }
        }

        for recipe in &self.recipes {
            let label = Some(recipe.label());
            match recipe {
                RecipeDefinition::Single {
                    tank_type,
                    resource,
                    fixed_matching,
                    manager_threshold,
                    extra_values,
                    ..
                } => {
                    if tank_type.trim().is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            recipe: label.clone(),
                            field: "tank_type",
                        });
                    }
                    if resource.trim().is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            recipe: label.clone(),
                            field: "resource",
                        });
                    }
                    if !(*manager_threshold > 0.0) {
                        issues.push(ValidationIssue::InvalidValue {
                            recipe: label.clone(),
                            message: format!(
                                "manager_threshold must be positive, got {manager_threshold}"
                            ),
                        });
                    }
                    for term in fixed_matching {
                        if let Err(err) = SearchTerm::parse(term) {
                            issues.push(ValidationIssue::InvalidTerm {
                                recipe: label.clone(),
                                message: err.to_string(),
                            });
                        }
                    }
                    check_extra_values(extra_values, &label, &mut issues);
                }
                RecipeDefinition::Lfo {
                    tank_type,
                    fuel_share,
                    extra_values,
                    ..
                } => {
                    if tank_type.trim().is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            recipe: label.clone(),
                            field: "tank_type",
                        });
                    }
                    if !(*fuel_share > 0.0 && *fuel_share <= 1.0) {
                        issues.push(ValidationIssue::InvalidValue {
                            recipe: label.clone(),
                            message: format!("fuel_share must be in (0, 1], got {fuel_share}"),
                        });
                    }
                    check_extra_values(extra_values, &label, &mut issues);
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

fn check_extra_values(
    extra_values: &[ExtraValue],
    label: &Option<String>,
    issues: &mut Vec<ValidationIssue>,
) {
    for extra in extra_values {
        if extra.part.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                recipe: label.clone(),
                field: "extra_values.part",
            });
        }
        if extra.key.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                recipe: label.clone(),
                field: "extra_values.key",
            });
        } else if let Err(err) = Value::from_raw_key(&extra.key, extra.value.as_str()) {
            issues.push(ValidationIssue::InvalidValue {
                recipe: label.clone(),
                message: format!("extra value '{}' for part '{}': {err}", extra.key, extra.part),
            });
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Selection clause for single-resource recipes that set none.
    #[serde(default)]
    pub clause: Option<String>,
    /// Search terms; matching parts are never patched.
    #[serde(default)]
    pub skip: Vec<String>,
}

/// Locations inside the game data directory.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Paths {
    pub tank_types: PathBuf,
    pub parts: PathBuf,
    pub extension: String,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            tank_types: PathBuf::from("ConfigurableContainers/TankTypes.cfg"),
            parts: PathBuf::from("Squad/Parts"),
            extension: "cfg".to_string(),
        }
    }
}

impl Paths {
    pub fn tank_types_in(&self, game_data: &Path) -> PathBuf {
        game_data.join(&self.tank_types)
    }

    pub fn parts_in(&self, game_data: &Path) -> PathBuf {
        game_data.join(&self.parts)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RecipeDefinition {
    Single {
        tank_type: String,
        resource: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        clause: Option<String>,
        /// Every matching part keeps its tank type fixed.
        #[serde(default)]
        fixed_all: bool,
        /// Part names whose tank type is fixed.
        #[serde(default)]
        fixed_parts: Vec<String>,
        /// Search terms selecting parts whose tank type is fixed.
        #[serde(default)]
        fixed_matching: Vec<String>,
        #[serde(default = "default_manager_threshold")]
        manager_threshold: f64,
        #[serde(default)]
        extra_values: Vec<ExtraValue>,
        /// Leave parts unpatched when no volume can be computed.
        #[serde(default)]
        skip_zero_volume: bool,
    },
    Lfo {
        #[serde(default = "default_lfo_tank_type")]
        tank_type: String,
        #[serde(default = "default_fuel_share")]
        fuel_share: f64,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        clause: Option<String>,
        #[serde(default)]
        extra_values: Vec<ExtraValue>,
        #[serde(default)]
        skip_zero_volume: bool,
    },
}

impl RecipeDefinition {
    /// Short name used in diagnostics.
    pub fn label(&self) -> String {
        match self {
            RecipeDefinition::Single { resource, .. } => resource.clone(),
            RecipeDefinition::Lfo { .. } => "lfo".to_string(),
        }
    }
}

fn default_manager_threshold() -> f64 {
    MANAGER_THRESHOLD
}

fn default_lfo_tank_type() -> String {
    DEFAULT_LFO_TANK_TYPE.to_string()
}

fn default_fuel_share() -> f64 {
    LFO_FUEL_SHARE
}

/// A value appended to one part's patch, e.g. `@title`.
#[derive(Debug, Deserialize, Clone)]
pub struct ExtraValue {
    pub part: String,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    EmptyRecipeList,
    MissingField {
        recipe: Option<String>,
        field: &'static str,
    },
    InvalidValue {
        recipe: Option<String>,
        message: String,
    },
    InvalidTerm {
        recipe: Option<String>,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyRecipeList => write!(f, "generator config contains no recipes"),
            ValidationIssue::MissingField { recipe, field } => match recipe {
                Some(name) => write!(f, "recipe '{name}' missing required field '{field}'"),
                None => write!(f, "missing required field '{field}'"),
            },
            ValidationIssue::InvalidValue { recipe, message } => match recipe {
                Some(name) => write!(f, "recipe '{name}' has invalid value: {message}"),
                None => write!(f, "invalid value: {message}"),
            },
            ValidationIssue::InvalidTerm { recipe, message } => match recipe {
                Some(name) => write!(f, "recipe '{name}' has invalid search term: {message}"),
                None => write!(f, "invalid skip term: {message}"),
            },
        }
    }
}
