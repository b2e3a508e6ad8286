//! Reading recipe configs from TOML text or files.

use crate::config::schema::{GeneratorConfig, Paths, ValidationError, ValidationIssue};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read recipe config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("recipe config{} is not valid TOML: {source}", origin(.path))]
    Syntax {
        path: Option<PathBuf>,
        #[source]
        source: toml_edit::de::Error,
    },

    #[error("recipe config{} failed validation:\n{source}", origin(.path))]
    Invalid {
        path: Option<PathBuf>,
        #[source]
        source: ValidationError,
    },
}

fn origin(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(" {}", path.display()),
        None => String::new(),
    }
}

impl ConfigError {
    /// File the config came from; `None` for inline text.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } => Some(path),
            ConfigError::Syntax { path, .. } | ConfigError::Invalid { path, .. } => {
                path.as_deref()
            }
        }
    }

    /// Every validation problem; empty for read and TOML failures.
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            ConfigError::Invalid { source, .. } => &source.issues,
            _ => &[],
        }
    }
}

/// Parse and validate a config given as text.
pub fn load_from_str(input: &str) -> Result<GeneratorConfig, ConfigError> {
    let config = deserialize(input, None)?;
    validated(config, None)
}

/// Parse and validate a config file. Errors name the file.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<GeneratorConfig, ConfigError> {
    let path = path.as_ref();
    let config = deserialize(&read(path)?, Some(path))?;
    validated(config, Some(path))
}

/// Only the `[paths]` table of a config file.
///
/// Recipes are not validated, so a file holding just `[paths]` is enough
/// to locate the tank-type table.
pub fn load_paths(path: impl AsRef<Path>) -> Result<Paths, ConfigError> {
    let path = path.as_ref();
    Ok(deserialize(&read(path)?, Some(path))?.paths)
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn deserialize(input: &str, path: Option<&Path>) -> Result<GeneratorConfig, ConfigError> {
    toml_edit::de::from_str(input).map_err(|source| ConfigError::Syntax {
        path: path.map(Path::to_path_buf),
        source,
    })
}

fn validated(config: GeneratorConfig, path: Option<&Path>) -> Result<GeneratorConfig, ConfigError> {
    match config.validate() {
        Ok(()) => Ok(config),
        Err(source) => Err(ConfigError::Invalid {
            path: path.map(Path::to_path_buf),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RecipeDefinition;

    #[test]
    fn omitted_fields_take_recipe_defaults() {
        let config = load_from_str(
            r#"
[meta]
name = "stock"

[[recipes]]
type = "single"
tank_type = "Gases"
resource = "XenonGas"
fixed_all = true

[[recipes]]
type = "lfo"
skip_zero_volume = true
"#,
        )
        .unwrap();
        assert_eq!(config.meta.name, "stock");
        assert_eq!(config.paths.extension, "cfg");
        assert_eq!(
            config.paths.tank_types,
            PathBuf::from("ConfigurableContainers/TankTypes.cfg")
        );
        let RecipeDefinition::Single {
            manager_threshold,
            fixed_all,
            skip_zero_volume,
            ..
        } = &config.recipes[0]
        else {
            panic!("expected a single recipe, got {:?}", config.recipes[0]);
        };
        assert_eq!(*manager_threshold, 8.0);
        assert!(*fixed_all);
        assert!(!*skip_zero_volume);

        let RecipeDefinition::Lfo {
            tank_type,
            fuel_share,
            skip_zero_volume,
            ..
        } = &config.recipes[1]
        else {
            panic!("expected an lfo recipe, got {:?}", config.recipes[1]);
        };
        assert_eq!(tank_type, "LiquidChemicals");
        assert_eq!(*fuel_share, 0.45);
        assert!(*skip_zero_volume);
    }

    #[test]
    fn every_validation_problem_is_reported() {
        let err = load_from_str(
            r#"
[meta]
skip = ["A//B"]

[[recipes]]
type = "single"
tank_type = ""
resource = "Ore"
manager_threshold = 0.0
fixed_matching = ["name:("]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { path: None, .. }));
        assert_eq!(err.issues().len(), 4);
        assert!(matches!(
            err.issues()[0],
            ValidationIssue::InvalidTerm { recipe: None, .. }
        ));
    }

    #[test]
    fn bare_operator_extra_key_fails_validation() {
        let err = load_from_str(
            r#"
[[recipes]]
type = "single"
tank_type = "Gases"
resource = "XenonGas"

[[recipes.extra_values]]
part = "xenonTank"
key = "@"
value = "v"
"#,
        )
        .unwrap_err();
        assert_eq!(err.issues().len(), 1);
        assert!(err.to_string().contains("extra value '@' for part 'xenonTank'"));
    }

    #[test]
    fn extra_values_must_survive_reparsing() {
        for (key, value) in [
            ("@title", "Tank // with a comment"),
            ("@title", "{"),
            ("@description", "ends }"),
            ("@a = b", "1"),
        ] {
            let text = format!(
                "[[recipes]]\ntype = \"lfo\"\n\n[[recipes.extra_values]]\npart = \"fuelTank\"\nkey = \"{key}\"\nvalue = \"{value}\"\n"
            );
            let err = load_from_str(&text).unwrap_err();
            assert!(
                matches!(err.issues(), [ValidationIssue::InvalidValue { .. }]),
                "{key} = {value}: {err}"
            );
        }
    }

    #[test]
    fn empty_config_has_no_recipes() {
        let err = load_from_str("").unwrap_err();
        assert!(err.to_string().contains("no recipes"));
        assert_eq!(err.path(), None);
    }

    #[test]
    fn unknown_recipe_type_is_a_syntax_error() {
        let err = load_from_str("[[recipes]]\ntype = \"mixed\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Syntax { path: None, .. }));
        assert!(err.issues().is_empty());
    }

    #[test]
    fn file_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipes.toml");
        fs::write(&path, "[[recipes]]\ntype = \"lfo\"\nfuel_share = 2.0\n").unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert_eq!(err.path(), Some(path.as_path()));
        assert!(err.to_string().contains("recipes.toml"));

        let missing = dir.path().join("missing.toml");
        let err = load_from_path(&missing).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn paths_load_without_recipes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paths.toml");
        fs::write(&path, "[paths]\ntank_types = \"CC/Types.cfg\"\n").unwrap();
        let paths = load_paths(&path).unwrap();
        assert_eq!(paths.tank_types, PathBuf::from("CC/Types.cfg"));
        assert_eq!(paths.extension, "cfg");
        assert!(load_from_path(&path).is_err());
    }
}
