use crate::node::{ConfigNode, ParseError};
use crate::object::{ChildrenSnapshot, NamedObject, TankType, TanksLib, TypeError};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Liters per cubic meter.
const LITERS_PER_M3: f64 = 1e3;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("failed to parse tank types: {0}")]
    Parse(#[from] ParseError),

    #[error("invalid tank type definition: {0}")]
    Type(#[from] TypeError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RatioError {
    #[error("unknown tank type '{tank_type}'")]
    UnknownTankType { tank_type: String },

    #[error("tank type '{tank_type}' has no conversion ratio for '{resource}'{}", hint(.suggestion))]
    MissingRatio {
        tank_type: String,
        resource: String,
        suggestion: Option<String>,
    },
}

fn hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean '{name}'?)"),
        None => String::new(),
    }
}

/// Read-only table of tank types, loaded once and shared by reference with
/// every recipe.
#[derive(Debug, Clone, Default)]
pub struct TankLibrary {
    types: ChildrenSnapshot<TankType>,
}

impl TankLibrary {
    /// Build from a document whose top level holds `TANKTYPE` blocks.
    pub fn from_node(root: ConfigNode) -> Result<Self, TypeError> {
        let lib = TanksLib::load(root)?;
        Ok(Self { types: lib.types()? })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LibraryError> {
        let root = ConfigNode::load(path)?;
        Ok(Self::from_node(root)?)
    }

    pub fn get(&self, name: &str) -> Option<&TankType> {
        self.types.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.names()
    }

    pub fn types(&self) -> &ChildrenSnapshot<TankType> {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Cubic meters needed to hold `units` of `resource` in a `tank_type` tank:
    /// `units / units_per_liter / useful_volume_ratio / 1000`.
    pub fn try_volume(&self, tank_type: &str, resource: &str, units: f64) -> Result<f64, RatioError> {
        let tank = self.types.get(tank_type).ok_or_else(|| RatioError::UnknownTankType {
            tank_type: tank_type.to_string(),
        })?;
        let units_per_liter = tank
            .units_per_liter()
            .get(resource)
            .copied()
            .filter(|upl| *upl > 0.0)
            .ok_or_else(|| RatioError::MissingRatio {
                tank_type: tank_type.to_string(),
                resource: resource.to_string(),
                suggestion: closest_name(resource, tank.possible_resources()),
            })?;
        let useful = tank.useful_volume_ratio().unwrap_or(1.0);
        Ok(units / units_per_liter / useful / LITERS_PER_M3)
    }

    /// Like [`try_volume`](Self::try_volume), but an unknown ratio is
    /// logged as a warning and yields zero.
    pub fn volume(&self, tank_type: &str, resource: &str, units: f64) -> f64 {
        match self.try_volume(tank_type, resource, units) {
            Ok(volume) => volume,
            Err(err) => {
                warn!(tank_type, resource, "{err}; using zero volume");
                0.0
            }
        }
    }
}

/// Most similar candidate, if any is reasonably close.
fn closest_name<'a>(name: &str, candidates: impl Iterator<Item = &'a str>) -> Option<String> {
    candidates
        .map(|candidate| (strsim::jaro_winkler(name, candidate), candidate))
        .filter(|(score, _)| *score >= 0.8)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate.to_string())
}
