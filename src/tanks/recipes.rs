//! Patch recipes turning fixed resource tanks into switchable tanks.

use crate::node::Operator;
use crate::object::{
    FieldError, ModuleSwitchableTank, ModuleTankManager, NamedObject, Part, Resource, Tank,
};
use crate::patch::Patch;
use crate::scan::PartRecord;
use crate::search::SearchQuery;
use crate::tanks::library::TankLibrary;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_CLAUSE: &str = ":FOR[ConfigurableContainers]";
pub const LFO_CLAUSE: &str = ":FOR[ConfigurableContainers]:HAS[!MODULE[InterstellarFuelSwitch]]";
/// Parts needing at least this many m³ get a tank manager instead of a
/// single switchable tank.
pub const MANAGER_THRESHOLD: f64 = 8.0;
/// Share of an LFO tank's volume taken by liquid fuel.
pub const LFO_FUEL_SHARE: f64 = 0.45;
pub const LIQUID_FUEL: &str = "LiquidFuel";
pub const OXIDIZER: &str = "Oxidizer";
pub const LFO_TANK: &str = "LFO";
pub const DEFAULT_LFO_TANK_TYPE: &str = "LiquidChemicals";

/// Part name → raw `(key, value)` pairs appended to that part's patch.
/// Keys may carry an operator, e.g. `@title`.
pub type ExtraValues = BTreeMap<String, Vec<(String, String)>>;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("part '{part}': {source}")]
pub struct RecipeError {
    pub part: String,
    #[source]
    pub source: FieldError,
}

/// Parts holding only `resource` get a tank of `tank_type` sized to the
/// old capacity.
#[derive(Debug, Clone)]
pub struct SingleResource {
    pub tank_type: String,
    pub resource: String,
    pub clause: String,
    /// Parts matching this query keep the tank type fixed
    /// (`ChooseTankType = False`).
    pub fixed_type: SearchQuery,
    pub manager_threshold: f64,
    pub extra_values: ExtraValues,
    pub title: Option<String>,
    /// Leave parts unpatched when no volume can be computed. Off by
    /// default: such parts get a zero-volume tank.
    pub skip_zero_volume: bool,
}

impl SingleResource {
    pub fn new(tank_type: &str, resource: &str) -> Self {
        Self {
            tank_type: tank_type.to_string(),
            resource: resource.to_string(),
            clause: DEFAULT_CLAUSE.to_string(),
            fixed_type: SearchQuery::new(),
            manager_threshold: MANAGER_THRESHOLD,
            extra_values: ExtraValues::new(),
            title: None,
            skip_zero_volume: false,
        }
    }

    pub fn applies_to(&self, record: &PartRecord) -> bool {
        record.resources.len() == 1 && record.resources.contains(&self.resource)
    }

    pub fn build(&self, record: &PartRecord, library: &TankLibrary) -> Result<Option<Patch>, FieldError> {
        let Some(res) = record.resources.get(&self.resource) else {
            return Ok(None);
        };
        if record.resources.len() != 1 {
            return Ok(None);
        }

        let max_amount = res.max_amount()?;
        let amount = res.amount()?;
        let rate = library.volume(&self.tank_type, &self.resource, 1.0);
        let volume = max_amount * rate;
        if volume <= 0.0 {
            if self.skip_zero_volume {
                warn!(
                    part = record.name(),
                    resource = %self.resource,
                    "no tank volume could be computed; part left unpatched"
                );
                return Ok(None);
            }
            warn!(
                part = record.name(),
                resource = %self.resource,
                "no tank volume could be computed; patching with a zero-volume tank"
            );
        }

        let part_name = record.name();
        let mut patch = Part::patch(Operator::Replace, part_name, &self.clause);
        patch.add_child(Resource::patch(Operator::Delete, &self.resource, ""));
        let comment = conversion_comment(max_amount, &self.resource, rate);
        let initial = initial_fraction(amount, max_amount);

        if volume < self.manager_threshold {
            let mut tank = ModuleSwitchableTank::new();
            tank.set_volume(volume);
            tank.set_comment("Volume", comment);
            tank.set_initial_amount(initial);
            tank.set_do_cost_patch(true);
            tank.set_choose_tank_type(!self.fixed_type.matches(record.part.node()));
            tank.set_tank_type(&self.tank_type);
            tank.set_current_resource(&self.resource);
            patch.add_child(tank);
        } else {
            let mut manager = ModuleTankManager::new();
            manager.set_volume(volume);
            manager.set_comment("Volume", comment);
            manager.set_do_cost_patch(true);
            let mut tank = Tank::new();
            tank.set_tank_type(&self.tank_type);
            tank.set_current_resource(&self.resource);
            tank.set_initial_amount(initial);
            tank.set_volume(100.0);
            manager.add_child(tank);
            patch.add_child(manager);
        }

        add_extra_values(&mut patch, &self.extra_values, part_name)?;
        Ok(Some(patch))
    }
}

/// Parts holding exactly liquid fuel and oxidizer get a tank manager with
/// a single LFO tank.
#[derive(Debug, Clone)]
pub struct LiquidFuelOxidizer {
    pub tank_type: String,
    pub fuel_share: f64,
    pub clause: String,
    pub extra_values: ExtraValues,
    pub title: Option<String>,
    pub skip_zero_volume: bool,
}

impl Default for LiquidFuelOxidizer {
    fn default() -> Self {
        Self {
            tank_type: DEFAULT_LFO_TANK_TYPE.to_string(),
            fuel_share: LFO_FUEL_SHARE,
            clause: LFO_CLAUSE.to_string(),
            extra_values: ExtraValues::new(),
            title: None,
            skip_zero_volume: false,
        }
    }
}

impl LiquidFuelOxidizer {
    pub fn applies_to(&self, record: &PartRecord) -> bool {
        record.resources.len() == 2
            && record.resources.contains(LIQUID_FUEL)
            && record.resources.contains(OXIDIZER)
    }

    pub fn build(&self, record: &PartRecord, library: &TankLibrary) -> Result<Option<Patch>, FieldError> {
        if !self.applies_to(record) {
            return Ok(None);
        }
        let Some(fuel) = record.resources.get(LIQUID_FUEL) else {
            return Ok(None);
        };

        let max_amount = fuel.max_amount()?;
        let rate = library.volume(&self.tank_type, LIQUID_FUEL, 1.0) / self.fuel_share;
        let volume = max_amount * rate;
        if volume <= 0.0 {
            if self.skip_zero_volume {
                warn!(
                    part = record.name(),
                    "no LFO tank volume could be computed; part left unpatched"
                );
                return Ok(None);
            }
            warn!(
                part = record.name(),
                "no LFO tank volume could be computed; patching with a zero-volume tank"
            );
        }

        let part_name = record.name();
        let mut patch = Part::patch(Operator::Replace, part_name, &self.clause);
        patch.add_child(Resource::patch(Operator::Delete, LIQUID_FUEL, ""));
        patch.add_child(Resource::patch(Operator::Delete, OXIDIZER, ""));

        let mut manager = ModuleTankManager::new();
        manager.set_volume(volume);
        manager.set_comment("Volume", conversion_comment(max_amount, "LF", rate));
        manager.set_do_cost_patch(true);
        let mut tank = Tank::named(LFO_TANK);
        tank.set_volume(100.0);
        manager.add_child(tank);
        patch.add_child(manager);

        add_extra_values(&mut patch, &self.extra_values, part_name)?;
        Ok(Some(patch))
    }
}

#[derive(Debug, Clone)]
pub enum Recipe {
    Single(SingleResource),
    LiquidFuelOxidizer(LiquidFuelOxidizer),
}

impl Recipe {
    /// Heading of the output section this recipe produces.
    pub fn title(&self) -> String {
        match self {
            Recipe::Single(recipe) => recipe
                .title
                .clone()
                .unwrap_or_else(|| format!("{} Tanks", recipe.resource)),
            Recipe::LiquidFuelOxidizer(recipe) => recipe
                .title
                .clone()
                .unwrap_or_else(|| "Rocket Fuel Tanks".to_string()),
        }
    }

    pub fn build(&self, record: &PartRecord, library: &TankLibrary) -> Result<Option<Patch>, FieldError> {
        match self {
            Recipe::Single(recipe) => recipe.build(record, library),
            Recipe::LiquidFuelOxidizer(recipe) => recipe.build(record, library),
        }
    }

    /// Patches for every part not matched by `skip`, in part order.
    pub fn build_all(
        &self,
        parts: &[PartRecord],
        library: &TankLibrary,
        skip: &SearchQuery,
    ) -> Result<Vec<Patch>, RecipeError> {
        let mut patches = Vec::new();
        for record in parts {
            if skip.matches(record.part.node()) {
                debug!(part = record.name(), "skipped by query");
                continue;
            }
            let patch = self.build(record, library).map_err(|source| RecipeError {
                part: record.name().to_string(),
                source,
            })?;
            patches.extend(patch);
        }
        Ok(patches)
    }
}

fn conversion_comment(units: f64, resource: &str, rate: f64) -> String {
    format!("{units:.6} units of {resource}: conversion rate is {rate:.6} m3/u")
}

/// Share of the tank filled at launch. Empty tanks start empty.
fn initial_fraction(amount: f64, max_amount: f64) -> f64 {
    if max_amount > 0.0 {
        amount / max_amount
    } else {
        0.0
    }
}

fn add_extra_values(
    patch: &mut Patch,
    extra: &ExtraValues,
    part_name: &str,
) -> Result<(), FieldError> {
    for (key, value) in extra.get(part_name).into_iter().flatten() {
        patch
            .add_value(key, value.as_str())
            .map_err(|source| FieldError::Unwritable {
                key: key.clone(),
                source,
            })?;
    }
    Ok(())
}
