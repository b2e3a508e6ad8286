use crate::node::ConfigNode;
use crate::object::errors::{FieldError, TypeError};
use crate::object::named::{ChildrenSnapshot, NamedObject};
use crate::object::parts::MODULE_TAG;
use crate::object::schema::{ChildrenSpec, FieldSpec, Schema};
use std::collections::BTreeMap;

pub const TANK_TYPE_TAG: &str = "TANKTYPE";
pub const TANK_TAG: &str = "TANK";
pub const TANK_MANAGER_MODULE: &str = "ModuleTankManager";
pub const SWITCHABLE_TANK_MODULE: &str = "ModuleSwitchableTank";

const TYPE_NAME: FieldSpec = FieldSpec::text("name", "name").required();
const POSSIBLE_RESOURCES: FieldSpec = FieldSpec::text("possible_resources", "PossibleResources");
const USEFUL_VOLUME_RATIO: FieldSpec = FieldSpec::float("useful_volume_ratio", "UsefulVolumeRatio");
const TANK_COST_PER_SURFACE: FieldSpec =
    FieldSpec::float("tank_cost_per_surface", "TankCostPerSurface");

/// A `TANKTYPE` definition: which resources a tank can hold and how many
/// units of each fit in a liter.
#[derive(Debug, Clone, PartialEq)]
pub struct TankType {
    node: ConfigNode,
    units_per_liter: BTreeMap<String, f64>,
}

impl TankType {
    pub fn type_name(&self) -> Result<String, FieldError> {
        self.read_required(&TYPE_NAME)
    }

    /// Share of a part's volume usable by the tank. Defaults to 1.
    pub fn useful_volume_ratio(&self) -> Result<f64, FieldError> {
        Ok(self.read(&USEFUL_VOLUME_RATIO)?.unwrap_or(1.0))
    }

    pub fn tank_cost_per_surface(&self) -> Result<Option<f64>, FieldError> {
        self.read(&TANK_COST_PER_SURFACE)
    }

    /// Resource name → units per liter, parsed once when the view was loaded.
    pub fn units_per_liter(&self) -> &BTreeMap<String, f64> {
        &self.units_per_liter
    }

    pub fn possible_resources(&self) -> impl Iterator<Item = &str> {
        self.units_per_liter.keys().map(String::as_str)
    }
}

/// Parse `"Name1 units; Name2 units; ..."`. Entries without a ratio are ignored.
pub fn parse_units_per_liter(text: &str) -> Result<BTreeMap<String, f64>, FieldError> {
    let mut table = BTreeMap::new();
    for entry in text.split(';') {
        let mut parts = entry.split_whitespace();
        let (Some(name), Some(ratio)) = (parts.next(), parts.next()) else {
            continue;
        };
        let ratio = ratio.parse::<f64>().map_err(|_| FieldError::Invalid {
            key: POSSIBLE_RESOURCES.key.to_string(),
            value: entry.trim().to_string(),
            expected: "float",
        })?;
        table.insert(name.to_string(), ratio);
    }
    Ok(table)
}

impl NamedObject for TankType {
    const SCHEMA: &'static Schema = &Schema {
        tag: Some(TANK_TYPE_TAG),
        fields: &[
            TYPE_NAME,
            POSSIBLE_RESOURCES,
            USEFUL_VOLUME_RATIO,
            TANK_COST_PER_SURFACE,
        ],
        children: &[],
    };

    fn wrap(node: ConfigNode) -> Result<Self, TypeError> {
        let units_per_liter = match node.value(POSSIBLE_RESOURCES.key) {
            Some(text) => parse_units_per_liter(text)
                .map_err(|source| TypeError::field(Some(TANK_TYPE_TAG), source))?,
            None => BTreeMap::new(),
        };
        Ok(Self {
            node,
            units_per_liter,
        })
    }

    fn node(&self) -> &ConfigNode {
        &self.node
    }

    fn node_mut(&mut self) -> &mut ConfigNode {
        &mut self.node
    }

    fn into_node(self) -> ConfigNode {
        self.node
    }
}

/// A document holding `TANKTYPE` definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct TanksLib {
    node: ConfigNode,
}

impl TanksLib {
    /// Snapshot of the declared tank types keyed by name.
    pub fn types(&self) -> Result<ChildrenSnapshot<TankType>, TypeError> {
        self.children("types")
    }
}

impl NamedObject for TanksLib {
    const SCHEMA: &'static Schema = &Schema {
        tag: None,
        fields: &[],
        children: &[ChildrenSpec {
            name: "types",
            tag: TANK_TYPE_TAG,
        }],
    };

    fn wrap(node: ConfigNode) -> Result<Self, TypeError> {
        Ok(Self { node })
    }

    fn node(&self) -> &ConfigNode {
        &self.node
    }

    fn node_mut(&mut self) -> &mut ConfigNode {
        &mut self.node
    }

    fn into_node(self) -> ConfigNode {
        self.node
    }
}

/// Reject `MODULE` nodes whose `name` is not the expected module class.
fn check_module_name(node: &ConfigNode, expected: &str) -> Result<(), TypeError> {
    match node.value("name") {
        Some(name) if name == expected => Ok(()),
        found => Err(TypeError::Mismatch {
            expected: format!("{MODULE_TAG} {expected}"),
            found: format!("{MODULE_TAG} {}", found.unwrap_or("<unnamed>")),
        }),
    }
}

const MODULE_NAME: FieldSpec = FieldSpec::text("name", "name").required();
const VOLUME: FieldSpec = FieldSpec::rounded("volume", "Volume");
const INITIAL_AMOUNT: FieldSpec = FieldSpec::rounded("initial_amount", "InitialAmount");
const TANK_TYPE: FieldSpec = FieldSpec::text("tank_type", "TankType");
const CURRENT_RESOURCE: FieldSpec = FieldSpec::text("current_resource", "CurrentResource");
const CHOOSE_TANK_TYPE: FieldSpec = FieldSpec::flag("choose_tank_type", "ChooseTankType");
const DO_COST_PATCH: FieldSpec = FieldSpec::flag("do_cost_patch", "DoCostPatch");

/// `MODULE { name = ModuleTankManager }`: a part volume split into `TANK`s.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleTankManager {
    node: ConfigNode,
}

impl ModuleTankManager {
    pub fn new() -> Self {
        let mut node = ConfigNode::new(MODULE_TAG);
        node.add_value(MODULE_NAME.key, TANK_MANAGER_MODULE);
        Self { node }
    }

    /// Total volume in m³.
    pub fn volume(&self) -> Result<Option<f64>, FieldError> {
        self.read(&VOLUME)
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.write(&VOLUME, volume);
    }

    pub fn do_cost_patch(&self) -> Result<Option<bool>, FieldError> {
        self.read(&DO_COST_PATCH)
    }

    pub fn set_do_cost_patch(&mut self, value: bool) {
        self.write(&DO_COST_PATCH, value);
    }

    pub fn tanks(&self) -> impl Iterator<Item = &ConfigNode> {
        self.node.children_named(TANK_TAG)
    }
}

impl Default for ModuleTankManager {
    fn default() -> Self {
        Self::new()
    }
}

impl NamedObject for ModuleTankManager {
    const SCHEMA: &'static Schema = &Schema {
        tag: Some(MODULE_TAG),
        fields: &[MODULE_NAME, VOLUME, DO_COST_PATCH],
        children: &[],
    };

    fn wrap(node: ConfigNode) -> Result<Self, TypeError> {
        check_module_name(&node, TANK_MANAGER_MODULE)?;
        Ok(Self { node })
    }

    fn node(&self) -> &ConfigNode {
        &self.node
    }

    fn node_mut(&mut self) -> &mut ConfigNode {
        &mut self.node
    }

    fn into_node(self) -> ConfigNode {
        self.node
    }
}

/// `MODULE { name = ModuleSwitchableTank }`: a single tank occupying the part.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSwitchableTank {
    node: ConfigNode,
}

impl ModuleSwitchableTank {
    pub fn new() -> Self {
        let mut node = ConfigNode::new(MODULE_TAG);
        node.add_value(MODULE_NAME.key, SWITCHABLE_TANK_MODULE);
        Self { node }
    }

    pub fn volume(&self) -> Result<Option<f64>, FieldError> {
        self.read(&VOLUME)
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.write(&VOLUME, volume);
    }

    pub fn initial_amount(&self) -> Result<Option<f64>, FieldError> {
        self.read(&INITIAL_AMOUNT)
    }

    pub fn set_initial_amount(&mut self, ratio: f64) {
        self.write(&INITIAL_AMOUNT, ratio);
    }

    pub fn tank_type(&self) -> Result<Option<String>, FieldError> {
        self.read(&TANK_TYPE)
    }

    pub fn set_tank_type(&mut self, tank_type: &str) {
        self.write(&TANK_TYPE, tank_type.to_string());
    }

    pub fn current_resource(&self) -> Result<Option<String>, FieldError> {
        self.read(&CURRENT_RESOURCE)
    }

    pub fn set_current_resource(&mut self, resource: &str) {
        self.write(&CURRENT_RESOURCE, resource.to_string());
    }

    pub fn choose_tank_type(&self) -> Result<Option<bool>, FieldError> {
        self.read(&CHOOSE_TANK_TYPE)
    }

    pub fn set_choose_tank_type(&mut self, value: bool) {
        self.write(&CHOOSE_TANK_TYPE, value);
    }

    pub fn do_cost_patch(&self) -> Result<Option<bool>, FieldError> {
        self.read(&DO_COST_PATCH)
    }

    pub fn set_do_cost_patch(&mut self, value: bool) {
        self.write(&DO_COST_PATCH, value);
    }
}

impl Default for ModuleSwitchableTank {
    fn default() -> Self {
        Self::new()
    }
}

impl NamedObject for ModuleSwitchableTank {
    const SCHEMA: &'static Schema = &Schema {
        tag: Some(MODULE_TAG),
        fields: &[
            MODULE_NAME,
            VOLUME,
            INITIAL_AMOUNT,
            TANK_TYPE,
            CURRENT_RESOURCE,
            CHOOSE_TANK_TYPE,
            DO_COST_PATCH,
        ],
        children: &[],
    };

    fn wrap(node: ConfigNode) -> Result<Self, TypeError> {
        check_module_name(&node, SWITCHABLE_TANK_MODULE)?;
        Ok(Self { node })
    }

    fn node(&self) -> &ConfigNode {
        &self.node
    }

    fn node_mut(&mut self) -> &mut ConfigNode {
        &mut self.node
    }

    fn into_node(self) -> ConfigNode {
        self.node
    }
}

const TANK_NAME: FieldSpec = FieldSpec::text("name", "name");
/// Percent of the manager's volume.
const TANK_VOLUME: FieldSpec = FieldSpec::rounded("volume", "Volume");

/// A `TANK` inside a [`ModuleTankManager`].
#[derive(Debug, Clone, PartialEq)]
pub struct Tank {
    node: ConfigNode,
}

impl Tank {
    pub fn new() -> Self {
        Self {
            node: ConfigNode::new(TANK_TAG),
        }
    }

    /// A tank preset by name, e.g. `LFO`.
    pub fn named(name: &str) -> Self {
        let mut tank = Self::new();
        tank.write(&TANK_NAME, name.to_string());
        tank
    }

    pub fn volume(&self) -> Result<Option<f64>, FieldError> {
        self.read(&TANK_VOLUME)
    }

    pub fn set_volume(&mut self, percent: f64) {
        self.write(&TANK_VOLUME, percent);
    }

    pub fn initial_amount(&self) -> Result<Option<f64>, FieldError> {
        self.read(&INITIAL_AMOUNT)
    }

    pub fn set_initial_amount(&mut self, ratio: f64) {
        self.write(&INITIAL_AMOUNT, ratio);
    }

    pub fn set_tank_type(&mut self, tank_type: &str) {
        self.write(&TANK_TYPE, tank_type.to_string());
    }

    pub fn set_current_resource(&mut self, resource: &str) {
        self.write(&CURRENT_RESOURCE, resource.to_string());
    }
}

impl Default for Tank {
    fn default() -> Self {
        Self::new()
    }
}

impl NamedObject for Tank {
    const SCHEMA: &'static Schema = &Schema {
        tag: Some(TANK_TAG),
        fields: &[
            TANK_NAME,
            TANK_VOLUME,
            INITIAL_AMOUNT,
            TANK_TYPE,
            CURRENT_RESOURCE,
        ],
        children: &[],
    };

    fn wrap(node: ConfigNode) -> Result<Self, TypeError> {
        Ok(Self { node })
    }

    fn node(&self) -> &ConfigNode {
        &self.node
    }

    fn node_mut(&mut self) -> &mut ConfigNode {
        &mut self.node
    }

    fn into_node(self) -> ConfigNode {
        self.node
    }
}

impl From<TankType> for ConfigNode {
    fn from(view: TankType) -> Self {
        view.node
    }
}

impl From<ModuleTankManager> for ConfigNode {
    fn from(view: ModuleTankManager) -> Self {
        view.node
    }
}

impl From<ModuleSwitchableTank> for ConfigNode {
    fn from(view: ModuleSwitchableTank) -> Self {
        view.node
    }
}

impl From<Tank> for ConfigNode {
    fn from(view: Tank) -> Self {
        view.node
    }
}
