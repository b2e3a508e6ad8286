//! Runs configured recipes over scanned parts and renders the patch file.

use crate::config::loader::ConfigError;
use crate::config::schema::{ExtraValue, GeneratorConfig, RecipeDefinition};
use crate::output::WriteError;
use crate::patch::Patch;
use crate::scan::{scan_parts, PartRecord, ScanError, ScanReport};
use crate::search::{QueryError, SearchQuery};
use crate::tanks::recipes::{
    ExtraValues, LiquidFuelOxidizer, Recipe, RecipeError, SingleResource, DEFAULT_CLAUSE,
    LFO_CLAUSE,
};
use crate::tanks::{LibraryError, TankLibrary};
use std::path::Path;
use thiserror::Error;
use tracing::info;

pub const GENERATED_BY: &str = "//Automatically generated by tank-patcher";
/// Editor hint closing every generated file.
pub const MODE_LINE: &str = "//:mode=c#:";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid search term: {0}")]
    Query(#[from] QueryError),

    #[error("failed to load tank types: {0}")]
    Library(#[from] LibraryError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("recipe failed on {0}")]
    Recipe(#[from] RecipeError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Patches produced by one recipe, rendered under a comment heading.
#[derive(Debug, Clone)]
pub struct Section {
    pub title: String,
    pub patches: Vec<Patch>,
}

#[derive(Debug, Clone)]
pub struct Generator {
    recipes: Vec<Recipe>,
    skip: SearchQuery,
}

impl Generator {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self {
            recipes,
            skip: SearchQuery::new(),
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Result<Self, QueryError> {
        let recipes = config
            .recipes
            .iter()
            .map(|definition| compile_recipe(definition, config.meta.clause.as_deref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            recipes,
            skip: SearchQuery::from_terms(&config.meta.skip)?,
        })
    }

    pub fn with_skip(mut self, skip: SearchQuery) -> Self {
        self.skip = skip;
        self
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// One section per recipe, in configuration order.
    pub fn run(&self, parts: &[PartRecord], library: &TankLibrary) -> Result<Vec<Section>, RecipeError> {
        let mut sections = Vec::with_capacity(self.recipes.len());
        for recipe in &self.recipes {
            let patches = recipe.build_all(parts, library, &self.skip)?;
            info!(recipe = %recipe.title(), patches = patches.len(), "recipe finished");
            sections.push(Section {
                title: recipe.title(),
                patches,
            });
        }
        Ok(sections)
    }
}

fn compile_recipe(definition: &RecipeDefinition, meta_clause: Option<&str>) -> Result<Recipe, QueryError> {
    match definition {
        RecipeDefinition::Single {
            tank_type,
            resource,
            title,
            clause,
            fixed_all,
            fixed_parts,
            fixed_matching,
            manager_threshold,
            extra_values,
            skip_zero_volume,
        } => {
            let fixed_type = if *fixed_all {
                SearchQuery::everything()
            } else {
                let mut query = SearchQuery::new();
                for part in fixed_parts {
                    query.or(&format!("name:{}$", regex::escape(part)))?;
                }
                for term in fixed_matching {
                    query.or(term)?;
                }
                query
            };
            Ok(Recipe::Single(SingleResource {
                tank_type: tank_type.clone(),
                resource: resource.clone(),
                clause: clause
                    .as_deref()
                    .or(meta_clause)
                    .unwrap_or(DEFAULT_CLAUSE)
                    .to_string(),
                fixed_type,
                manager_threshold: *manager_threshold,
                extra_values: group_extra_values(extra_values),
                title: title.clone(),
                skip_zero_volume: *skip_zero_volume,
            }))
        }
        RecipeDefinition::Lfo {
            tank_type,
            fuel_share,
            title,
            clause,
            extra_values,
            skip_zero_volume,
        } => Ok(Recipe::LiquidFuelOxidizer(LiquidFuelOxidizer {
            tank_type: tank_type.clone(),
            fuel_share: *fuel_share,
            clause: clause.clone().unwrap_or_else(|| LFO_CLAUSE.to_string()),
            extra_values: group_extra_values(extra_values),
            title: title.clone(),
            skip_zero_volume: *skip_zero_volume,
        })),
    }
}

fn group_extra_values(values: &[ExtraValue]) -> ExtraValues {
    let mut grouped = ExtraValues::new();
    for extra in values {
        grouped
            .entry(extra.part.clone())
            .or_default()
            .push((extra.key.clone(), extra.value.clone()));
    }
    grouped
}

/// Render sections as one patch file. Sections without patches are left out.
pub fn render(sections: &[Section]) -> String {
    let mut out = String::new();
    for section in sections.iter().filter(|s| !s.patches.is_empty()) {
        out.push_str(&format!("\n//{}\n{GENERATED_BY}\n\n", section.title));
        for (idx, patch) in section.patches.iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            out.push_str(&patch.to_string());
        }
    }
    out.push_str(MODE_LINE);
    out.push('\n');
    out
}

/// Everything one generation pass produced.
#[derive(Debug)]
pub struct Generation {
    pub sections: Vec<Section>,
    pub scan: ScanReport,
    pub tank_types: usize,
}

impl Generation {
    pub fn render(&self) -> String {
        render(&self.sections)
    }

    pub fn patch_count(&self) -> usize {
        self.sections.iter().map(|s| s.patches.len()).sum()
    }
}

/// Load the tank types and parts under `game_data` and run every recipe.
pub fn generate(game_data: &Path, config: &GeneratorConfig) -> Result<Generation, GenerateError> {
    let generator = Generator::from_config(config)?;
    let library = TankLibrary::load(config.paths.tank_types_in(game_data))?;
    let scan = scan_parts(&config.paths.parts_in(game_data), &config.paths.extension)?;
    info!(
        files = scan.files,
        parts = scan.parts.len(),
        failures = scan.failures.len(),
        tank_types = library.len(),
        "scan complete"
    );

    let sections = generator.run(&scan.parts, &library)?;
    Ok(Generation {
        sections,
        scan,
        tank_types: library.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::load_from_str;
    use crate::node::ConfigNode;

    fn library() -> TankLibrary {
        TankLibrary::from_node(
            ConfigNode::parse(
                "TANKTYPE\n{\n\tname = Soil\n\tPossibleResources = Ore 0.2\n}\n",
            )
            .unwrap(),
        )
        .unwrap()
    }

    fn ore_part(name: &str) -> PartRecord {
        let text = format!(
            "PART\n{{\n\tname = {name}\n\tRESOURCE\n\t{{\n\t\tname = Ore\n\t\tamount = 0\n\t\tmaxAmount = 300\n\t}}\n}}\n"
        );
        let node = ConfigNode::parse(&text).unwrap().into_children().remove(0);
        PartRecord::from_node("ore.cfg", node).unwrap()
    }

    #[test]
    fn fixed_parts_are_matched_by_exact_name() {
        let config = load_from_str(
            "[[recipes]]\ntype = \"single\"\ntank_type = \"Soil\"\nresource = \"Ore\"\nfixed_parts = [\"SmallTank\"]\n",
        )
        .unwrap();
        let generator = Generator::from_config(&config).unwrap();
        let sections = generator
            .run(&[ore_part("SmallTank"), ore_part("SmallTank2")], &library())
            .unwrap();
        let choose: Vec<_> = sections[0]
            .patches
            .iter()
            .map(|p| p.node().child("MODULE").unwrap().value("ChooseTankType").unwrap().to_string())
            .collect();
        assert_eq!(choose, vec!["False", "True"]);
    }

    #[test]
    fn meta_clause_applies_to_single_recipes() {
        let config = load_from_str(
            "[meta]\nclause = \":NEEDS[ConfigurableContainers]\"\n[[recipes]]\ntype = \"single\"\ntank_type = \"Soil\"\nresource = \"Ore\"\n",
        )
        .unwrap();
        let generator = Generator::from_config(&config).unwrap();
        let sections = generator.run(&[ore_part("OreTank")], &library()).unwrap();
        assert_eq!(
            sections[0].patches[0].clause(),
            Some(":NEEDS[ConfigurableContainers]")
        );
    }

    #[test]
    fn skip_terms_exclude_parts() {
        let config = load_from_str(
            "[meta]\nskip = [\"name:Small\"]\n[[recipes]]\ntype = \"single\"\ntank_type = \"Soil\"\nresource = \"Ore\"\n",
        )
        .unwrap();
        let generator = Generator::from_config(&config).unwrap();
        let sections = generator
            .run(&[ore_part("SmallTank"), ore_part("LargeTank")], &library())
            .unwrap();
        assert_eq!(sections[0].patches.len(), 1);
        assert_eq!(sections[0].patches[0].target(), Some("LargeTank"));
    }

    #[test]
    fn skip_zero_volume_reaches_the_recipe() {
        let base = "[[recipes]]\ntype = \"single\"\ntank_type = \"Cryo\"\nresource = \"Ore\"\n";
        let parts = [ore_part("OreTank")];

        let config = load_from_str(base).unwrap();
        let sections = Generator::from_config(&config)
            .unwrap()
            .run(&parts, &library())
            .unwrap();
        let module = sections[0].patches[0].node().child("MODULE").unwrap();
        assert_eq!(module.value("Volume"), Some("0"));

        let config = load_from_str(&format!("{base}skip_zero_volume = true\n")).unwrap();
        let sections = Generator::from_config(&config)
            .unwrap()
            .run(&parts, &library())
            .unwrap();
        assert!(sections[0].patches.is_empty());
    }

    #[test]
    fn render_layout() {
        let generator = Generator::new(vec![
            Recipe::Single(SingleResource::new("Soil", "Ore")),
            Recipe::Single(SingleResource::new("Soil", "XenonGas")),
        ]);
        let sections = generator.run(&[ore_part("OreTank")], &library()).unwrap();
        let text = render(&sections);
        assert!(text.starts_with("\n//Ore Tanks\n//Automatically generated by tank-patcher\n\n@PART[OreTank]"));
        assert!(!text.contains("XenonGas Tanks"));
        assert!(text.ends_with("}\n//:mode=c#:\n"));
    }

    #[test]
    fn empty_run_renders_mode_line_only() {
        assert_eq!(render(&[]), "//:mode=c#:\n");
    }
}
