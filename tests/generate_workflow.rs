//! End-to-end generation over a small game data tree.

use std::fs;
use std::path::Path;
use tank_patcher::config::{generate, load_from_str};
use tank_patcher::scan::{scan_parts, FileError};
use tank_patcher::{write_output, SyntaxError, WriteResult};
use tempfile::TempDir;

const TANK_TYPES: &str = r#"TANKTYPE
{
	name = Gases
	PossibleResources = XenonGas 5
	UsefulVolumeRatio = 0.8
}
TANKTYPE
{
	name = LiquidChemicals
	PossibleResources = LiquidFuel 1; Oxidizer 1; MonoPropellant 1
}
"#;

const RECIPES: &str = r#"
[meta]
name = "stock"

[[recipes]]
type = "lfo"

[[recipes]]
type = "single"
tank_type = "LiquidChemicals"
resource = "MonoPropellant"

[[recipes]]
type = "single"
tank_type = "Gases"
resource = "XenonGas"
fixed_all = true

[[recipes.extra_values]]
part = "xenonTank"
key = "@title"
value = "PB-X150 Pressurized Gas Container"
"#;

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn setup_game_data() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "ConfigurableContainers/TankTypes.cfg", TANK_TYPES);
    write(
        root,
        "Squad/Parts/FuelTank/fuelTank.cfg",
        "PART\n{\n\tname = fuelTank\n\ttitle = FL-T100\n\tRESOURCE\n\t{\n\t\tname = LiquidFuel\n\t\tamount = 45\n\t\tmaxAmount = 45\n\t}\n\tRESOURCE\n\t{\n\t\tname = Oxidizer\n\t\tamount = 55\n\t\tmaxAmount = 55\n\t}\n}\n",
    );
    write(
        root,
        "Squad/Parts/Xenon/xenonTank.cfg",
        "PART\n{\n\tname = xenonTank\n\tRESOURCE\n\t{\n\t\tname = XenonGas\n\t\tamount = 50\n\t\tmaxAmount = 100\n\t}\n}\n",
    );
    write(
        root,
        "Squad/Parts/Command/pod.cfg",
        "PART\n{\n\tname = pod\n\tMODULE\n\t{\n\t\tname = ModuleCommand\n\t}\n\tRESOURCE\n\t{\n\t\tname = MonoPropellant\n\t\tamount = 10\n\t\tmaxAmount = 10\n\t}\n}\n",
    );
    write(
        root,
        "Squad/Parts/Broken/broken.cfg",
        "PART\n{\n\tname = broken\n\tRESOURCE\n\t{\n\t\tname = Ore\n\t}\n",
    );
    dir
}

#[test]
fn scan_reports_malformed_file_and_keeps_others() {
    let game = setup_game_data();
    let parts_dir = game.path().join("Squad/Parts");
    let report = scan_parts(&parts_dir, "cfg").unwrap();

    assert_eq!(report.files, 4);
    let mut names: Vec<_> = report.parts.iter().map(|p| p.name()).collect();
    names.sort();
    assert_eq!(names, vec!["fuelTank", "pod", "xenonTank"]);

    assert_eq!(report.failures.len(), 1);
    let broken = parts_dir.join("Broken/broken.cfg");
    match report.failure_for(&broken) {
        Some(FileError::Parse(err)) => {
            assert!(matches!(
                err.syntax_kind(),
                Some(SyntaxError::UnclosedNode { .. })
            ));
            assert!(err.to_string().contains("broken.cfg"));
        }
        other => panic!("expected parse failure, got {other:?}"),
    }
}

#[test]
fn generates_every_recipe_section() {
    let game = setup_game_data();
    let config = load_from_str(RECIPES).unwrap();
    let generation = generate(game.path(), &config).unwrap();

    assert_eq!(generation.tank_types, 2);
    assert_eq!(generation.patch_count(), 3);
    let titles: Vec<_> = generation.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Rocket Fuel Tanks", "MonoPropellant Tanks", "XenonGas Tanks"]
    );

    let text = generation.render();
    assert!(text.contains(
        "@PART[xenonTank]:FOR[ConfigurableContainers]\n{\n\t@title = PB-X150 Pressurized Gas Container\n\t!RESOURCE[XenonGas]\n\t{\n\t}\n\tMODULE\n\t{\n\t\tname = ModuleSwitchableTank\n\t\tVolume = 0.025 // 100.000000 units of XenonGas: conversion rate is 0.000250 m3/u\n\t\tInitialAmount = 0.5\n\t\tDoCostPatch = True\n\t\tChooseTankType = False\n\t\tTankType = Gases\n\t\tCurrentResource = XenonGas\n\t}\n}\n"
    ));
    assert!(text.contains(
        "@PART[fuelTank]:FOR[ConfigurableContainers]:HAS[!MODULE[InterstellarFuelSwitch]]"
    ));
    assert!(text.contains("\t\tVolume = 0.01 // 10.000000 units of MonoPropellant"));
    assert!(!text.contains("broken"));
    assert!(text.ends_with("//:mode=c#:\n"));
}

#[test]
fn rewriting_same_output_is_unchanged() {
    let game = setup_game_data();
    let config = load_from_str(RECIPES).unwrap();
    let text = generate(game.path(), &config).unwrap().render();
    let output = game.path().join("ConfigurableContainers/Parts/Squad_Tanks.cfg");

    let first = write_output(&output, &text).unwrap();
    assert!(matches!(first, WriteResult::Written { .. }));
    let second = write_output(&output, &text).unwrap();
    assert_eq!(second, WriteResult::Unchanged { path: output.clone() });
    assert_eq!(fs::read_to_string(&output).unwrap(), text);
}

#[test]
fn generated_patches_parse_back() {
    let game = setup_game_data();
    let config = load_from_str(RECIPES).unwrap();
    let text = generate(game.path(), &config).unwrap().render();
    let tree = tank_patcher::ConfigNode::parse(&text).unwrap();
    assert_eq!(tree.children().len(), 3);
    assert!(tree
        .children()
        .iter()
        .all(|patch| patch.prefix() == Some(tank_patcher::Operator::Replace)));
    let xenon = &tree.children()[2];
    assert_eq!(
        xenon.value("@title"),
        None,
        "operator keys are stored without their prefix"
    );
    assert_eq!(
        xenon
            .value_with(Some(tank_patcher::Operator::Replace), "title")
            .map(tank_patcher::Value::value),
        Some("PB-X150 Pressurized Gas Container")
    );
    assert!(xenon.value_with(None, "title").is_none());
}

#[test]
fn missing_tank_types_file_is_an_error() {
    let game = setup_game_data();
    fs::remove_file(game.path().join("ConfigurableContainers/TankTypes.cfg")).unwrap();
    let config = load_from_str(RECIPES).unwrap();
    let err = generate(game.path(), &config).unwrap_err();
    assert!(err.to_string().contains("TankTypes.cfg"));
}
