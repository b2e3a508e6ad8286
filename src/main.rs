use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};
use tank_patcher::config::{generate, load_from_path, load_paths, GeneratorConfig, Paths};
use tank_patcher::node::ConfigNode;
use tank_patcher::output::{read_existing, write_output, WriteResult};
use tank_patcher::scan::find_files;
use tank_patcher::search::SearchQuery;
use tank_patcher::tanks::TankLibrary;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tank-patcher")]
#[command(about = "Generates switchable-tank patches for part configs", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug details (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the configured recipes and emit the patch file
    Generate {
        /// Game data directory holding tank types and parts
        #[arg(short, long)]
        game_data: PathBuf,

        /// Recipe configuration (TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Patch file to write (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Dry run - report what would be written without touching files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff against the current output file
        #[arg(short, long)]
        diff: bool,
    },

    /// Parse config files and verify they serialize back to the same tree
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List top-level nodes matching any of the search terms
    Query {
        /// Directory to search
        dir: PathBuf,

        /// Search term, e.g. `MODULE/name:ModuleEngines`; repeat for OR
        #[arg(short, long = "term", required = true)]
        terms: Vec<String>,

        /// File extension to search
        #[arg(short, long, default_value = "cfg")]
        extension: String,
    },

    /// List tank types and their conversion ratios
    Types {
        #[arg(short, long)]
        game_data: PathBuf,

        /// Recipe configuration whose [paths] locate the tank types
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            game_data,
            config,
            output,
            dry_run,
            diff,
        } => cmd_generate(&game_data, &config, output.as_deref(), dry_run, diff),

        Commands::Check { files } => cmd_check(&files),

        Commands::Query {
            dir,
            terms,
            extension,
        } => cmd_query(&dir, &terms, &extension),

        Commands::Types { game_data, config } => cmd_types(&game_data, config.as_deref()),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Helper: Show unified diff between original and generated content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (current)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (generated)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn cmd_generate(
    game_data: &Path,
    config_path: &Path,
    output: Option<&Path>,
    dry_run: bool,
    show_diff: bool,
) -> Result<()> {
    let config = load_from_path(config_path)?;
    let generation = generate(game_data, &config)?;
    let text = generation.render();

    for failure in &generation.scan.failures {
        eprintln!(
            "{} {}: {}",
            "⚠".yellow(),
            failure.path.display(),
            failure.error
        );
    }

    let Some(output) = output else {
        print!("{text}");
        return Ok(());
    };

    if show_diff {
        let current = read_existing(output)?;
        if current != text {
            display_diff(output, &current, &text);
        }
    }

    if dry_run {
        println!("{}", "[DRY RUN - nothing written]".cyan());
        let unchanged = read_existing(output)? == text;
        if unchanged {
            println!("{} {}: up to date", "⊙".yellow(), output.display());
        } else {
            println!("{} {}: would be written", "✓".green(), output.display());
        }
    } else {
        match write_output(output, &text)? {
            WriteResult::Written { path, bytes } => {
                println!("{} {}: wrote {} bytes", "✓".green(), path.display(), bytes);
            }
            WriteResult::Unchanged { path } => {
                println!("{} {}: already up to date", "⊙".yellow(), path.display());
            }
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!(
        "  {} parts scanned in {} files",
        format!("{}", generation.scan.parts.len()).green(),
        generation.scan.files
    );
    println!(
        "  {} patches generated",
        format!("{}", generation.patch_count()).green()
    );
    println!(
        "  {} files failed",
        format!("{}", generation.scan.failures.len()).red()
    );

    Ok(())
}

fn cmd_check(files: &[PathBuf]) -> Result<()> {
    let mut failed = 0;

    for file in files {
        let tree = match ConfigNode::load(file) {
            Ok(tree) => tree,
            Err(e) => {
                eprintln!("{} {}", "✗".red(), e);
                failed += 1;
                continue;
            }
        };

        match ConfigNode::parse(&tree.serialize()) {
            Ok(reparsed) if reparsed == tree => {
                println!(
                    "{} {}: {} nodes",
                    "✓".green(),
                    file.display(),
                    count_nodes(&tree)
                );
            }
            Ok(_) => {
                eprintln!(
                    "{} {}: serialized form does not parse back to the same tree",
                    "✗".red(),
                    file.display()
                );
                failed += 1;
            }
            Err(e) => {
                eprintln!("{} {}: re-parse failed: {}", "✗".red(), file.display(), e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn count_nodes(node: &ConfigNode) -> usize {
    node.children().iter().map(|c| 1 + count_nodes(c)).sum()
}

fn cmd_query(dir: &Path, terms: &[String], extension: &str) -> Result<()> {
    let query = SearchQuery::from_terms(terms)?;
    let mut total = 0;

    for path in find_files(dir, extension)? {
        let tree = match ConfigNode::load(&path) {
            Ok(tree) => tree,
            Err(e) => {
                eprintln!("{} {}", "⚠".yellow(), e);
                continue;
            }
        };

        for node in tree.children() {
            if !query.matches(node) {
                continue;
            }
            total += 1;
            match node.value("name") {
                Some(name) => println!(
                    "{}: {} {}",
                    path.display().to_string().dimmed(),
                    node.header(),
                    name.bold()
                ),
                None => println!("{}: {}", path.display().to_string().dimmed(), node.header()),
            }
        }
    }

    println!();
    println!("{} matching nodes for {}", total, query.to_string().cyan());
    Ok(())
}

fn cmd_types(game_data: &Path, config_path: Option<&Path>) -> Result<()> {
    let paths = match config_path {
        Some(path) => load_paths(path)?,
        None => GeneratorConfig::default().paths,
    };
    let library = load_library(game_data, &paths)?;

    for (name, tank) in library.types().iter() {
        let useful = tank.useful_volume_ratio().unwrap_or(1.0);
        println!("{} (useful volume {})", name.bold(), useful);
        for (resource, upl) in tank.units_per_liter() {
            println!("  {resource:<24} {upl} u/L");
        }
    }

    println!();
    println!("{} tank types", format!("{}", library.len()).green());
    Ok(())
}

fn load_library(game_data: &Path, paths: &Paths) -> Result<TankLibrary> {
    let path = paths.tank_types_in(game_data);
    TankLibrary::load(&path).with_context(|| format!("loading tank types from {}", path.display()))
}
