//! Command-line interface implementation

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::card::BitCard;
use crate::catalog::{parse_index_token, CardCatalog};
use crate::config::{load_config, merge_cli_overrides, CliOverrides, SticConfig};
use crate::figure::render;
use crate::output::{generate_output_path, raster_to_image, save_png, scale_image};
use crate::palette::Palette;
use crate::project::Project;

const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 1;
const EXIT_INVALID_ARGS: u8 = 2;

/// Intellivision card, animation and screen tool
#[derive(Parser)]
#[command(name = "stic")]
#[command(about = "Intellivision card, animation and screen tool")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Treat warnings as errors
    #[arg(long, global = true)]
    pub strict: bool,

    /// Use this stic.toml instead of searching for one
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// How `stic catalog --card` prints a card
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CardFormat {
    Hex,
    Binary,
    Bytes,
    Bitmap,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode a card catalog and report its contents
    Catalog {
        /// Catalog JSON file
        file: PathBuf,

        /// Print a single card (decimal or $hex)
        #[arg(long)]
        card: Option<String>,

        #[arg(long, value_enum, default_value = "hex")]
        format: CardFormat,
    },

    /// Print the layers a timeline shows at a tick
    Resolve {
        /// Project JSON file
        project: PathBuf,

        #[arg(long)]
        timeline: String,

        #[arg(long)]
        tick: u32,

        /// Wrap past the end even if the timeline does not loop
        #[arg(long = "loop")]
        looping: bool,
    },

    /// Print the resolved slots of a composite at a frame
    Composite {
        /// Project JSON file
        project: PathBuf,

        #[arg(long)]
        name: String,

        #[arg(long)]
        frame: u32,

        /// Card catalog for native colors of catalog cards
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Render figures to PNG
    Render {
        /// Project JSON file
        project: PathBuf,

        /// Only render the figure with this name
        #[arg(short, long)]
        figure: Option<String>,

        /// Output file or directory.
        /// If omitted: {project}_{figure}.png
        /// If file (single figure): output.png
        /// If file (multiple): output_{figure}.png
        /// If directory (ends with /): dir/{figure}.png
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Scale output by integer factor (1-16)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=16))]
        scale: Option<u32>,

        /// Card catalog for tiles using cards 0-255
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let global = CliOverrides { strict: cli.strict.then_some(true), ..Default::default() };
    merge_cli_overrides(&mut config, &global);

    match cli.command {
        Commands::Catalog { file, card, format } => {
            run_catalog(&file, card.as_deref(), format, config.render.strict)
        }
        Commands::Resolve { project, timeline, tick, looping } => {
            run_resolve(&project, &timeline, tick, looping)
        }
        Commands::Composite { project, name, frame, catalog } => {
            merge_cli_overrides(&mut config, &CliOverrides { catalog, ..Default::default() });
            run_composite(&project, &name, frame, &config)
        }
        Commands::Render { project, figure, output, scale, catalog } => {
            merge_cli_overrides(&mut config, &CliOverrides { catalog, scale, strict: None });
            run_render(&project, figure.as_deref(), output.as_deref(), &config)
        }
    }
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .try_init();
}

fn open_project(path: &Path) -> Result<Project, ExitCode> {
    Project::load(path).map_err(|e| {
        eprintln!("Error: Cannot open project '{}': {}", path.display(), e);
        ExitCode::from(EXIT_INVALID_ARGS)
    })
}

/// Load a catalog, printing its warnings. Strict mode turns them into a failure.
fn open_catalog(path: Option<&Path>, strict: bool) -> Result<CardCatalog, ExitCode> {
    let Some(path) = path else {
        return Ok(CardCatalog::new());
    };
    let result = CardCatalog::load(path).map_err(|e| {
        eprintln!("Error: Cannot read catalog '{}': {}", path.display(), e);
        ExitCode::from(EXIT_INVALID_ARGS)
    })?;

    if strict && !result.warnings.is_empty() {
        for warning in &result.warnings {
            eprintln!("Error: {}", warning);
        }
        return Err(ExitCode::from(EXIT_ERROR));
    }
    for warning in &result.warnings {
        eprintln!("Warning: {}", warning);
    }
    Ok(result.catalog)
}

fn format_card(card: &BitCard, format: CardFormat) -> String {
    match format {
        CardFormat::Hex => card.to_hex_rows().join(" "),
        CardFormat::Binary => card.to_binary_rows().join("\n"),
        CardFormat::Bytes => {
            let bytes: Vec<String> = card.to_bytes().iter().map(u8::to_string).collect();
            format!("[{}]", bytes.join(", "))
        }
        CardFormat::Bitmap => card.to_string(),
    }
}

fn run_catalog(file: &Path, card: Option<&str>, format: CardFormat, strict: bool) -> ExitCode {
    let catalog = match open_catalog(Some(file), strict) {
        Ok(catalog) => catalog,
        Err(code) => return code,
    };

    match card {
        Some(token) => {
            let index = match parse_index_token(token) {
                Ok(token) => token.index(),
                Err(message) => {
                    eprintln!("Error: {}", message);
                    return ExitCode::from(EXIT_INVALID_ARGS);
                }
            };
            let label = catalog.label(index);
            if !label.is_empty() {
                println!("# {} {}", index, label);
            }
            println!("{}", format_card(catalog.get(index), format));
        }
        None => {
            println!("{} cards defined, {} labeled", catalog.defined_count(), catalog.labels().len());
            for (index, label) in catalog.labels() {
                println!("{:3}  {}", index, label);
            }
        }
    }
    ExitCode::from(EXIT_SUCCESS)
}

fn run_resolve(path: &Path, name: &str, tick: u32, looping: bool) -> ExitCode {
    let project = match open_project(path) {
        Ok(project) => project,
        Err(code) => return code,
    };
    let Some(timeline) = project.timeline(name) else {
        eprintln!("Error: No timeline named '{}' found in project", name);
        return ExitCode::from(EXIT_ERROR);
    };

    let loop_override = looping.then_some(true);
    match timeline.frame_index_at(tick, loop_override) {
        Some(frame) => {
            println!("tick {}: frame {}", tick, frame);
            for (i, layer) in timeline.resolve(tick, loop_override).iter().enumerate() {
                let state = if layer.visible { "" } else { " (hidden)" };
                println!("  layer {}: card {}{}", i, layer.card_index, state);
            }
        }
        None => println!("tick {}: past end ({} ticks)", tick, timeline.total_duration()),
    }
    ExitCode::from(EXIT_SUCCESS)
}

fn run_composite(path: &Path, name: &str, frame: u32, config: &SticConfig) -> ExitCode {
    let strict = config.render.strict;
    let project = match open_project(path) {
        Ok(project) => project,
        Err(code) => return code,
    };
    let catalog = match open_catalog(config.project.catalog.as_deref(), strict) {
        Ok(catalog) => catalog,
        Err(code) => return code,
    };
    let Some(composite) = project.composite(name) else {
        eprintln!("Error: No composite named '{}' found in project", name);
        return ExitCode::from(EXIT_ERROR);
    };

    let mut warnings = Vec::new();
    for binding in composite.layers() {
        if project.timeline(&binding.timeline).is_none() {
            warnings.push(format!("composite '{}': unknown timeline '{}'", name, binding.timeline));
        }
    }
    if strict && !warnings.is_empty() {
        for warning in &warnings {
            eprintln!("Error: {}", warning);
        }
        return ExitCode::from(EXIT_ERROR);
    }

    let store = project.card_store(&catalog).with_default_color(config.defaults.card_color);
    let resolved = composite.resolve(frame, &project, &store);
    println!("frame {}:", frame);
    for (slot, layer) in resolved.iter().enumerate() {
        match layer {
            Some(layer) => println!("  {}: card {} color {}", slot, layer.card_index, layer.color),
            None => println!("  {}: -", slot),
        }
    }

    for warning in &warnings {
        eprintln!("Warning: {}", warning);
    }
    ExitCode::from(EXIT_SUCCESS)
}

fn run_render(path: &Path, filter: Option<&str>, output: Option<&Path>, config: &SticConfig) -> ExitCode {
    let project = match open_project(path) {
        Ok(project) => project,
        Err(code) => return code,
    };
    let catalog = match open_catalog(config.project.catalog.as_deref(), config.render.strict) {
        Ok(catalog) => catalog,
        Err(code) => return code,
    };

    let figures: Vec<_> = project
        .figures
        .iter()
        .filter(|f| filter.map_or(true, |name| f.name == name))
        .collect();

    if figures.is_empty() {
        match filter {
            Some(name) => eprintln!("Error: No figure named '{}' found in project", name),
            None => eprintln!("Error: No figures found in project"),
        }
        return ExitCode::from(EXIT_ERROR);
    }

    let store = project.card_store(&catalog).with_default_color(config.defaults.card_color);
    let palette = Palette::intellivision();
    let is_single = figures.len() == 1;
    let scale = config.render.scale;

    let results: Vec<_> = figures
        .par_iter()
        .map(|figure| {
            let image = scale_image(raster_to_image(&render(figure, &store), palette), scale);
            let output_path = generate_output_path(path, &figure.name, output, is_single);
            save_png(&image, &output_path).map(|_| output_path.clone()).map_err(|e| (output_path, e))
        })
        .collect();

    let mut failed = false;
    for result in results {
        match result {
            Ok(saved) => println!("Saved: {}", saved.display()),
            Err((output_path, e)) => {
                eprintln!("Error: Failed to save '{}': {}", output_path.display(), e);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}
