use std::path::PathBuf;
use std::process;

use clap::Parser;
use vecedit_core::catalog::Catalogs;
use vecedit_core::core_api::{CoreError, Engine, Session};
use vecedit_core::mutations::Mutation;
use vecedit_core::spatial::GridCell;
use vecedit_render::{
    render_cell_report, render_json_summary, render_map_window, render_mutation_report,
    render_text_summary, render_tree,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MapWindow {
    origin: GridCell,
    width: i64,
    height: i64,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "SAVE")]
    path: PathBuf,
    #[arg(long, conflicts_with_all = ["cell", "map", "tree"])]
    json: bool,
    #[arg(long, value_name = "X,Y", conflicts_with_all = ["map", "tree"])]
    cell: Option<GridCell>,
    #[arg(
        long,
        value_name = "X,Y,W,H",
        value_parser = parse_map_window,
        allow_hyphen_values = true,
        conflicts_with = "tree"
    )]
    map: Option<MapWindow>,
    #[arg(long)]
    tree: bool,
    #[arg(long, value_name = "REGION_ID")]
    region: Option<String>,
    #[arg(long, value_name = "PATH")]
    catalog: Option<PathBuf>,
    #[arg(long = "set-name")]
    set_name: Option<String>,
    #[arg(long = "set-description")]
    set_description: Option<String>,
    #[arg(long = "set-file-name")]
    set_file_name: Option<String>,
    #[arg(long = "set-version")]
    set_version: Option<String>,
    #[arg(long = "set-world-time", value_name = "SECONDS", allow_hyphen_values = true)]
    set_world_time: Option<f64>,
    #[arg(long = "set-seed", allow_hyphen_values = true)]
    set_seed: Option<i64>,
    #[arg(long = "set-gamemode", value_name = "GAMEMODE_ID")]
    set_gamemode: Option<String>,
    #[arg(long = "set-active-region", value_name = "REGION_ID")]
    set_active_region: Option<String>,
    #[arg(long = "remove-enemy-units")]
    remove_enemy_units: bool,
    #[arg(long = "remove-enemy-buildings")]
    remove_enemy_buildings: bool,
    #[arg(long = "unlock-research")]
    unlock_research: bool,
    #[arg(long = "remove-decryptors")]
    remove_decryptors: bool,
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn requested_mutations(&self) -> Vec<Mutation> {
        [
            (self.remove_enemy_units, Mutation::RemoveEnemyUnits),
            (self.remove_enemy_buildings, Mutation::RemoveEnemyBuildings),
            (self.unlock_research, Mutation::UnlockAllResearch),
            (self.remove_decryptors, Mutation::RemoveAllDecryptors),
        ]
        .into_iter()
        .filter_map(|(requested, mutation)| requested.then_some(mutation))
        .collect()
    }

    fn has_header_edits(&self) -> bool {
        self.set_name.is_some()
            || self.set_description.is_some()
            || self.set_file_name.is_some()
            || self.set_version.is_some()
            || self.set_world_time.is_some()
            || self.set_seed.is_some()
            || self.set_gamemode.is_some()
            || self.set_active_region.is_some()
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mutations = cli.requested_mutations();
    let has_edits = cli.has_header_edits() || !mutations.is_empty();

    if has_edits && cli.output.is_none() {
        eprintln!("edit flags require --output <PATH>");
        process::exit(2);
    }
    if !has_edits && cli.output.is_some() {
        eprintln!("--output requires at least one edit flag");
        process::exit(2);
    }

    let catalogs = match &cli.catalog {
        Some(path) => Catalogs::load_from_file(path).unwrap_or_else(|e| {
            eprintln!("Error loading catalog {}: {e}", path.display());
            process::exit(1);
        }),
        None => Catalogs::builtin(),
    };

    let engine = Engine::with_catalogs(catalogs);
    let mut session = engine.open_path(&cli.path).unwrap_or_else(|e| {
        eprintln!("Error opening save file: {}", cli.path.display());
        eprintln!("  {e}");
        process::exit(1);
    });

    apply_header_edits(&cli, &mut session);

    let mut reports = Vec::with_capacity(mutations.len());
    for mutation in mutations {
        let report = session.apply(mutation).unwrap_or_else(|e| {
            eprintln!("Error applying {}: {e}", mutation.as_str());
            process::exit(1);
        });
        reports.push(report);
    }

    if let Some(out_path) = &cli.output {
        session.save(out_path).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", out_path.display());
            process::exit(1);
        });
    }

    if cli.json {
        let json = render_json_summary(&session).unwrap_or_else(|e| {
            eprintln!("Error reading save header: {e}");
            process::exit(1);
        });
        let rendered = serde_json::to_string_pretty(&json).unwrap_or_else(|e| {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(1);
        });
        println!("{rendered}");
        return;
    }

    if cli.cell.is_some() || cli.map.is_some() {
        print_spatial_view(&cli, &mut session);
        return;
    }

    if cli.tree {
        print!("{}", render_tree(&session.to_tree()));
        return;
    }

    if let Some(out_path) = &cli.output {
        for report in &reports {
            println!("{}", render_mutation_report(report));
        }
        println!("Wrote edited save to {}", out_path.display());
        return;
    }

    let summary = render_text_summary(&session).unwrap_or_else(|e| {
        eprintln!("Error reading save header: {e}");
        process::exit(1);
    });
    print!("{summary}");
}

fn apply_header_edits(cli: &Cli, session: &mut Session) {
    type TextSetter = fn(&mut Session, &str) -> Result<(), CoreError>;
    let text_edits: [(&str, &Option<String>, TextSetter); 6] = [
        ("name", &cli.set_name, Session::set_name),
        ("description", &cli.set_description, Session::set_description),
        ("file name", &cli.set_file_name, Session::set_file_name),
        ("version", &cli.set_version, Session::set_version),
        ("gamemode", &cli.set_gamemode, Session::set_gamemode),
        ("active region", &cli.set_active_region, Session::set_active_region),
    ];
    for (what, value, setter) in text_edits {
        if let Some(value) = value {
            setter(session, value).unwrap_or_else(|e| {
                eprintln!("Error applying {what} edit: {e}");
                process::exit(1);
            });
        }
    }
    if let Some(seconds) = cli.set_world_time {
        session.set_world_time(seconds).unwrap_or_else(|e| {
            eprintln!("Error applying world time edit: {e}");
            process::exit(1);
        });
    }
    if let Some(seed) = cli.set_seed {
        session.set_seed(seed).unwrap_or_else(|e| {
            eprintln!("Error applying seed edit: {e}");
            process::exit(1);
        });
    }
}

fn print_spatial_view(cli: &Cli, session: &mut Session) {
    let region_id = cli
        .region
        .clone()
        .unwrap_or_else(|| session.catalogs().primary_region_id.clone());
    if !session.regions_present().contains(&region_id) {
        tracing::warn!(
            target: "vecedit::cli",
            region = %region_id,
            "region.not_in_save"
        );
    }

    let indexes = session.rebuild_indexes(&region_id).unwrap_or_else(|e| {
        eprintln!("Error indexing {region_id}: {e}");
        process::exit(1);
    });

    if let Some(window) = cli.map {
        print!(
            "{}",
            render_map_window(indexes, window.origin, window.width, window.height)
        );
        return;
    }

    if let Some(cell) = cli.cell {
        let report = indexes.describe_cell(cell).unwrap_or_else(|e| {
            eprintln!("Error describing cell {cell}: {e}");
            process::exit(1);
        });
        print!("{}", render_cell_report(&report));
    }
}

fn parse_map_window(value: &str) -> Result<MapWindow, String> {
    let parts: Vec<i64> = value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<i64>()
                .map_err(|_| format!("invalid map window '{value}', expected X,Y,W,H"))
        })
        .collect::<Result<_, _>>()?;
    let [x, y, width, height] = parts[..] else {
        return Err(format!("invalid map window '{value}', expected X,Y,W,H"));
    };
    if width <= 0 || height <= 0 {
        return Err(format!("map window size must be positive, got {width}x{height}"));
    }
    Ok(MapWindow {
        origin: GridCell::new(x, y),
        width,
        height,
    })
}
