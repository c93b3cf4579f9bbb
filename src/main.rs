use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use route_me::config::DEFAULT_CONFIG_PATH;
use route_me::export::{open_in_browser, write_description, write_route_map};
use route_me::logging::{LogFormat, LogLevel, LogOptions, init_logger};
use route_me::services::{CachedLookup, CitySearch, MapboxOptimizer, MapboxSearch, WorkersAi};
use route_me::utils::{meters_to_km, meters_to_miles};
use route_me::{Credentials, Error, Planner, Result, Session, Settings};

#[derive(Debug, Parser)]
#[command(name = "route-me", version, about = "Plan the shortest tour past a city's landmarks")]
struct Cli {
    /// YAML settings file; defaults apply when it does not exist.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    #[arg(long, global = true)]
    log_timestamp: bool,

    /// Write logs to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List cities matching a query.
    Cities { query: String },
    /// Find landmarks in a city and plan a route between them.
    Plan(PlanArgs),
}

#[derive(Debug, Args)]
struct PlanArgs {
    city: String,

    /// Which city suggestion to use (0 is the first).
    #[arg(long, default_value_t = 0)]
    pick: usize,

    /// Table rows to leave out of the route, e.g. `--exclude 1,4`.
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<usize>,

    #[arg(long)]
    max_landmarks: Option<usize>,

    #[arg(long, conflicts_with = "no_radius")]
    radius_km: Option<f64>,

    /// Do not filter landmarks by distance from the city center.
    #[arg(long)]
    no_radius: bool,

    /// Only keep landmarks inside the city's bounding box.
    #[arg(long)]
    bbox: bool,

    /// Routing profile, e.g. mapbox/walking.
    #[arg(long)]
    profile: Option<String>,

    /// Word used in the tour description, e.g. walking.
    #[arg(long)]
    activity: Option<String>,

    /// Also write a narrated tour description.
    #[arg(long)]
    describe: bool,

    /// Edit the landmark table before planning.
    #[arg(long)]
    interactive: bool,

    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Open the route map in the browser when done.
    #[arg(long)]
    open: bool,
}

impl PlanArgs {
    fn apply(&self, settings: &mut Settings) {
        if let Some(max) = self.max_landmarks {
            settings.landmarks.max_count = max;
        }
        if let Some(radius) = self.radius_km {
            settings.landmarks.radius_km = Some(radius);
        }
        if self.no_radius {
            settings.landmarks.radius_km = None;
        }
        if self.bbox {
            settings.landmarks.within_bounding_box = true;
        }
        if let Some(profile) = &self.profile {
            settings.optimizer.profile = profile.clone();
        }
        if let Some(activity) = &self.activity {
            settings.text.activity = activity.clone();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(&LogOptions {
        level: cli.log_level,
        format: cli.log_format,
        timestamp: cli.log_timestamp,
        output: cli.log_file.clone(),
    })?;

    let mut settings = Settings::load(&cli.config)?;

    match cli.command {
        Command::Cities { query } => {
            let token = Credentials::mapbox_token_from_env()?;
            let search = MapboxSearch::new(token, &settings.landmarks.poi_categories)?;
            let suggestions = search.suggest(&query)?;
            if suggestions.is_empty() {
                println!("No cities match '{query}'.");
            }
            for (i, s) in suggestions.iter().enumerate() {
                println!("{i:>2}  {}", s.label);
            }
            Ok(())
        }
        Command::Plan(args) => {
            args.apply(&mut settings);
            settings.validate()?;
            let credentials = Credentials::from_env()?;
            plan(&settings, &credentials, &args)
        }
    }
}

fn plan(settings: &Settings, credentials: &Credentials, args: &PlanArgs) -> Result<()> {
    let search = MapboxSearch::new(&credentials.mapbox_token, &settings.landmarks.poi_categories)?
        .within_bounding_box(settings.landmarks.within_bounding_box);
    let lookup = match &settings.lookup_cache {
        Some(path) => CachedLookup::with_file(&search, path),
        None => CachedLookup::in_memory(&search),
    };
    let text = WorkersAi::new(
        &credentials.cloudflare_account_id,
        &credentials.cloudflare_api_token,
        &settings.text.model,
    )?;
    let optimizer = MapboxOptimizer::new(&credentials.mapbox_token, &settings.optimizer.profile)?;

    let suggestions = search.suggest(&args.city)?;
    let Some(choice) = suggestions.get(args.pick) else {
        return Err(Error::other(format!(
            "no city suggestion #{} for '{}' ({} found)",
            args.pick,
            args.city,
            suggestions.len()
        )));
    };
    let anchor = search.retrieve(&choice.id)?;
    println!("City: {} ({:.4}, {:.4})", anchor.name, anchor.latitude, anchor.longitude);

    let planner = Planner::new(settings, &text, &lookup, &optimizer);
    let mut session = Session::new();

    let outcome = planner.on_city_chosen(&mut session, anchor).map(|_| ());
    if let Err(e) = lookup.save() {
        log::warn!("could not save the lookup cache: {e}");
    }
    outcome?;
    print_table(&session);

    for &row in &args.exclude {
        planner.on_inclusion_toggled(&mut session, row, false)?;
    }

    if args.interactive {
        return edit_loop(&planner, &mut session, args);
    }

    optimize(&planner, &mut session, &args.out_dir, args.open)?;
    if args.describe {
        describe(&planner, &mut session, &args.out_dir)?;
    }
    Ok(())
}

fn print_table(session: &Session) {
    let rows = session.store().rows();
    if rows.is_empty() {
        println!("No landmarks near the city center.");
    }
    for (i, c) in rows.iter().enumerate() {
        let mark = if c.include { "x" } else { " " };
        println!("{i:>2} [{mark}] {}", c.name);
    }
    for skipped in session.skipped() {
        println!("   skipped {}: {}", skipped.name, skipped.reason);
    }
}

fn optimize(
    planner: &Planner,
    session: &mut Session,
    out_dir: &Path,
    open_map: bool,
) -> Result<()> {
    let route = planner.on_optimize_requested(session)?;
    let meters = route.total_distance_meters;
    println!(
        "Total distance: {:.3} mi ({:.2} km)",
        meters_to_miles(meters),
        meters_to_km(meters)
    );
    for (i, stop) in route.stops.iter().enumerate() {
        println!("{:>2}. {}", i + 1, stop.name);
    }

    let title = session
        .anchor()
        .map(|a| format!("Route through {}", a.name))
        .unwrap_or_default();
    let Some(route) = session.route() else {
        return Err(Error::NoRoute);
    };
    let path = write_route_map(out_dir, &title, route)?;
    println!("Route map: {}", path.display());
    if open_map {
        open_in_browser(&path, |p| open::that(p));
    }
    Ok(())
}

fn describe(planner: &Planner, session: &mut Session, out_dir: &Path) -> Result<()> {
    let markdown = planner.on_description_requested(session)?.to_string();
    println!("\n{markdown}\n");
    let title = session
        .anchor()
        .map(|a| format!("Tour of {}", a.name))
        .unwrap_or_default();
    let path = write_description(out_dir, &title, &markdown)?;
    println!("Route description: {}", path.display());
    Ok(())
}

const EDIT_HELP: &str = "commands: list | <row> on | <row> off | optimize | describe | quit";

/// One command per line; recoverable errors are printed and the loop goes on.
fn edit_loop(planner: &Planner, session: &mut Session, args: &PlanArgs) -> Result<()> {
    println!("{EDIT_HELP}");
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        let result = match words.as_slice() {
            [] => Ok(()),
            ["quit" | "exit" | "q"] => return Ok(()),
            ["list" | "ls"] => {
                print_table(session);
                Ok(())
            }
            ["optimize" | "go"] => optimize(planner, session, &args.out_dir, args.open),
            ["describe"] => describe(planner, session, &args.out_dir),
            [row, state @ ("on" | "off")] => match row.parse::<usize>() {
                Ok(row) => planner.on_inclusion_toggled(session, row, *state == "on"),
                Err(_) => Err(Error::other(format!("'{row}' is not a row number"))),
            },
            _ => Err(Error::other(EDIT_HELP)),
        };

        match result {
            Ok(()) => {}
            Err(e) if e.is_recoverable() => println!("{e}"),
            Err(e) => return Err(e),
        }
    }
}
