//! Classroom scheduler CLI.
//!
//! Solve timetabling requests, run the sample week, or generate random
//! catalogs.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use classroom_scheduler::generator::{CatalogConfig, CatalogGenerator};
use classroom_scheduler::models::{time_of_day_labels, Schedule};
use classroom_scheduler::scheduler::{ClassScheduler, ScheduleKpi, ScheduleRequest};
use classroom_scheduler::solver::SolverBackend;

#[derive(Parser)]
#[command(name = "classroom-scheduler")]
#[command(about = "Weekly classroom timetabling on a discrete block grid")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a request stored as JSON.
    Solve {
        /// Request file
        request: PathBuf,
        /// Backend: bnb, milp (overrides the request)
        #[arg(short, long)]
        backend: Option<String>,
        /// Maximum search nodes
        #[arg(long)]
        node_limit: Option<u64>,
        /// Wall-clock budget in milliseconds
        #[arg(long)]
        time_limit_ms: Option<u64>,
        /// Print the schedule and KPIs as JSON
        #[arg(long)]
        json: bool,
    },

    /// Solve the built-in ten-class sample week.
    Demo {
        /// Backend: bnb, milp
        #[arg(short, long, default_value = "bnb")]
        backend: String,
        /// Print the schedule and KPIs as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a random request on the sample school week.
    Generate {
        /// Number of classes
        #[arg(short, long, default_value = "10")]
        classes: usize,
        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Density preset: light, standard, dense
        #[arg(short, long, default_value = "standard")]
        preset: String,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print time-of-day labels.
    Labels {
        /// Increment in minutes
        #[arg(short, long, default_value = "5")]
        minutes: u32,
    },
}

fn parse_backend(name: &str) -> Result<SolverBackend> {
    match SolverBackend::parse(name) {
        Some(backend) => Ok(backend),
        None => bail!("unknown backend: {name} (expected bnb or milp)"),
    }
}

fn parse_preset(name: &str) -> Result<CatalogConfig> {
    match name.to_lowercase().as_str() {
        "light" => Ok(CatalogConfig::light()),
        "standard" => Ok(CatalogConfig::standard()),
        "dense" => Ok(CatalogConfig::dense()),
        _ => bail!("unknown preset: {name} (expected light, standard or dense)"),
    }
}

fn run(request: &ScheduleRequest, json: bool) -> Result<()> {
    let schedule = ClassScheduler::for_request(request)
        .schedule(request)
        .context("scheduling failed")?;
    let kpi = ScheduleKpi::calculate(&schedule, &request.calendar);

    if json {
        let out = serde_json::json!({ "schedule": schedule, "kpi": kpi });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_schedule(&schedule, &kpi);
    }
    Ok(())
}

fn print_schedule(schedule: &Schedule, kpi: &ScheduleKpi) {
    println!("\n=== Timetable ===");
    for placement in schedule.sorted_by_start() {
        println!("{placement}");
    }

    println!("\n=== KPIs ===");
    println!("Sessions: {}", kpi.session_count);
    println!(
        "Booked: {} / {} min ({:.1}%)",
        kpi.scheduled_minutes,
        kpi.operating_minutes,
        kpi.utilization * 100.0
    );
    for (day, u) in &kpi.utilization_by_day {
        println!("  {} {}: {:.1}%", day.format("%a"), day, u * 100.0);
    }
    println!("Idle between sessions: {} min", kpi.idle_minutes);
    if let Some(stats) = schedule.stats {
        println!(
            "Search: {} nodes, {} backtracks, {} ms",
            stats.nodes, stats.backtracks, stats.elapsed_ms
        );
    }

    if !schedule.is_valid() {
        println!("\n=== Violations ===");
        for v in &schedule.violations {
            println!("[{:?}] {}", v.violation_type, v.message);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Solve {
            request,
            backend,
            node_limit,
            time_limit_ms,
            json,
        } => {
            let mut req = ScheduleRequest::from_path(&request)
                .with_context(|| format!("failed to load {}", request.display()))?;
            if let Some(name) = backend {
                req.solver.backend = parse_backend(&name)?;
            }
            if node_limit.is_some() {
                req.solver.node_limit = node_limit;
            }
            if time_limit_ms.is_some() {
                req.solver.time_limit_ms = time_limit_ms;
            }
            info!(classes = req.classes.len(), "request loaded");
            run(&req, json)?;
        }

        Commands::Demo { backend, json } => {
            let mut req = ScheduleRequest::example_week();
            req.solver.backend = parse_backend(&backend)?;
            run(&req, json)?;
        }

        Commands::Generate {
            classes,
            seed,
            preset,
            output,
        } => {
            let config = parse_preset(&preset)?.with_class_count(classes);
            let calendar = ScheduleRequest::example_week().calendar;
            let req = CatalogGenerator::new(config, seed).generate_request(calendar);
            let text = req.to_json_pretty()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, text)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!(path = %path.display(), classes = req.classes.len(), "request written");
                }
                None => println!("{text}"),
            }
        }

        Commands::Labels { minutes } => {
            if minutes == 0 || 1440 % minutes != 0 {
                bail!("increment must divide a day, got {minutes} minutes");
            }
            for label in time_of_day_labels(minutes) {
                println!("{label}");
            }
        }
    }

    Ok(())
}
