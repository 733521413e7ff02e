mod commands;
mod logging;
mod render;

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use covtree_core::contents::{self, ContentsOutcome};
use covtree_core::{
    oracle, AppConfig, Credentials, MemoryReport, PathContentsRequest, PathOrdering, Report,
};
use dotenv::dotenv;
use render::OutputFormat;
use tracing::{error, info};

/// Exit status when the request was valid but names unknown flags or paths.
const EXIT_NO_LISTING: i32 = 2;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    let config = match covtree_core::config::load_configuration(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let result = match args.command {
        Some(Commands::Contents {
            path,
            flags,
            search,
            display,
            order_by,
            direction,
            format,
        }) => {
            let request = PathContentsRequest {
                path,
                flags,
                search,
                display,
                ordering: PathOrdering::new(order_by, direction),
            };
            run_contents(&config, args.report.as_deref(), &request, format)
        }
        Some(Commands::Flags) => run_flags(&config, args.report.as_deref()),
        Some(Commands::File { path, flags }) => {
            run_file(&config, args.report.as_deref(), &path, &flags)
        }
        Some(Commands::PrintConfig) => {
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(0)
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(0)
        }
    };

    match result {
        Ok(0) => Ok(()),
        Ok(code) => process::exit(code),
        Err(err) => {
            error!("Error: {}", err);
            process::exit(1);
        }
    }
}

fn load_report(
    config: &AppConfig,
    override_path: Option<&Path>,
) -> Result<MemoryReport, Box<dyn std::error::Error>> {
    let path = match (override_path, config.report_path.as_deref()) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(path)) => PathBuf::from(path),
        (None, None) => {
            return Err("no report given: pass --report or set report_path".into());
        }
    };
    Ok(MemoryReport::load(&path)?)
}

fn run_contents(
    config: &AppConfig,
    report_path: Option<&Path>,
    request: &PathContentsRequest,
    format: OutputFormat,
) -> Result<i32, Box<dyn std::error::Error>> {
    let report = load_report(config, report_path)?;
    let oracle = oracle::from_config(config);
    let credentials = Credentials {
        token: env::var("COVTREE_TOKEN").ok(),
    };

    let outcome = contents::path_contents(
        &report,
        request,
        &oracle,
        &config.source_ref(),
        &credentials,
    )?;

    match outcome {
        ContentsOutcome::Listing(nodes) => {
            info!("{} entries under {:?}", nodes.len(), request.path);
            render::render(&nodes, format, &mut io::stdout().lock())?;
            Ok(0)
        }
        ContentsOutcome::UnknownFlags { requested } => {
            eprintln!(
                "{} none of the flags {:?} exist in this report",
                "unknown flags:".red().bold(),
                requested
            );
            Ok(EXIT_NO_LISTING)
        }
        ContentsOutcome::UnknownPath { message, .. } => {
            eprintln!("{} {}", "unknown path:".red().bold(), message);
            Ok(EXIT_NO_LISTING)
        }
        ContentsOutcome::MissingCoverage { message, .. } => {
            eprintln!("{} {}", "missing coverage:".yellow().bold(), message);
            Ok(EXIT_NO_LISTING)
        }
    }
}

fn run_flags(
    config: &AppConfig,
    report_path: Option<&Path>,
) -> Result<i32, Box<dyn std::error::Error>> {
    let report = load_report(config, report_path)?;
    for flag in report.flags() {
        let carried_by = report
            .sessions()
            .iter()
            .filter(|session| session.flags.contains(&flag))
            .count();
        println!("{}\t{} sessions", flag.bold(), carried_by);
    }
    Ok(0)
}

fn run_file(
    config: &AppConfig,
    report_path: Option<&Path>,
    path: &str,
    flags: &[String],
) -> Result<i32, Box<dyn std::error::Error>> {
    let report = load_report(config, report_path)?;
    let file = contents::file_coverage(&report, path, flags)?;
    let totals = file.totals;

    println!("{}", file.full_path.bold());
    println!("  lines:    {}", totals.lines);
    println!("  hits:     {}", totals.hits.to_string().green());
    println!("  partials: {}", totals.partials.to_string().yellow());
    println!("  misses:   {}", totals.misses.to_string().red());
    println!("  coverage: {:.2}%", totals.coverage());
    Ok(0)
}
