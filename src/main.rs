//! amber-test-runner - test-suite orchestrator for AmberTools and Amber
//!
//! Builds test suites from the installation's test Makefiles, runs them
//! serially, on a local worker pool, or split across CI nodes, and writes
//! output, diff, timing and summary logs.
//!
//! ## Usage
//!
//! ```bash
//! # Run the fast AmberTools suite on every CPU
//! amber-test-runner run --task fast
//!
//! # Run the first half of the serial MM tests, one at a time
//! amber-test-runner run --task serial.MM.0 -n 1
//!
//! # Run this CI node's share of every suite
//! amber-test-runner run --task all --circleci
//!
//! # Show what a task would run
//! amber-test-runner run --task rism --collect-only
//!
//! # List suites with their resolved members
//! amber-test-runner list --detailed
//! ```

use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use clap::Parser;
use std::io::IsTerminal;
use tracing::{info, warn};

mod catalog;
mod cli;
mod config;
mod executor;
mod models;
mod output;
mod results;
mod run;
mod utils;

use catalog::{Catalog, Exclusions, TaskRequest};
use cli::Args;
use config::{ConfigFile, EnvConfig};
use executor::{Dispatcher, ExecutionMode, Strategy, TestRunner};
use output::{Console, OutputFormat, ResolvedSuite, ResultFormatter};
use results::{format_finished, LogWriter, RunReport};
use run::{finish, run_task, RunOutcome};
use utils::{init_logger, LogLevel, Timer};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env = EnvConfig::load();

    init_logger(LogLevel::resolve(args.debug, env.log_level.as_deref()));

    let config_path = args.config.clone().or_else(|| env.config_file.clone());

    match args.command {
        cli::Command::Run(run_args) => {
            let config = ConfigFile::load_or_default(config_path.as_deref())?;
            run_tests(run_args, &config, &env).await?;
        }
        cli::Command::List(list_args) => {
            let config = ConfigFile::load_or_default(config_path.as_deref())?;
            list_suites(list_args, &config, &env)?;
        }
        cli::Command::Env => {
            env.print_summary();
            println!();
            config::print_env_help();
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args, config_path)?;
        }
    }

    Ok(())
}

fn terminal_formatter() -> ResultFormatter {
    let formatter = ResultFormatter::new(OutputFormat::Text);
    if std::io::stdout().is_terminal() {
        formatter
    } else {
        formatter.no_color()
    }
}

async fn run_tests(args: cli::RunArgs, config: &ConfigFile, env: &EnvConfig) -> Result<()> {
    let amberhome = env.require_amberhome()?;
    let app = &config.app;

    let task = args.task.unwrap_or_else(|| app.default_task.clone());
    let num_cpus = args.num_cpus.unwrap_or(app.num_cpus);
    let output_dir = args.output_dir.unwrap_or_else(|| app.output_dir.clone());

    let exclusions = match &args.exclude {
        Some(path) => Exclusions::load(path)?,
        None => Exclusions::default(),
    };
    if !exclusions.is_empty() {
        info!(
            "Excluding {} test name(s) and {} test line pattern(s)",
            exclusions.test_name.len(),
            exclusions.test_line.len()
        );
    }

    let mut catalog = Catalog::new(&amberhome, config.suite_definitions())
        .with_excluded_names(exclusions.test_name.clone());
    let request = TaskRequest::new(&task)
        .make(args.make)
        .use_amber_test_dir(args.use_amber_test_dir)
        .excluded_lines(exclusions.test_line.clone());

    let mode = ExecutionMode::from_make_flag(args.make);
    let started_at = Utc::now();
    let timer = Timer::start(format!("task {task}"));

    let outcome = run_task(&mut catalog, &request, args.collect_only, |suite| {
        let node = if args.circleci {
            Some(env.node_partition()?)
        } else {
            None
        };
        let strategy = Strategy::select(num_cpus, node);
        info!("Running {} tests ({}, {})", suite.len(), mode, strategy);
        Ok(Dispatcher::new(
            TestRunner::new(mode, Console::detect()),
            strategy,
        ))
    })
    .await?;

    let (suite, strategy, result) = match outcome {
        RunOutcome::Collected(suite) => {
            print!("{}", terminal_formatter().format_suite(&suite));
            return Ok(());
        }
        RunOutcome::Completed {
            suite,
            strategy,
            result,
        } => (suite, strategy, result),
    };

    let writer = LogWriter::new(&output_dir, app.logs.clone());
    let summary = writer.write_all(&result, &amberhome)?;
    let minutes = timer.elapsed_minutes();
    writer.append_summary(&format_finished("testing AmberTools", minutes))?;
    info!(
        "Logs written to {} ({:.1} s of test time)",
        writer.dir().display(),
        result.total_secs()
    );
    if !summary.is_clean() {
        warn!(
            "{} failed comparison(s), {} program error(s)",
            summary.failed, summary.program_errors
        );
    }

    let formatter = terminal_formatter();
    print!("{}", formatter.format_errors(&result.errors));
    println!("{}", formatter.format_summary(&summary, minutes));

    if let Some(path) = &args.json_report {
        let report = RunReport::new(
            &task,
            mode.to_string(),
            strategy.to_string(),
            &amberhome,
            started_at,
        )
        .complete(suite.len(), &result);
        report.save(path)?;
        info!("Run {} took {:.1} s", report.id, report.duration_secs());
    }

    timer.stop();

    finish(&result)
}

fn list_suites(args: cli::ListArgs, config: &ConfigFile, env: &EnvConfig) -> Result<()> {
    let format = OutputFormat::from_str(&args.format)
        .ok_or_else(|| anyhow!("Unknown format: {}", args.format))?;
    let formatter = ResultFormatter::new(format);
    let definitions = config.suite_definitions();

    if !args.detailed {
        println!("{}", formatter.format_definitions(&definitions));
        return Ok(());
    }

    let amberhome = env.require_amberhome()?;
    let mut catalog = Catalog::new(amberhome, definitions);

    let names: Vec<String> = catalog
        .definitions()
        .iter()
        .map(|d| d.name.clone())
        .collect();
    let mut resolved = Vec::with_capacity(names.len());
    for name in names {
        let members = catalog.member_names(&name)?;
        resolved.push(ResolvedSuite { name, members });
    }

    println!("{}", formatter.format_resolved(&resolved));
    Ok(())
}

fn manage_config(args: cli::ConfigArgs, config_path: Option<std::path::PathBuf>) -> Result<()> {
    match args.action {
        cli::ConfigAction::Init { output, force } => {
            if output.exists() && !force {
                bail!(
                    "Configuration file already exists: {}. Use --force to overwrite.",
                    output.display()
                );
            }

            ConfigFile::example().save(&output)?;
            println!("✓ Configuration file created: {}", output.display());
            println!("\nEdit the file to customize your settings.");
        }

        cli::ConfigAction::Show { format } => {
            let config = ConfigFile::load_or_default(config_path.as_deref())?;
            let output = if format == "json" {
                serde_json::to_string_pretty(&config)?
            } else {
                serde_yaml::to_string(&config)?
            };
            println!("{output}");
        }

        cli::ConfigAction::Validate { file } => {
            let path = file
                .or(config_path)
                .or_else(ConfigFile::find)
                .ok_or_else(|| anyhow!("No configuration file found"))?;

            match ConfigFile::load(&path) {
                Ok(_) => println!("✓ Configuration file is valid: {}", path.display()),
                Err(e) => {
                    println!("✗ Configuration file is invalid: {}", path.display());
                    return Err(e);
                }
            }
        }
    }

    Ok(())
}
