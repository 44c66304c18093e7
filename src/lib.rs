// src/lib.rs

pub mod assets;
pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod lint;
pub mod livesync;
pub mod logging;
pub mod pipeline;
pub mod script;
pub mod style;
pub mod watch;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{BuildConfig, load_config};
use crate::dag::{Plan, TaskId, TaskRegistry};
use crate::engine::Orchestrator;
use crate::errors::Result;
use crate::exec::BuildContext;

/// High-level entry point used by `main.rs`.
///
/// Loads the config, expands the requested task and runs it (or prints the
/// plan with `--dry-run`). Returns `Ok(true)` when every action succeeded.
pub async fn run(args: CliArgs) -> Result<bool> {
    let task: TaskId = args.task.parse()?;
    let config_path = PathBuf::from(&args.config);
    let cfg = load_config(&config_path)?;
    let root = config_root_dir(&config_path);
    debug!(root = ?root, config = ?config_path, "project root");

    let registry = TaskRegistry::standard()?;
    let plan = registry.plan(task)?;

    if args.dry_run {
        print_dry_run(&mut std::io::stdout().lock(), &cfg, &plan)?;
        return Ok(true);
    }

    let ctx = BuildContext::on_disk(root, cfg);
    run_plan_then_watch(ctx, registry, &plan).await
}

/// Run the plan's actions, then enter watch mode if the task asks for it.
async fn run_plan_then_watch(
    ctx: BuildContext,
    registry: TaskRegistry,
    plan: &Plan,
) -> Result<bool> {
    if !plan.is_empty() {
        let orchestrator = Orchestrator::new(registry.clone(), Arc::new(ctx.clone()));
        let summary = orchestrator.run_task(plan.root()).await?;
        if !summary.is_success() {
            return Ok(false);
        }
    }

    if plan.ends_in_watch() {
        let report = watch::watch(ctx, registry).await?;
        info!(builds = report.builds, failed = report.failed_builds, "watch ended");
    }
    Ok(true)
}

/// Project root for a config path.
///
/// - `configs/assetflow.json` -> `configs`
/// - a bare `assetflow.json` -> the current working directory
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Print the stages of `plan`: every leaf of a stage may run once the
/// previous stage is done.
pub fn print_dry_run(out: &mut impl Write, cfg: &BuildConfig, plan: &Plan) -> Result<()> {
    writeln!(out, "assetflow dry-run: {}", plan.root())?;
    writeln!(out, "  src.stylePath  = {}", cfg.src.style_path)?;
    writeln!(out, "  src.scriptPath = {}", cfg.src.script_path)?;
    writeln!(out, "  packagesPath   = {}", cfg.packages_path)?;
    writeln!(out, "  sync           = {}", cfg.sync)?;
    writeln!(out)?;

    for (n, stage) in plan.stages().iter().enumerate() {
        writeln!(out, "stage {}:", n + 1)?;
        for id in stage {
            let action = plan
                .action_of(*id)
                .map(|a| a.to_string())
                .unwrap_or_default();
            writeln!(out, "  - {id}: {action}")?;
            let deps = plan.dependencies_of(*id);
            if !deps.is_empty() {
                let names: Vec<&str> = deps.iter().map(|d| d.name()).collect();
                writeln!(out, "      after: {}", names.join(", "))?;
            }
        }
    }

    if plan.ends_in_watch() {
        writeln!(out, "then: watch {} and {}", cfg.src.style_path, cfg.src.script_path)?;
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
