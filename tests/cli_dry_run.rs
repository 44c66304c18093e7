// tests/cli_dry_run.rs

mod common;

use std::path::{Path, PathBuf};

use clap::Parser;
use common::TestResult;

use assetflow::cli::CliArgs;
use assetflow::config::BuildConfig;
use assetflow::dag::{TaskId, TaskRegistry};
use assetflow::{config_root_dir, print_dry_run};

#[test]
fn task_defaults_to_default() {
    let args = CliArgs::parse_from(["assetflow"]);
    assert_eq!(args.task, "default");
    assert_eq!(args.config, "assetflow.json");
    assert!(!args.dry_run);
}

#[test]
fn flags_are_parsed() {
    let args = CliArgs::parse_from([
        "assetflow",
        "css",
        "--config",
        "theme/assetflow.json",
        "--log-level",
        "debug",
        "--dry-run",
    ]);
    assert_eq!(args.task, "css");
    assert_eq!(args.config, "theme/assetflow.json");
    assert!(args.log_level.is_some());
    assert!(args.dry_run);
}

#[test]
fn project_root_is_the_config_directory() {
    assert_eq!(
        config_root_dir(Path::new("theme/assetflow.json")),
        PathBuf::from("theme")
    );
    assert!(config_root_dir(Path::new("assetflow.json")).is_absolute());
}

#[test]
fn dry_run_lists_stages_and_watch() -> TestResult {
    let registry = TaskRegistry::standard()?;
    let mut out = Vec::new();

    print_dry_run(&mut out, &BuildConfig::default(), &registry.plan(TaskId::Default)?)?;
    let text = String::from_utf8(out)?;

    assert!(text.contains("assetflow dry-run: default"), "{text}");
    assert!(text.contains("stage 1:"), "{text}");
    assert!(text.contains("  - move-components-fontawesome: copy fonts (font-awesome)"), "{text}");
    assert!(text.contains("stage 3:"), "{text}");
    assert!(text.contains("  - js-build: build script bundle\n      after: es-lint"), "{text}");
    assert!(!text.contains("then: watch"), "{text}");

    let mut out = Vec::new();
    print_dry_run(&mut out, &BuildConfig::default(), &registry.plan(TaskId::Watch)?)?;
    let text = String::from_utf8(out)?;
    assert!(text.contains("then: watch ./src/scss and ./src/js"), "{text}");
    Ok(())
}

#[tokio::test]
async fn unknown_task_fails_before_doing_anything() {
    let args = CliArgs::parse_from(["assetflow", "deploy", "--config", "missing/assetflow.json"]);
    let err = assetflow::run(args).await.expect_err("unknown task");
    assert!(err.to_string().contains("deploy"), "{err}");
}

#[test]
fn log_filter_prefers_flag_then_env() -> TestResult {
    use assetflow::cli::LogLevel;
    use assetflow::logging::build_filter;

    assert_eq!(build_filter(Some(LogLevel::Debug), Some("error"))?.to_string(), "debug");
    assert_eq!(build_filter(None, Some("assetflow=trace"))?.to_string(), "assetflow=trace");
    assert_eq!(build_filter(None, None)?.to_string(), "info");
    assert_eq!(build_filter(None, Some("  "))?.to_string(), "info");
    assert_eq!(build_filter(None, Some("assetflow=loud"))?.to_string(), "info");
    Ok(())
}
