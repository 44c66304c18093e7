// tests/script_builder.rs

mod common;

use std::path::Path;
use std::sync::Arc;

use common::{ProjectFixture, TestResult, init_tracing, mock_path, mock_project, with_timeout};

use assetflow::dag::{TaskId, TaskRegistry};
use assetflow::engine::Orchestrator;
use assetflow::lint::Severity;
use assetflow::pipeline::{Artifact, Transform};
use assetflow::script::include::{DirectiveKind, parse_directive};
use assetflow::script::lint::{check_script_source, fix_script_source};
use assetflow::script::minify::minify_script;
use assetflow::script::{self, IncludeResolver};

#[test]
fn bundle_inlines_required_files_and_minifies() -> TestResult {
    let project = ProjectFixture::new().with_theme_sources();

    let written = script::build_entry(&project.context())?;

    assert!(written.ends_with("static/js/script.min.js"));
    let js = project.read("static/js/script.min.js");
    let helpers = js.find("var helpers={").ok_or("helpers not inlined")?;
    let init = js.find("function init(){").ok_or("entry body missing")?;
    assert!(helpers < init, "{js}");
    assert!(!js.contains("//="), "directive must be replaced: {js}");
    assert!(js.ends_with("init();\n"), "{js}");
    Ok(())
}

#[test]
fn autofix_rewrites_sources_in_place() -> TestResult {
    let project = ProjectFixture::new()
        .file("src/js/script.js", "var a = 1\nconsole.log(a)   \n")
        .file("src/js/clean.js", "var b = 2;\n");

    let report = script::lint_scripts(&project.context())?;

    assert_eq!(report.files_checked, 2);
    assert_eq!(report.files_fixed.len(), 1);
    assert!(report.files_fixed[0].ends_with("script.js"));
    assert!(report.is_clean(), "{:?}", report.diagnostics);
    assert_eq!(project.read("src/js/script.js"), "var a = 1;\nconsole.log(a);\n");
    assert_eq!(project.read("src/js/clean.js"), "var b = 2;\n");
    Ok(())
}

#[test]
fn unfixable_problems_stay_in_the_report() -> TestResult {
    let project = ProjectFixture::new().file("src/js/script.js", "debugger;\n");

    let report = script::lint_scripts(&project.context())?;

    assert_eq!(report.count("no-debugger"), 1);
    assert_eq!(report.diagnostics[0].severity, Severity::Error);
    assert!(report.files_fixed.is_empty());
    Ok(())
}

#[tokio::test]
async fn js_task_lints_before_bundling() -> TestResult {
    init_tracing();
    let project = ProjectFixture::new().file("src/js/script.js", "var x = 1\n");
    let orchestrator = Orchestrator::new(TaskRegistry::standard()?, Arc::new(project.context()));

    let summary = with_timeout(orchestrator.run_task(TaskId::Js)).await?;

    assert!(summary.is_success(), "{summary:?}");
    assert_eq!(project.read("src/js/script.js"), "var x = 1;\n");
    assert_eq!(project.read("static/js/script.min.js"), "var x=1;\n");
    Ok(())
}

#[test]
fn missing_include_leaves_the_directive_in_place() -> TestResult {
    let (fs, ctx) = mock_project(&[]);
    let resolver = IncludeResolver::new(fs, script::include_paths(&ctx));
    let source = "//= require missing/thing\nvar a = 1;\n";

    let (bundle, unresolved) =
        resolver.expand_source(&mock_path("src/js/script.js"), source)?;

    assert_eq!(bundle, source);
    assert_eq!(unresolved, vec!["missing/thing".to_string()]);
    Ok(())
}

#[test]
fn require_inlines_once_but_include_repeats() -> TestResult {
    let (fs, ctx) = mock_project(&[("src/js/lib/a.js", "A();\n")]);
    let resolver = IncludeResolver::new(fs, script::include_paths(&ctx));
    let entry = mock_path("src/js/script.js");

    let (required, _) =
        resolver.expand_source(&entry, "//= require lib/a\n//= require lib/a\n")?;
    let (included, _) =
        resolver.expand_source(&entry, "//= include lib/a\n//= include lib/a\n")?;

    assert_eq!(required, "A();\n");
    assert_eq!(included, "A();\nA();\n");
    Ok(())
}

#[test]
fn require_tree_inlines_every_script_in_path_order() -> TestResult {
    let (fs, ctx) = mock_project(&[
        ("src/js/parts/b.js", "B();\n"),
        ("src/js/parts/a.js", "A();\n"),
        ("src/js/parts/nested/c.js", "C();\n"),
        ("src/js/parts/readme.txt", "not a script"),
    ]);
    let resolver = IncludeResolver::new(fs, script::include_paths(&ctx));

    let (bundle, _) =
        resolver.expand_source(&mock_path("src/js/script.js"), "//= require_tree parts\n")?;

    assert_eq!(bundle, "A();\nB();\nC();\n");
    Ok(())
}

#[test]
fn includes_fall_back_to_packages_directory() -> TestResult {
    let (fs, ctx) = mock_project(&[(
        "node_modules/jquery/dist/jquery.js",
        "window.jQuery = {};\n",
    )]);
    let resolver = IncludeResolver::new(fs, script::include_paths(&ctx));

    let (bundle, unresolved) = resolver.expand_source(
        &mock_path("src/js/script.js"),
        "//= require jquery/dist/jquery.js\nrun();\n",
    )?;

    assert!(unresolved.is_empty());
    assert_eq!(bundle, "window.jQuery = {};\nrun();\n");
    Ok(())
}

#[test]
fn include_cycle_is_broken_with_a_warning() -> TestResult {
    let (fs, ctx) = mock_project(&[
        ("src/js/a.js", "//= include b\nA();\n"),
        ("src/js/b.js", "//= include a\nB();\n"),
    ]);
    let resolver = IncludeResolver::new(fs, script::include_paths(&ctx));

    let (bundle, _) = resolver.expand_source(&mock_path("src/js/a.js"), "//= include b\nA();\n")?;

    assert_eq!(bundle, "//= include a\nB();\nA();\n");
    Ok(())
}

#[test]
fn directive_parsing() {
    let d = parse_directive("//= require_tree ./modules").expect("directive");
    assert_eq!(d.kind, DirectiveKind::RequireTree);
    assert_eq!(d.reference, "./modules");

    let quoted = parse_directive("  //= include \"vendor/lib.js\"\r\n").expect("directive");
    assert_eq!(quoted.kind, DirectiveKind::Include);
    assert_eq!(quoted.reference, "vendor/lib.js");

    assert!(parse_directive("// require foo").is_none());
    assert!(parse_directive("var x = 1; //= require foo").is_none());
}

#[test]
fn minifier_keeps_literals_and_banners() {
    let source = "/*! theme v1 */\n// setup\nvar s = \"a  b\";   /* gone */\nvar r = /x  y/g;\nvar t = `  keep\n  me`;\n";

    let out = minify_script(source);

    assert!(out.starts_with("/*! theme v1 */\n"), "{out}");
    assert!(out.contains("var s=\"a  b\";"), "{out}");
    assert!(out.contains("var r=/x  y/g;"), "{out}");
    assert!(out.contains("`  keep\n  me`"), "{out}");
    assert!(!out.contains("setup") && !out.contains("gone"), "{out}");
}

#[test]
fn minifier_keeps_line_breaks_between_statements() {
    let out = minify_script("a = 1\nb = 2\n");
    assert_eq!(out, "a=1\nb=2\n");
}

#[test]
fn minify_step_runs_on_artifacts() -> TestResult {
    let out = script::Minify.apply(Artifact::new("x.js", "if (a) {\n  go();\n}\n"))?;
    assert_eq!(out.text()?, "if(a){\ngo();\n}\n");
    Ok(())
}

#[test]
fn semicolon_rule_skips_continued_expressions() {
    let source = "var total = a +\n  b\nfoo(1,\n  2)\nbar()\nif (x) {\n  y = 3\n}\n";
    let diags = check_script_source(Path::new("x.js"), source);

    let semi_lines: Vec<usize> = diags
        .iter()
        .filter(|d| d.rule == "semi")
        .map(|d| d.line)
        .collect();
    assert_eq!(semi_lines, vec![5, 7], "{diags:?}");
}

#[test]
fn fix_keeps_template_whitespace_and_crlf() {
    let template = "var t = `a   \nb`;\n";
    assert_eq!(fix_script_source(template), template);

    let crlf = "var a = 1\r\nvar b = 2;\r\n";
    assert_eq!(fix_script_source(crlf), "var a = 1;\r\nvar b = 2;\r\n");
}

#[test]
fn fix_adds_missing_final_newline() {
    assert_eq!(fix_script_source("go();"), "go();\n");
    let diags = check_script_source(Path::new("x.js"), "go();");
    assert!(diags.iter().any(|d| d.rule == "eol-last"));
}

#[cfg(unix)]
#[test]
fn configured_transpiler_is_piped_through() -> TestResult {
    let project = ProjectFixture::new()
        .file("src/js/script.js", "var loud = 1;\n")
        .file("assetflow.json", r#"{ "tools": { "transpiler": "tr a-z A-Z" } }"#);

    script::build_entry(&project.context())?;

    assert_eq!(project.read("static/js/script.min.js"), "VAR LOUD=1;\n");
    Ok(())
}
