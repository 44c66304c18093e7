// tests/style_builder.rs

mod common;

use common::{ProjectFixture, TestResult, mock_path, mock_project};

use assetflow::fs::FileSystem;
use assetflow::livesync::{LiveSyncHandle, Notification};
use assetflow::pipeline::{Artifact, Transform, TransformError};
use assetflow::style::css::encode_version;
use assetflow::style::lint::lint_style_source;
use assetflow::style::{self, ImportInliner, Minify, Prefix, SassCompile, StyleEntry};

#[test]
fn theme_stylesheet_is_compiled_minified_and_prefixed() -> TestResult {
    let project = ProjectFixture::new().with_theme_sources();
    let ctx = project.context();

    let written = style::build_entry(&ctx, StyleEntry::ThemeCss)?;

    assert!(written.ends_with("static/css/style.min.css"));
    let css = project.read("static/css/style.min.css");
    assert!(css.contains(".brand{color:#fc0}"), "{css}");
    assert!(css.contains(".site-header{"), "{css}");
    assert!(css.contains("-webkit-user-select:none"), "{css}");
    assert!(!css.contains("brand colour"), "line comment must be gone: {css}");
    Ok(())
}

#[test]
fn unresolved_import_fails_with_a_located_diagnostic() {
    let project = ProjectFixture::new().file(
        "src/scss/style.scss",
        "body { margin: 0; }\n@import \"does-not-exist\";\n",
    );

    let err = style::build_entry(&project.context(), StyleEntry::ThemeCss)
        .expect_err("missing partial must fail the build");
    let message = format!("{err:#}");

    assert!(message.contains("can't find 'does-not-exist'"), "{message}");
    assert!(message.contains("style.scss:2"), "{message}");
    assert_eq!(message.matches("can't find").count(), 1, "{message}");
    assert!(!project.exists("static/css/style.min.css"));
}

#[test]
fn partials_resolve_from_own_dir_then_include_paths() -> TestResult {
    let (fs, ctx) = mock_project(&[
        (
            "src/scss/style.scss",
            "@import \"partials/buttons\", \"grid\";\n@import url(print.css);\n.x { top: 0; }\n",
        ),
        ("src/scss/partials/_buttons.scss", ".btn { color: red; }\n"),
        (
            "node_modules/ucf-athena-framework/src/scss/_grid.scss",
            ".row { display: flex; }\n",
        ),
    ]);

    let inliner = ImportInliner::new(fs.clone(), style::include_paths(&ctx));
    let entry = mock_path("src/scss/style.scss");
    let input = Artifact::read(&*fs, &entry)?;
    let output = inliner.apply(input)?;
    let text = output.text()?;

    let btn = text.find(".btn").ok_or("buttons partial not inlined")?;
    let row = text.find(".row").ok_or("vendor partial not inlined")?;
    let x = text.find(".x").ok_or("entry body missing")?;
    assert!(btn < row && row < x, "imports must be inlined in order: {text}");
    assert!(text.contains("@import url(print.css);"), "{text}");
    Ok(())
}

#[test]
fn import_cycle_is_reported() {
    let (fs, ctx) = mock_project(&[
        ("src/scss/style.scss", "@import \"a\";\n"),
        ("src/scss/_a.scss", "@import \"b\";\n"),
        ("src/scss/_b.scss", "@import \"a\";\n"),
    ]);

    let inliner = ImportInliner::new(fs.clone(), style::include_paths(&ctx));
    let entry = mock_path("src/scss/style.scss");
    let input = Artifact::new(entry.display().to_string(), "@import \"a\";\n");
    let err = inliner.apply(input).expect_err("cycle must be rejected");

    match err {
        TransformError::Message { message, .. } => {
            assert!(message.contains("import cycle"), "{message}")
        }
        other => panic!("expected a cycle message, got {other:?}"),
    }
}

#[test]
fn invalid_selector_reports_the_source_line() {
    let input = Artifact::new("broken.css", "a { color: red; }\n\n..bad { color: red; }\n");
    let err = Minify.apply(input).expect_err("invalid selector");

    match err {
        TransformError::Located { file, line, .. } => {
            assert_eq!(file, "broken.css");
            assert_eq!(line, 3);
        }
        other => panic!("expected a located error, got {other:?}"),
    }
}

#[test]
fn prefix_respects_configured_browsers() -> TestResult {
    let modern = [("chrome".to_string(), "120".to_string())].into_iter().collect();
    let legacy = [("safari".to_string(), "8".to_string())].into_iter().collect();
    let css = ".a{user-select:none}";

    let out_modern = Prefix::from_config(&modern)?.apply(Artifact::new("a.css", css))?;
    let out_legacy = Prefix::from_config(&legacy)?.apply(Artifact::new("a.css", css))?;

    assert!(!out_modern.text()?.contains("-webkit-user-select"));
    assert!(out_legacy.text()?.contains("-webkit-user-select"));
    Ok(())
}

#[test]
fn browser_versions_are_encoded_for_lightningcss() {
    assert_eq!(encode_version("49"), Some(49 << 16));
    assert_eq!(encode_version("10.1"), Some((10 << 16) | (1 << 8)));
    assert_eq!(encode_version("not-a-version"), None);
    assert_eq!(encode_version("300"), None);
}

#[test]
fn malformed_browser_version_is_a_config_error() {
    let bad = [("safari".to_string(), "ten".to_string())].into_iter().collect();
    assert!(Prefix::from_config(&bad).is_err());
}

#[test]
fn lint_reports_without_touching_sources() -> TestResult {
    let source = ".a {\n  margin: 0px; \n  color: red !important;\n  /* padding: 0em; */\n}";
    let project = ProjectFixture::new().file("src/scss/style.scss", source);

    let report = style::lint_styles(&project.context())?;

    assert_eq!(report.files_checked, 1);
    assert_eq!(report.count("zero-unit"), 1);
    assert_eq!(report.count("trailing-whitespace"), 1);
    assert_eq!(report.count("important"), 1);
    assert_eq!(report.count("final-newline"), 1);
    assert!(report.files_fixed.is_empty());
    assert_eq!(project.read("src/scss/style.scss"), source);
    Ok(())
}

#[test]
fn lint_ignores_partials_in_subfolders() -> TestResult {
    let project = ProjectFixture::new()
        .file("src/scss/style.scss", ".a {\n  color: red;\n}\n")
        .file("src/scss/partials/_bad.scss", ".b { margin: 0px; }");

    let report = style::lint_styles(&project.context())?;

    assert_eq!(report.files_checked, 1);
    assert!(report.is_clean(), "{:?}", report.diagnostics);
    Ok(())
}

#[test]
fn zero_unit_rule_skips_non_zero_values() {
    let diags = lint_style_source(
        std::path::Path::new("x.scss"),
        ".a {\n  margin: 10px 0.5em 0;\n  width: 100px;\n}\n",
    );
    assert!(diags.is_empty(), "{diags:?}");
}

#[tokio::test]
async fn successful_build_injects_css_into_live_sync_clients() -> TestResult {
    let project = ProjectFixture::new().with_theme_sources();
    let sync = LiveSyncHandle::start("http://localhost/")?;
    let mut client = sync.subscribe();
    let ctx = project.context().with_live_sync(sync.clone());

    let written = style::build_entry(&ctx, StyleEntry::ThemeCss)?;

    match client.try_recv()? {
        Notification::InjectCss { path } => assert_eq!(path, written.to_string_lossy()),
        other => panic!("expected InjectCss, got {other:?}"),
    }
    Ok(())
}

#[test]
fn build_writes_into_configured_dist_path() -> TestResult {
    let project = ProjectFixture::new()
        .with_theme_sources()
        .file("assetflow.json", r#"{ "dist": { "cssPath": "./public/styles" } }"#);

    style::build_entry(&project.context(), StyleEntry::ThemeCss)?;

    assert!(project.exists("public/styles/style.min.css"));
    assert!(!project.exists("static/css/style.min.css"));
    Ok(())
}

#[test]
fn build_on_mock_filesystem_writes_artifact() -> TestResult {
    let (fs, ctx) = mock_project(&[("src/scss/style.scss", "a { color: #ffffff; }\n")]);

    style::build_entry(&ctx, StyleEntry::ThemeCss)?;

    let css = fs.read_to_string(&mock_path("static/css/style.min.css"))?;
    assert_eq!(css, "a{color:#fff}");
    Ok(())
}

#[test]
fn commented_out_import_is_not_resolved() -> TestResult {
    let (fs, ctx) = mock_project(&[(
        "src/scss/style.scss",
        "/* @import \"old-grid\"; */\n.a { color: red; }\n",
    )]);

    style::build_entry(&ctx, StyleEntry::ThemeCss)?;

    let css = fs.read_to_string(&mock_path("static/css/style.min.css"))?;
    assert_eq!(css, ".a{color:red}");
    Ok(())
}

#[test]
fn import_text_inside_strings_and_comments_is_kept() -> TestResult {
    let (fs, ctx) = mock_project(&[("src/scss/_real.scss", ".real { top: 0; }\n")]);
    let source = ".q::before { content: \"@import 'x';\"; }\n/*\n@import \"gone\";\n*/\n@import \"real\";\n";

    let inliner = ImportInliner::new(fs.clone(), style::include_paths(&ctx));
    let entry = mock_path("src/scss/style.scss");
    let output = inliner.apply(Artifact::new(entry.display().to_string(), source))?;
    let text = output.text()?;

    assert!(text.contains("content: \"@import 'x';\""), "{text}");
    assert!(text.contains("@import \"gone\";"), "{text}");
    assert!(text.contains(".real { top: 0; }"), "{text}");
    Ok(())
}

#[test]
fn scss_variables_nesting_and_mixins_compile() -> TestResult {
    let (fs, ctx) = mock_project(&[(
        "src/scss/style.scss",
        "$brand: #fc0;\n@mixin flat { border: 0; }\n.a {\n  color: $brand;\n  .b { color: red; }\n}\n.c { @include flat; }\n",
    )]);

    style::build_entry(&ctx, StyleEntry::ThemeCss)?;

    let css = fs.read_to_string(&mock_path("static/css/style.min.css"))?;
    assert!(css.contains(".a{color:#fc0}"), "{css}");
    assert!(css.contains(".a .b{color:red}"), "{css}");
    assert!(css.contains(".c{border:0}"), "{css}");
    assert!(!css.contains('$'), "{css}");
    Ok(())
}

#[test]
fn variables_from_an_imported_partial_are_in_scope() -> TestResult {
    let project = ProjectFixture::new()
        .file("src/scss/_tokens.scss", "$gap: 4px;\n")
        .file("src/scss/style.scss", "@import \"tokens\";\n.g { margin: $gap; }\n");

    style::build_entry(&project.context(), StyleEntry::ThemeCss)?;

    assert_eq!(project.read("static/css/style.min.css"), ".g{margin:4px}");
    Ok(())
}

#[test]
fn undefined_variable_fails_the_compile_step() {
    let (_fs, ctx) = mock_project(&[("src/scss/style.scss", ".a { color: $nope; }\n")]);

    let err = style::build_entry(&ctx, StyleEntry::ThemeCss).expect_err("undefined variable");
    let message = format!("{err:#}");

    assert!(message.contains("step 'compile' failed"), "{message}");
    assert!(message.contains("Undefined variable"), "{message}");
}

#[test]
fn sass_step_passes_plain_css_through() -> TestResult {
    let (fs, ctx) = mock_project(&[]);
    let compile = SassCompile::new(fs, style::include_paths(&ctx));

    let output = compile.apply(Artifact::new("plain.css", ".x { top: 0; }\n"))?;

    assert!(output.text()?.contains(".x {"), "{}", output.text()?);
    assert_eq!(compile.name(), "compile");
    Ok(())
}
