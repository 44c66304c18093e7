// tests/config_merge.rs

mod common;

use common::{ProjectFixture, TestResult};

use assetflow::config::{BuildConfig, load_config, merge, merge_values};
use assetflow::errors::AssetflowError;
use proptest::prelude::*;
use serde_json::{Value, json};

#[test]
fn missing_override_file_yields_defaults() -> TestResult {
    let project = ProjectFixture::new();
    let cfg = load_config(project.path("assetflow.json"))?;
    assert_eq!(cfg, BuildConfig::default());
    assert_eq!(cfg.src.style_path, "./src/scss");
    assert_eq!(cfg.dist.font_path, "./static/fonts");
    assert_eq!(cfg.vendor.font_path, "/ucf-athena-framework/dist/fonts");
    assert!(!cfg.sync);
    Ok(())
}

#[test]
fn nested_override_keeps_sibling_defaults() -> TestResult {
    let cfg = merge(
        &BuildConfig::default(),
        Some(json!({ "dist": { "cssPath": "./public/css" }, "sync": true })),
    )?;

    assert_eq!(cfg.dist.css_path, "./public/css");
    assert_eq!(cfg.dist.script_path, "./static/js");
    assert_eq!(cfg.dist.font_path, "./static/fonts");
    assert!(cfg.sync);
    assert_eq!(cfg.sync_target, "http://localhost/");
    Ok(())
}

#[test]
fn legacy_names_are_accepted() -> TestResult {
    let cfg = merge(
        &BuildConfig::default(),
        Some(json!({
            "src": { "scssPath": "./assets/scss", "jsPath": "./assets/js" },
            "athena": { "fontPath": "/athena/fonts" }
        })),
    )?;

    assert_eq!(cfg.src.style_path, "./assets/scss");
    assert_eq!(cfg.src.script_path, "./assets/js");
    assert_eq!(cfg.vendor.font_path, "/athena/fonts");
    assert_eq!(cfg.vendor.style_path, "/ucf-athena-framework/src/scss");
    Ok(())
}

#[test]
fn canonical_name_wins_over_legacy_alias() -> TestResult {
    let cfg = merge(
        &BuildConfig::default(),
        Some(json!({ "src": { "scssPath": "./old", "stylePath": "./new" } })),
    )?;
    assert_eq!(cfg.src.style_path, "./new");
    Ok(())
}

#[test]
fn null_keeps_the_default() -> TestResult {
    let cfg = merge(
        &BuildConfig::default(),
        Some(json!({ "packagesPath": null, "dist": null })),
    )?;
    assert_eq!(cfg, BuildConfig::default());
    Ok(())
}

#[test]
fn wrong_value_types_propagate_instead_of_failing() -> TestResult {
    let cfg = merge(
        &BuildConfig::default(),
        Some(json!({
            "dist": { "cssPath": 5, "fontPath": true },
            "sync": "yes",
            "browsers": { "safari": 9 },
            "tools": { "transpiler": 7 }
        })),
    )?;

    assert_eq!(cfg.dist.css_path, "5");
    assert_eq!(cfg.dist.font_path, "true");
    assert_eq!(cfg.dist.script_path, "./static/js");
    assert!(cfg.sync);
    assert_eq!(cfg.browsers.get("safari").map(String::as_str), Some("9"));
    assert_eq!(cfg.tools.transpiler.as_deref(), Some("7"));
    Ok(())
}

#[test]
fn falsy_values_turn_sync_off() -> TestResult {
    for value in [json!(0), json!(""), json!(false)] {
        let cfg = merge(&BuildConfig::default(), Some(json!({ "sync": value })))?;
        assert!(!cfg.sync, "{value}");
    }
    Ok(())
}

#[test]
fn non_object_section_keeps_section_defaults() -> TestResult {
    let cfg = merge(
        &BuildConfig::default(),
        Some(json!({ "dist": 5, "src": { "stylePath": "./styles" } })),
    )?;
    assert_eq!(cfg.dist, BuildConfig::default().dist);
    assert_eq!(cfg.src.style_path, "./styles");
    Ok(())
}

#[test]
fn wrong_typed_path_surfaces_only_in_the_builder_that_uses_it() -> TestResult {
    let project = ProjectFixture::new()
        .with_theme_sources()
        .file("assetflow.json", r#"{ "dist": { "cssPath": 5 } }"#);

    let cfg = project.config();
    assert_eq!(cfg.dist.css_path, "5");

    assetflow::script::build_entry(&project.context())?;
    assert!(project.exists("static/js/script.min.js"));
    Ok(())
}

#[test]
fn non_object_override_is_rejected() {
    let err = merge(&BuildConfig::default(), Some(json!([1, 2, 3])))
        .expect_err("array override must be rejected");
    assert!(matches!(err, AssetflowError::ConfigError(_)), "got {err:?}");
}

#[test]
fn malformed_json_names_the_file() {
    let project = ProjectFixture::new().file("assetflow.json", "{ \"sync\": ");
    let err = load_config(project.path("assetflow.json")).expect_err("invalid JSON");
    match err {
        AssetflowError::ConfigError(msg) => assert!(msg.contains("assetflow.json"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn browsers_map_is_merged_key_by_key() -> TestResult {
    let cfg = merge(
        &BuildConfig::default(),
        Some(json!({ "browsers": { "safari": "12" } })),
    )?;
    assert_eq!(cfg.browsers.get("safari").map(String::as_str), Some("12"));
    assert_eq!(cfg.browsers.get("chrome").map(String::as_str), Some("49"));
    Ok(())
}

fn json_object() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        proptest::collection::btree_map("[a-d]", inner, 0..4)
            .prop_map(|m| Value::Object(m.into_iter().collect()))
    })
    .prop_map(|v| match v {
        Value::Object(_) => v,
        other => json!({ "k": other }),
    })
}

proptest! {
    #[test]
    fn merging_the_same_overlay_twice_is_idempotent(base in json_object(), overlay in json_object()) {
        let mut once = base.clone();
        merge_values(&mut once, overlay.clone());
        let mut twice = once.clone();
        merge_values(&mut twice, overlay);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn any_scalar_path_override_is_accepted(leaf in prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z./]{0,8}".prop_map(Value::String),
    ]) {
        let expected = assetflow::config::lenient::text_of(leaf.clone());
        let cfg = merge(&BuildConfig::default(), Some(json!({ "dist": { "cssPath": leaf } })));
        prop_assert!(cfg.is_ok());
        if let Ok(cfg) = cfg {
            prop_assert_eq!(cfg.dist.css_path, expected);
        }
    }

    #[test]
    fn merging_an_empty_object_changes_nothing(base in json_object()) {
        let mut merged = base.clone();
        merge_values(&mut merged, json!({}));
        prop_assert_eq!(merged, base);
    }
}
