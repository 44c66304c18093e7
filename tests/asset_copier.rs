// tests/asset_copier.rs

mod common;

use common::{ProjectFixture, TestResult, mock_path, mock_project};

use assetflow::assets::{FileSet, FontGroup, copy_asset_set, copy_font_group};
use assetflow::fs::FileSystem;

#[test]
fn font_groups_land_in_their_own_dist_folders() -> TestResult {
    let project = ProjectFixture::new().with_theme_sources();
    let ctx = project.context();

    for group in FontGroup::ALL {
        copy_font_group(&ctx, group)?;
    }

    assert_eq!(
        project.read("static/fonts/font-awesome/fontawesome-webfont.woff"),
        "FA-WOFF"
    );
    assert_eq!(project.read("static/fonts/ucf-sans-serif-alt/sans.woff"), "SANS");
    assert_eq!(
        project.read("static/fonts/ucf-condensed-alt/condensed.woff"),
        "CONDENSED"
    );
    assert_eq!(project.read("static/fonts/tulia/tulia.woff"), "TULIA");
    Ok(())
}

#[test]
fn generator_config_is_never_copied() -> TestResult {
    let project = ProjectFixture::new().with_theme_sources();
    copy_font_group(&project.context(), FontGroup::SansSerif)?;

    assert!(project.exists("static/fonts/ucf-sans-serif-alt/sans.woff"));
    assert!(!project.exists("static/fonts/ucf-sans-serif-alt/generator_config.txt"));
    Ok(())
}

#[test]
fn missing_vendor_package_copies_nothing() -> TestResult {
    let project = ProjectFixture::new();
    let summary = copy_font_group(&project.context(), FontGroup::Condensed)?;

    assert_eq!(summary.total(), 0);
    assert!(!project.exists("static/fonts/ucf-condensed-alt"));
    Ok(())
}

#[test]
fn second_copy_reports_identical_files_as_unchanged() -> TestResult {
    let project = ProjectFixture::new().with_theme_sources();
    let ctx = project.context();

    let first = copy_font_group(&ctx, FontGroup::FontAwesome)?;
    let second = copy_font_group(&ctx, FontGroup::FontAwesome)?;

    assert_eq!(first.copied.len(), 1);
    assert!(second.copied.is_empty());
    assert_eq!(second.unchanged.len(), 1);
    Ok(())
}

#[test]
fn nested_font_awesome_files_keep_their_relative_path() -> TestResult {
    let (fs, ctx) = mock_project(&[
        ("node_modules/font-awesome/fonts/FontAwesome.otf", "OTF"),
        ("node_modules/font-awesome/fonts/sub/extra.woff2", "WOFF2"),
    ]);

    let summary = copy_font_group(&ctx, FontGroup::FontAwesome)?;

    assert_eq!(summary.copied.len(), 2);
    assert_eq!(
        fs.read_to_string(&mock_path("static/fonts/font-awesome/sub/extra.woff2"))?,
        "WOFF2"
    );
    Ok(())
}

#[test]
fn bytes_are_copied_unchanged() -> TestResult {
    let payload: Vec<u8> = (0u8..=255).collect();
    let (fs, _ctx) = mock_project(&[]);
    fs.add_file(mock_path("vendor/blob.bin"), payload.clone());

    let set = FileSet::new(mock_path("vendor")).include("*");
    copy_asset_set(&*fs, &set, &mock_path("out"))?;

    assert_eq!(fs.read(&mock_path("out/blob.bin"))?, payload);
    Ok(())
}
