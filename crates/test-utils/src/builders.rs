use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use assetflow::config::{BuildConfig, load_config};
use assetflow::exec::BuildContext;
use assetflow::fs::mock::MockFileSystem;
use tempfile::TempDir;

/// Root used by in-memory fixtures.
pub const MOCK_ROOT: &str = "/project";

/// A theme project in a temporary directory, laid out with the default
/// config paths (`src/scss`, `src/js`, `node_modules`, `static/...`).
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Fixture holding a copy of the directory tree at `source`.
    pub fn copy_of(source: impl AsRef<Path>) -> Self {
        let fixture = Self::new();
        copy_tree(source.as_ref(), fixture.root());
        fixture
    }

    /// Add a file (parent directories are created).
    pub fn file(self, rel: &str, contents: impl AsRef<[u8]>) -> Self {
        self.write(rel, contents);
        self
    }

    /// Write or overwrite a file.
    pub fn write(&self, rel: &str, contents: impl AsRef<[u8]>) {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, contents).expect("write fixture file");
    }

    /// Minimal but complete theme: one stylesheet with a partial, one
    /// script with an include, and one file per vendor font group.
    pub fn with_theme_sources(self) -> Self {
        self.file(
            "src/scss/style.scss",
            "@import \"variables\";\n\n.site-header {\n  color: #333333;\n  user-select: none;\n}\n",
        )
        .file(
            "src/scss/_variables.scss",
            "// brand colour\n.brand {\n  color: #ffcc00;\n}\n",
        )
        .file(
            "src/js/script.js",
            "//= require lib/helpers\n\nfunction init() {\n  helpers.ready();\n}\n\ninit();\n",
        )
        .file(
            "src/js/lib/helpers.js",
            "var helpers = {\n  ready: function () {\n    return true;\n  }\n};\n",
        )
        .file("node_modules/font-awesome/fonts/fontawesome-webfont.woff", b"FA-WOFF")
        .file(
            "node_modules/ucf-athena-framework/dist/fonts/ucf-sans-serif-alt/sans.woff",
            b"SANS",
        )
        .file(
            "node_modules/ucf-athena-framework/dist/fonts/ucf-sans-serif-alt/generator_config.txt",
            b"ignored",
        )
        .file(
            "node_modules/ucf-athena-framework/dist/fonts/ucf-condensed-alt/condensed.woff",
            b"CONDENSED",
        )
        .file(
            "node_modules/ucf-athena-framework/dist/fonts/tulia/tulia.woff",
            b"TULIA",
        )
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).expect("read fixture file")
    }

    /// Config loaded from `assetflow.json` in the root (defaults when absent).
    pub fn config(&self) -> BuildConfig {
        load_config(self.path("assetflow.json")).expect("load fixture config")
    }

    pub fn context(&self) -> BuildContext {
        BuildContext::on_disk(self.root(), self.config())
    }

    pub fn context_with(&self, config: BuildConfig) -> BuildContext {
        BuildContext::on_disk(self.root(), config)
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn copy_tree(from: &Path, to: &Path) {
    fs::create_dir_all(to).expect("create dir");
    for entry in fs::read_dir(from).expect("read fixture source dir") {
        let entry = entry.expect("dir entry");
        let target = to.join(entry.file_name());
        if entry.path().is_dir() {
            copy_tree(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), &target).expect("copy fixture file");
        }
    }
}

/// In-memory project rooted at [`MOCK_ROOT`] with the given files
/// (paths relative to the root).
pub fn mock_project(files: &[(&str, &str)]) -> (Arc<MockFileSystem>, BuildContext) {
    let fs = Arc::new(MockFileSystem::new());
    for (rel, contents) in files {
        fs.add_file(Path::new(MOCK_ROOT).join(rel), *contents);
    }
    let ctx = BuildContext::new(MOCK_ROOT, BuildConfig::default(), fs.clone());
    (fs, ctx)
}
