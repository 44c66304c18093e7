// src/script/mod.rs

//! Script builder: lint with autofix, bundle includes, transpile, minify.

pub mod include;
pub mod lexer;
pub mod lint;
pub mod minify;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::assets::FileSet;
use crate::exec::context::BuildContext;
use crate::lint::LintReport;
use crate::pipeline::external::ExternalFilter;
use crate::pipeline::{Artifact, Pipeline, Rename, Transform, TransformError, write_artifact};

pub use include::IncludeResolver;
pub use minify::Minify;

/// Script entry point, relative to `src.scriptPath`.
pub const SCRIPT_ENTRY: &str = "script.js";
/// Output file name of the script bundle.
pub const SCRIPT_OUTPUT: &str = "script.min.js";

/// Transpile step used when no external transpiler is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl Transform for PassThrough {
    fn name(&self) -> &str {
        "transpile"
    }

    fn apply(&self, input: Artifact) -> Result<Artifact, TransformError> {
        Ok(input)
    }
}

/// Directories searched for include references, after the including file's
/// own directory.
pub fn include_paths(ctx: &BuildContext) -> Vec<PathBuf> {
    vec![
        ctx.packages_dir(),
        ctx.script_src_dir(),
        ctx.vendor_script_dir(),
    ]
}

/// include -> transpile -> minify -> rename.
pub fn script_pipeline(ctx: &BuildContext, output_name: &str) -> Pipeline {
    let pipeline =
        Pipeline::new().then(IncludeResolver::new(ctx.fs.clone(), include_paths(ctx)));
    let pipeline = match &ctx.config.tools.transpiler {
        Some(cmd) if !cmd.trim().is_empty() => pipeline.then(ExternalFilter::new("transpile", cmd)),
        _ => pipeline.then(PassThrough),
    };
    pipeline.then(Minify).then(Rename::new(output_name))
}

/// Bundle `entry` into `dest/output_name`.
pub fn build_script(
    ctx: &BuildContext,
    entry: &Path,
    output_name: &str,
    dest: &Path,
) -> Result<PathBuf> {
    let input = Artifact::read(ctx.fs.as_ref(), entry)
        .with_context(|| format!("reading script entry {entry:?}"))?;
    let output = script_pipeline(ctx, output_name).run(input)?;
    let written = write_artifact(ctx.fs.as_ref(), dest, &output)?;
    info!(entry = ?entry, artifact = ?written, "script bundle built");
    Ok(written)
}

/// Build the theme bundle into `dist.scriptPath`.
pub fn build_entry(ctx: &BuildContext) -> Result<PathBuf> {
    let source = ctx.script_src_dir().join(SCRIPT_ENTRY);
    build_script(ctx, &source, SCRIPT_OUTPUT, &ctx.script_dest_dir())
}

/// Top-level scripts checked by [`lint_scripts`].
pub fn lint_set(ctx: &BuildContext) -> FileSet {
    FileSet::new(ctx.script_src_dir()).include("*.js")
}

/// Lint every top-level script, rewriting fixable problems in place.
///
/// A file is written back only when fixing changed it. The report lists
/// what is left after fixing.
pub fn lint_scripts(ctx: &BuildContext) -> Result<LintReport> {
    let mut report = LintReport::default();
    for file in lint_set(ctx).resolve(ctx.fs.as_ref())? {
        let source = ctx
            .fs
            .read_to_string(&file.path)
            .with_context(|| format!("reading {:?}", file.path))?;

        let fixed = lint::fix_script_source(&source);
        if fixed != source {
            ctx.fs
                .write(&file.path, fixed.as_bytes())
                .with_context(|| format!("writing fixes to {:?}", file.path))?;
            ctx.source_writes.record(file.path.clone());
            info!(file = ?file.path, "applied lint fixes");
            report.files_fixed.push(file.path.clone());
        }

        report
            .diagnostics
            .extend(lint::check_script_source(&file.path, &fixed));
        report.files_checked += 1;
    }
    report.log("es-lint");
    Ok(report)
}
