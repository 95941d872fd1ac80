//! `quarry build` — the incremental metadata extraction pipeline.
//!
//! The full pipeline:
//!
//! 1. Find project root (walk up looking for `quarry.toml`)
//! 2. Load config via `quarry_config` and resolve the selected targets
//! 3. Run the build pipeline (expansion, staleness, fan-out, merge)
//! 4. Render accumulated diagnostics to the terminal

use std::path::PathBuf;
use std::sync::Arc;

use quarry_build::{BuildOptions, BuildPipeline};
use quarry_diagnostics::{DiagnosticRenderer, DiagnosticSink, Severity, TerminalRenderer};
use quarry_extract::CSharpExtractor;
use quarry_workspace::FsWorkspaceLoader;

use crate::project::resolve_project_root;
use crate::{BuildArgs, GlobalArgs};

/// Runs the `quarry build` command.
///
/// Returns exit code 0 when every selected target succeeded, 1 otherwise.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = quarry_config::load_config(&project_dir)?;
    let selected = quarry_config::resolve_targets(&config, args.target.as_deref())?;

    if !global.quiet {
        eprintln!(
            "   Building {} v{}",
            config.project.name, config.project.version
        );
    }

    let raw_targets: Vec<(String, Vec<PathBuf>)> = selected
        .iter()
        .map(|(name, target)| {
            (
                name.to_string(),
                target
                    .inputs
                    .iter()
                    .map(|input| project_dir.join(input))
                    .collect(),
            )
        })
        .collect();

    let sink = Arc::new(DiagnosticSink::new());
    let pipeline = BuildPipeline::new(
        Arc::new(FsWorkspaceLoader),
        Arc::new(CSharpExtractor),
        Arc::clone(&sink),
        BuildOptions {
            output_root: project_dir.join(&config.build.output),
            cache_root: project_dir.join(&config.build.cache),
            concurrency: config.build.concurrency,
            force: args.force,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        },
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let summary = runtime.block_on(pipeline.build_all(&raw_targets));

    render_diagnostics(&sink, global);

    Ok(if summary.has_failures() { 1 } else { 0 })
}

/// Renders accumulated diagnostics to stderr, filtered by verbosity.
///
/// Quiet shows only errors; the default shows success and worse; verbose
/// shows everything. Returns the number of diagnostics rendered.
pub fn render_diagnostics(sink: &DiagnosticSink, global: &GlobalArgs) -> usize {
    let minimum = if global.quiet {
        Severity::Error
    } else if global.verbose {
        Severity::Info
    } else {
        Severity::Success
    };

    let renderer = TerminalRenderer::new(global.color);
    let mut rendered = 0;
    for diag in sink.take_all() {
        if diag.severity < minimum {
            continue;
        }
        eprint!("{}", renderer.render(&diag));
        rendered += 1;
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_diagnostics::{Category, Diagnostic, DiagnosticCode};

    fn make_global(quiet: bool, verbose: bool) -> GlobalArgs {
        GlobalArgs {
            quiet,
            verbose,
            color: false,
            config: None,
        }
    }

    fn sink_with_one_of_each() -> DiagnosticSink {
        let sink = DiagnosticSink::new();
        let code = DiagnosticCode::new(Category::Build, 1);
        sink.emit(Diagnostic::info(code, "info"));
        sink.emit(Diagnostic::success(code, "success"));
        sink.emit(Diagnostic::warning(code, "warning"));
        sink.emit(Diagnostic::error(code, "error"));
        sink
    }

    #[test]
    fn default_filter_hides_info() {
        let sink = sink_with_one_of_each();
        assert_eq!(render_diagnostics(&sink, &make_global(false, false)), 3);
    }

    #[test]
    fn quiet_shows_only_errors() {
        let sink = sink_with_one_of_each();
        assert_eq!(render_diagnostics(&sink, &make_global(true, false)), 1);
    }

    #[test]
    fn verbose_shows_everything() {
        let sink = sink_with_one_of_each();
        assert_eq!(render_diagnostics(&sink, &make_global(false, true)), 4);
    }
}
