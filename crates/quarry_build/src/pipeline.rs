//! The build pipeline: discovery, staleness, extraction fan-out, merge,
//! and cache writeback.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};

use quarry_cache::{
    scope_key, target_is_stale, unit_is_stale, ArtifactStore, BuildCache, BuildInfo,
};
use quarry_common::CanonicalPath;
use quarry_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use quarry_extract::{CompileRequest, CompilerService};
use quarry_metadata::{merge_units, UnitMetadata};
use quarry_workspace::{
    classify, expand_project, expand_solution, group_sources, normalize_targets, InputKind,
    InputTarget, ProjectHandle, ProjectRegistry, SourceFileGroup, SourceLanguage, WorkspaceLoader,
};

use crate::copy::copy_outputs;
use crate::error::BuildError;
use crate::output::write_outputs;

/// Settings for one run of the pipeline.
pub struct BuildOptions {
    /// Root folder receiving one subfolder per target.
    pub output_root: PathBuf,
    /// Root folder of the two cache tiers.
    pub cache_root: PathBuf,
    /// Maximum number of concurrently processed units.
    pub concurrency: usize,
    /// Bypass both cache tiers and rebuild everything.
    pub force: bool,
    /// Tool version stamped into cache indexes and artifacts.
    pub tool_version: String,
}

/// How one target's build ended.
#[derive(Debug, PartialEq, Eq)]
pub enum TargetOutcome {
    /// The target was (re)built.
    Built {
        /// Units contributing metadata to the merge.
        units: usize,
        /// Units extracted by the compiler service.
        compiled: usize,
        /// Units deserialized from the project-level cache.
        reused: usize,
    },
    /// Nothing changed; previous outputs were copied into place.
    UpToDate,
}

/// Counts of per-target outcomes for one run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Targets that were rebuilt.
    pub built: usize,
    /// Targets satisfied by the application-level cache.
    pub up_to_date: usize,
    /// Targets that failed.
    pub failed: usize,
}

impl RunSummary {
    /// Returns `true` if any target failed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// One dispatchable compilation unit.
#[derive(Clone)]
enum Unit {
    /// A registered project with its dependency file list.
    Project {
        handle: ProjectHandle,
        files: Vec<String>,
    },
    /// A group of same-language standalone source files.
    Group(SourceFileGroup),
}

impl Unit {
    fn key(&self) -> String {
        match self {
            Unit::Project { handle, .. } => handle.path.key(),
            Unit::Group(group) => group.unit_key(),
        }
    }

    fn files(&self) -> Vec<String> {
        match self {
            Unit::Project { files, .. } => files.clone(),
            Unit::Group(group) => group.document_set().to_vec(),
        }
    }

    fn display_path(&self) -> PathBuf {
        match self {
            Unit::Project { handle, .. } => handle.path.as_path().to_path_buf(),
            Unit::Group(group) => PathBuf::from(group.unit_key()),
        }
    }

    fn request(&self) -> CompileRequest {
        match self {
            Unit::Project { handle, .. } => CompileRequest {
                unit: handle.path.key(),
                language: SourceLanguage::CSharp,
                documents: handle
                    .documents
                    .iter()
                    .map(|d| d.as_path().to_path_buf())
                    .collect(),
            },
            Unit::Group(group) => CompileRequest {
                unit: group.unit_key(),
                language: group.language,
                documents: group
                    .files
                    .iter()
                    .map(|f| f.as_path().to_path_buf())
                    .collect(),
            },
        }
    }
}

/// Drives target builds against injected collaborators.
pub struct BuildPipeline {
    loader: Arc<dyn WorkspaceLoader>,
    compiler: Arc<dyn CompilerService>,
    sink: Arc<DiagnosticSink>,
    options: BuildOptions,
}

impl BuildPipeline {
    /// Creates a pipeline over the given collaborators.
    pub fn new(
        loader: Arc<dyn WorkspaceLoader>,
        compiler: Arc<dyn CompilerService>,
        sink: Arc<DiagnosticSink>,
        options: BuildOptions,
    ) -> Self {
        Self {
            loader,
            compiler,
            sink,
            options,
        }
    }

    /// Builds every raw target, absorbing per-target failures.
    ///
    /// The cache tiers are opened once at run start and flushed once after
    /// the last target. A target failure is reported as an error
    /// diagnostic and counted; it never aborts the remaining targets.
    pub async fn build_all(&self, raw_targets: &[(String, Vec<PathBuf>)]) -> RunSummary {
        let targets = normalize_targets(raw_targets, &self.sink);
        let cache = Arc::new(BuildCache::open(
            &self.options.cache_root,
            &self.options.tool_version,
        ));

        let mut summary = RunSummary::default();
        for target in &targets {
            self.sink.emit(Diagnostic::info(
                DiagnosticCode::new(Category::Build, 100),
                format!("building target '{}'", target.name),
            ));
            match self.build_target(&cache, target).await {
                Ok(TargetOutcome::Built {
                    units,
                    compiled,
                    reused,
                }) => {
                    summary.built += 1;
                    self.sink.emit(Diagnostic::success(
                        DiagnosticCode::new(Category::Build, 101),
                        format!(
                            "target '{}': {units} units ({compiled} extracted, {reused} from cache)",
                            target.name
                        ),
                    ));
                }
                Ok(TargetOutcome::UpToDate) => {
                    summary.up_to_date += 1;
                    self.sink.emit(Diagnostic::success(
                        DiagnosticCode::new(Category::Build, 102),
                        format!("target '{}' is up to date; reused previous outputs", target.name),
                    ));
                }
                Err(err) => {
                    summary.failed += 1;
                    self.sink.emit(Diagnostic::error(
                        DiagnosticCode::new(Category::Build, 501),
                        err.to_string(),
                    ));
                }
            }
        }

        if let Err(err) = cache.flush() {
            self.sink.emit(Diagnostic::warning(
                DiagnosticCode::new(Category::Cache, 304),
                format!("failed to persist cache index: {err}"),
            ));
        }
        summary
    }

    /// Builds one target end to end.
    async fn build_target(
        &self,
        cache: &Arc<BuildCache>,
        target: &InputTarget,
    ) -> Result<TargetOutcome, BuildError> {
        // Sampled before any extraction work: an edit racing this build
        // will be at or after this instant and so forces a rebuild later.
        let triggered = Utc::now();
        let out_dir = self.options.output_root.join(&target.name);

        let mut solutions = Vec::new();
        let mut projects = Vec::new();
        let mut sources = Vec::new();
        for input in &target.inputs {
            match classify(input.as_path()) {
                InputKind::Solution => solutions.push(input.clone()),
                InputKind::Project => projects.push(input.clone()),
                InputKind::Source(language) => sources.push((input.clone(), language)),
                InputKind::Unsupported => {}
            }
        }

        // Discovery: solutions first so explicitly listed projects that
        // are also solution members register only once.
        let registry = Arc::new(ProjectRegistry::new());
        self.run_discovery(&solutions, true, &registry).await?;
        self.run_discovery(&projects, false, &registry).await?;

        let groups = group_sources(&sources);
        let project_units = registry.units();
        if project_units.is_empty() && groups.is_empty() {
            return Err(BuildError::NoValidInput {
                target: target.name.clone(),
            });
        }

        let mut contained = registry.contained_files();
        for group in &groups {
            contained.insert(group.unit_key(), group.document_set().to_vec());
        }

        // Application-level short-circuit: an unmodified target costs an
        // artifact copy, not a recompilation.
        let input_keys = target.input_keys();
        let app_key = scope_key(input_keys.iter().map(String::as_str));
        if !self.options.force {
            if let Some(previous) = cache.application.get(&app_key) {
                if !target_is_stale(&previous, &contained) {
                    match copy_outputs(
                        &previous.relative_output_files,
                        &previous.output_folder,
                        &out_dir,
                        true,
                    ) {
                        Ok(_) => return Ok(TargetOutcome::UpToDate),
                        Err(err) => {
                            self.sink.emit(
                                Diagnostic::warning(
                                    DiagnosticCode::new(Category::Cache, 302),
                                    format!("previous outputs unavailable, rebuilding: {err}"),
                                )
                                .with_source(previous.output_folder.clone()),
                            );
                        }
                    }
                }
            }
        }

        // Extraction fan-out over an unordered worklist; the merge is
        // order-independent, so completion order does not matter.
        let mut units: Vec<Unit> = Vec::with_capacity(project_units.len() + groups.len());
        for handle in project_units {
            let files = contained[&handle.path.key()].clone();
            units.push(Unit::Project { handle, files });
        }
        units.extend(groups.into_iter().map(Unit::Group));

        let worker_results = stream::iter(units.into_iter().map(|unit| {
            let cache = Arc::clone(cache);
            let compiler = Arc::clone(&self.compiler);
            let sink = Arc::clone(&self.sink);
            let force = self.options.force;
            let tool_version = self.options.tool_version.clone();
            async move {
                tokio::task::spawn_blocking(move || {
                    process_unit(
                        &unit,
                        &cache,
                        compiler.as_ref(),
                        &sink,
                        triggered,
                        force,
                        &tool_version,
                    )
                })
                .await
            }
        }))
        .buffer_unordered(self.options.concurrency)
        .collect::<Vec<_>>()
        .await;

        let mut extracted = Vec::new();
        let mut compiled = 0;
        let mut reused = 0;
        for result in worker_results {
            let (metadata, was_compiled) = result.map_err(|e| BuildError::Worker {
                message: e.to_string(),
            })?;
            if let Some(metadata) = metadata {
                if was_compiled {
                    compiled += 1;
                } else {
                    reused += 1;
                }
                extracted.push(metadata);
            }
        }
        let units = extracted.len();

        let merged = merge_units(extracted, &self.sink);
        let relative_output_files = write_outputs(&out_dir, &merged)?;

        cache.application.put(
            app_key,
            BuildInfo::new(
                triggered,
                input_keys,
                contained,
                out_dir,
                relative_output_files,
            ),
        );

        Ok(TargetOutcome::Built {
            units,
            compiled,
            reused,
        })
    }

    /// Expands solution or project inputs concurrently under the cap.
    async fn run_discovery(
        &self,
        inputs: &[CanonicalPath],
        as_solution: bool,
        registry: &Arc<ProjectRegistry>,
    ) -> Result<(), BuildError> {
        let results = stream::iter(inputs.iter().cloned().map(|path| {
            let loader = Arc::clone(&self.loader);
            let registry = Arc::clone(registry);
            let sink = Arc::clone(&self.sink);
            async move {
                tokio::task::spawn_blocking(move || {
                    if as_solution {
                        expand_solution(loader.as_ref(), &path, &registry, &sink);
                    } else {
                        expand_project(loader.as_ref(), &path, &registry, &sink);
                    }
                })
                .await
            }
        }))
        .buffer_unordered(self.options.concurrency)
        .collect::<Vec<_>>()
        .await;

        for result in results {
            result.map_err(|e| BuildError::Worker {
                message: e.to_string(),
            })?;
        }
        Ok(())
    }
}

/// Processes one unit: project-level cache lookup, then extraction and
/// cache writeback on a miss.
///
/// Returns the unit's metadata (or `None` if the unit failed and was
/// excluded) and whether the compiler service ran.
fn process_unit(
    unit: &Unit,
    cache: &BuildCache,
    compiler: &dyn CompilerService,
    sink: &DiagnosticSink,
    triggered: DateTime<Utc>,
    force: bool,
    tool_version: &str,
) -> (Option<UnitMetadata>, bool) {
    let unit_key = unit.key();
    let files = unit.files();
    // The unit's own scope: its key plus its current document set.
    let cache_key = scope_key(
        std::iter::once(unit_key.as_str()).chain(files.iter().map(String::as_str)),
    );
    let store = ArtifactStore::new(&cache.project.entry_dir(&cache_key));

    if !force {
        if let Some(previous) = cache.project.get(&cache_key) {
            if !unit_is_stale(&previous, &files) {
                match read_cached(&store, &previous) {
                    Some(metadata) => return (Some(metadata), false),
                    None => {
                        sink.emit(
                            Diagnostic::warning(
                                DiagnosticCode::new(Category::Cache, 301),
                                "cached metadata unreadable, re-extracting",
                            )
                            .with_source(unit.display_path()),
                        );
                    }
                }
            }
        }
    }

    match compiler.compile(&unit.request()) {
        Ok(metadata) => {
            if let Some(artifact) = persist_artifact(&store, &metadata, tool_version, sink, unit) {
                let contained = BTreeMap::from([(unit_key.clone(), files.clone())]);
                cache.project.put(
                    cache_key.clone(),
                    BuildInfo::new(
                        triggered,
                        files,
                        contained,
                        cache.project.entry_dir(&cache_key),
                        vec![PathBuf::from(artifact)],
                    ),
                );
            }
            (Some(metadata), true)
        }
        Err(err) => {
            sink.emit(
                Diagnostic::warning(
                    DiagnosticCode::new(Category::Compile, 301),
                    format!("unit excluded: {err}"),
                )
                .with_source(unit.display_path()),
            );
            (None, false)
        }
    }
}

/// Deserializes a previously cached unit artifact, fail-safe.
fn read_cached(store: &ArtifactStore, previous: &BuildInfo) -> Option<UnitMetadata> {
    let name = previous.relative_output_files.first()?;
    let bytes = store.read(name.to_str()?)?;
    quarry_metadata::from_bytes(&bytes).ok()
}

/// Persists a freshly extracted unit into the project tier.
///
/// A persistence failure only costs the cache entry: it is reported and
/// the fresh metadata still contributes to the merge.
fn persist_artifact(
    store: &ArtifactStore,
    metadata: &UnitMetadata,
    tool_version: &str,
    sink: &DiagnosticSink,
    unit: &Unit,
) -> Option<String> {
    let result = quarry_metadata::to_bytes(metadata)
        .map_err(|e| e.to_string())
        .and_then(|bytes| {
            store
                .write("qmd", &bytes, tool_version)
                .map_err(|e| e.to_string())
        });
    match result {
        Ok(artifact) => Some(artifact),
        Err(reason) => {
            sink.emit(
                Diagnostic::warning(
                    DiagnosticCode::new(Category::Cache, 303),
                    format!("failed to persist cache artifact: {reason}"),
                )
                .with_source(unit.display_path()),
            );
            None
        }
    }
}
