use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use crate::backend::{ChannelError, SearchBackend};
use crate::discovery::LaunchableSource;
use crate::executor::{LaunchError, TargetLauncher};
use crate::logging;
use crate::model::{CandidateKind, LaunchableItem, RankedResult, Verb};
use crate::registry::{ExecSpec, Registry, RegistryError};
use crate::resolver::PathResolver;

#[derive(Debug)]
pub enum SessionError {
    Registry(RegistryError),
    Channel(ChannelError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registry(error) => write!(f, "registry error: {error}"),
            Self::Channel(error) => write!(f, "channel error: {error}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<RegistryError> for SessionError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

impl From<ChannelError> for SessionError {
    fn from(value: ChannelError) -> Self {
        Self::Channel(value)
    }
}

#[derive(Debug)]
pub enum ExecuteError {
    UnknownSelection(String),
    Launch(LaunchError),
}

impl Display for ExecuteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownSelection(text) => write!(f, "no launchable entry for '{text}'"),
            Self::Launch(error) => write!(f, "launch failed: {error}"),
        }
    }
}

impl std::error::Error for ExecuteError {}

impl From<LaunchError> for ExecuteError {
    fn from(value: LaunchError) -> Self {
        Self::Launch(value)
    }
}

/// What `execute` did, for the outcomes that are signals rather than process
/// launches. The file-filter sub-flow and the settings surface belong to the
/// hosting runtime, not to this controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteOutcome {
    Launched,
    FileFilter { args: String },
    ShowSettings,
    Ignored,
}

/// Drives one interactive search session: owns the candidate snapshot, the
/// backend channel, and the selection state. All backend traffic for a
/// session flows through this one value, which is what keeps the channel to
/// a single outstanding call.
pub struct SessionController<B> {
    backend: B,
    sources: Vec<Box<dyn LaunchableSource>>,
    launcher: Box<dyn TargetLauncher>,
    resolver: PathResolver,
    registry_path: PathBuf,
    registry: Registry,
    launchable_items: HashMap<String, LaunchableItem>,
    pattern: String,
    baseline: Vec<RankedResult>,
    results: Vec<RankedResult>,
    selected: Option<usize>,
}

impl<B: SearchBackend> SessionController<B> {
    pub fn new(
        backend: B,
        sources: Vec<Box<dyn LaunchableSource>>,
        launcher: Box<dyn TargetLauncher>,
        resolver: PathResolver,
        registry_path: PathBuf,
    ) -> Self {
        Self {
            backend,
            sources,
            launcher,
            resolver,
            registry_path,
            registry: Registry::default(),
            launchable_items: HashMap::new(),
            pattern: String::new(),
            baseline: Vec::new(),
            results: Vec::new(),
            selected: None,
        }
    }

    /// Rebuilds the whole candidate snapshot: collect launchables, reload the
    /// registry, push both sets to the ranker, then install the unranked
    /// baseline. Runs to completion before any pattern input is accepted, so
    /// a filter can never observe a half-replaced set.
    pub fn build_candidates(&mut self) -> Result<(), SessionError> {
        let mut items = HashMap::new();
        let mut order = Vec::new();
        for source in &self.sources {
            let collected = match source.collect() {
                Ok(collected) => collected,
                Err(error) => {
                    logging::warn(&format!(
                        "source {} failed: {error}; continuing without it",
                        source.source_name()
                    ));
                    continue;
                }
            };
            for item in collected {
                if items.insert(item.display_name.clone(), item.clone()).is_none() {
                    order.push(item.display_name);
                }
            }
        }

        let registry = Registry::load(&self.registry_path)?;
        let command_names = registry.command_names();

        self.backend.set_launchable_list(&order)?;
        self.backend.set_command_list(&command_names)?;

        let mut baseline = Vec::with_capacity(order.len() + command_names.len());
        for name in &order {
            baseline.push(RankedResult::unranked(CandidateKind::List, name));
        }
        for name in &command_names {
            baseline.push(RankedResult::unranked(CandidateKind::Command, name));
        }
        baseline.sort_by(|a, b| a.text.to_lowercase().cmp(&b.text.to_lowercase()));

        logging::info(&format!(
            "candidates rebuilt: launchables={} commands={} registry_version={}",
            order.len(),
            command_names.len(),
            registry.version()
        ));

        self.launchable_items = items;
        self.registry = registry;
        self.baseline = baseline;
        self.pattern.clear();
        self.apply_baseline();
        Ok(())
    }

    /// Empty patterns restore the cached baseline without a backend round
    /// trip; anything else goes through the ranker and comes back re-sorted
    /// by descending score (stable, so the ranker's tie order survives).
    pub fn on_pattern_changed(&mut self, pattern: &str) -> Result<(), SessionError> {
        self.pattern = pattern.to_string();
        if pattern.is_empty() {
            self.apply_baseline();
            return Ok(());
        }

        let mut ranked = self.backend.filter(pattern)?;
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        self.selected = if ranked.is_empty() { None } else { Some(0) };
        self.results = ranked;
        Ok(())
    }

    pub fn execute(&self, result: &RankedResult, verb: Verb) -> Result<ExecuteOutcome, ExecuteError> {
        match result.kind {
            CandidateKind::List => {
                let item = self
                    .launchable_items
                    .get(&result.text)
                    .ok_or_else(|| ExecuteError::UnknownSelection(result.text.clone()))?;
                self.launcher.launch(&item.path, "", verb)?;
                Ok(ExecuteOutcome::Launched)
            }
            CandidateKind::Command => {
                let entry = self
                    .registry
                    .command(&result.text)
                    .ok_or_else(|| ExecuteError::UnknownSelection(result.text.clone()))?;
                match &entry.exec {
                    ExecSpec::FileFilter => Ok(ExecuteOutcome::FileFilter {
                        args: entry.args.clone(),
                    }),
                    ExecSpec::ShowSettings => Ok(ExecuteOutcome::ShowSettings),
                    ExecSpec::Program(program) => {
                        let aliased = self.registry.resolve_alias(program);
                        // Resolution misses fall back to the aliased
                        // reference; the OS loader gets a chance too.
                        let target = match self.resolver.resolve(aliased) {
                            Some(path) => path.to_string_lossy().into_owned(),
                            None => aliased.to_string(),
                        };
                        self.launcher.launch(&target, &entry.args, verb)?;
                        Ok(ExecuteOutcome::Launched)
                    }
                }
            }
            CandidateKind::Unknown => Ok(ExecuteOutcome::Ignored),
        }
    }

    pub fn execute_selected(&self, verb: Verb) -> Result<ExecuteOutcome, ExecuteError> {
        match self.selected() {
            Some(result) => self.execute(&result.clone(), verb),
            None => Ok(ExecuteOutcome::Ignored),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn results(&self) -> &[RankedResult] {
        &self.results
    }

    pub fn selected(&self) -> Option<&RankedResult> {
        self.selected.and_then(|index| self.results.get(index))
    }

    pub fn select(&mut self, index: usize) {
        if index < self.results.len() {
            self.selected = Some(index);
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn apply_baseline(&mut self) {
        self.results = self.baseline.clone();
        self.selected = if self.results.is_empty() { None } else { Some(0) };
    }
}
