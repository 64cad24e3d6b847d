use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::model::LaunchableItem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    message: String,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SourceError {}

/// Delivers an ordered sequence of launchable `{display_name, path}` pairs.
/// Shortcut-file parsing is deliberately absent: a shortcut's own path is its
/// launch path and the shell resolves the rest.
pub trait LaunchableSource: Send {
    fn source_name(&self) -> &'static str;
    fn collect(&self) -> Result<Vec<LaunchableItem>, SourceError>;
}

pub struct FixtureSource {
    items: Vec<LaunchableItem>,
}

impl FixtureSource {
    pub fn from_items(items: Vec<LaunchableItem>) -> Self {
        Self { items }
    }

    pub fn deterministic_fixture() -> Self {
        Self {
            items: vec![
                LaunchableItem::new(
                    "Visual Studio Code",
                    "C:\\Program Files\\Microsoft VS Code\\Code.exe",
                ),
                LaunchableItem::new(
                    "Windows Terminal",
                    "C:\\Program Files\\WindowsApps\\Terminal.exe",
                ),
            ],
        }
    }
}

impl LaunchableSource for FixtureSource {
    fn source_name(&self) -> &'static str {
        "fixture"
    }

    fn collect(&self) -> Result<Vec<LaunchableItem>, SourceError> {
        Ok(self.items.clone())
    }
}

/// Files sitting directly on the user and public desktops. Non-recursive;
/// the full path doubles as the display name.
pub struct DesktopSource {
    roots: Vec<PathBuf>,
}

impl DesktopSource {
    pub fn new() -> Self {
        Self {
            roots: desktop_roots(),
        }
    }

    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

impl Default for DesktopSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LaunchableSource for DesktopSource {
    fn source_name(&self) -> &'static str {
        "desktop"
    }

    fn collect(&self) -> Result<Vec<LaunchableItem>, SourceError> {
        let mut items = Vec::new();
        for root in &self.roots {
            items.extend(scan_flat_files(root));
        }
        Ok(items)
    }
}

/// Start Menu shortcuts, walked recursively. Uninstaller shortcuts are
/// noise, not launch targets.
pub struct StartMenuSource {
    roots: Vec<PathBuf>,
}

impl StartMenuSource {
    pub fn new() -> Self {
        Self {
            roots: start_menu_roots(),
        }
    }

    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

impl Default for StartMenuSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LaunchableSource for StartMenuSource {
    fn source_name(&self) -> &'static str {
        "start-menu"
    }

    fn collect(&self) -> Result<Vec<LaunchableItem>, SourceError> {
        Ok(scan_shortcut_roots(&self.roots))
    }
}

pub fn default_sources() -> Vec<Box<dyn LaunchableSource>> {
    vec![
        Box::new(StartMenuSource::new()),
        Box::new(DesktopSource::new()),
    ]
}

/// Unreadable directories and broken entries are skipped, not surfaced; a
/// partial menu beats no menu.
pub fn scan_shortcut_roots(roots: &[PathBuf]) -> Vec<LaunchableItem> {
    let mut items = Vec::new();
    for root in roots {
        if !root.is_dir() {
            continue;
        }
        for entry in WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if let Some(display_name) = shortcut_display_name(path) {
                items.push(LaunchableItem {
                    display_name,
                    path: path.to_string_lossy().into_owned(),
                });
            }
        }
    }
    items
}

pub fn shortcut_display_name(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?;
    if !extension.eq_ignore_ascii_case("lnk") {
        return None;
    }

    let stem = path.file_stem()?.to_str()?;
    if stem.to_ascii_lowercase().contains("uninstall") {
        return None;
    }

    Some(stem.to_string())
}

pub fn scan_flat_files(root: &Path) -> Vec<LaunchableItem> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return Vec::new();
    };

    let mut items = Vec::new();
    for entry in entries.filter_map(|entry| entry.ok()) {
        let path = entry.path();
        if path.is_file() {
            let display = path.to_string_lossy().into_owned();
            items.push(LaunchableItem {
                display_name: display.clone(),
                path: display,
            });
        }
    }
    items.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    items
}

#[cfg(target_os = "windows")]
fn desktop_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(profile) = std::env::var_os("USERPROFILE") {
        roots.push(PathBuf::from(profile).join("Desktop"));
    }
    if let Some(public) = std::env::var_os("PUBLIC") {
        roots.push(PathBuf::from(public).join("Desktop"));
    }
    roots
}

#[cfg(not(target_os = "windows"))]
fn desktop_roots() -> Vec<PathBuf> {
    std::env::var_os("HOME")
        .map(|home| vec![PathBuf::from(home).join("Desktop")])
        .unwrap_or_default()
}

#[cfg(target_os = "windows")]
fn start_menu_roots() -> Vec<PathBuf> {
    const START_MENU_SUBPATH: &str = "Microsoft\\Windows\\Start Menu";

    let mut roots = Vec::new();
    if let Some(appdata) = std::env::var_os("APPDATA") {
        roots.push(PathBuf::from(appdata).join(START_MENU_SUBPATH));
    }
    if let Some(programdata) = std::env::var_os("PROGRAMDATA") {
        roots.push(PathBuf::from(programdata).join(START_MENU_SUBPATH));
    }
    roots
}

#[cfg(not(target_os = "windows"))]
fn start_menu_roots() -> Vec<PathBuf> {
    Vec::new()
}
