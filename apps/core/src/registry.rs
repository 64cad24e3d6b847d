use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::path::Path;

use serde::Deserialize;

#[cfg(target_os = "windows")]
const FILE_OPENER: &str = "explorer";
#[cfg(not(target_os = "windows"))]
const FILE_OPENER: &str = "xdg-open";

pub const EDIT_COMMAND_NAME: &str = "--edit";
pub const SHOW_SETTINGS_COMMAND_NAME: &str = "--show setting";

const FILE_FILTER_SENTINEL: &str = "(ff)";

/// Document written on first run, before the initial parse.
const DEFAULT_DOCUMENT: &str = r#"# KeySpring command registry.
#
# Each list row is one newline-delimited record: name, executable, then any
# number of argument lines. Aliases substitute the executable field before
# PATH resolution.
version = 1

list = [
    "notepad\nnotepad.exe",
    "shell\ncmd.exe\n/k cd %USERPROFILE%",
]

[alias]
np = "notepad.exe"
"#;

#[derive(Debug)]
pub enum RegistryError {
    Bootstrap(std::io::Error),
    Read(std::io::Error),
    Parse(toml::de::Error),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bootstrap(error) => write!(f, "registry bootstrap failed: {error}"),
            Self::Read(error) => write!(f, "registry read failed: {error}"),
            Self::Parse(error) => write!(f, "registry parse failed: {error}"),
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<toml::de::Error> for RegistryError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecSpec {
    Program(String),
    FileFilter,
    ShowSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEntry {
    pub name: String,
    pub exec: ExecSpec,
    pub args: String,
}

#[derive(Debug, Deserialize)]
struct RegistryDoc {
    #[serde(default)]
    version: i64,
    #[serde(default)]
    alias: HashMap<String, String>,
    #[serde(default)]
    list: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Registry {
    version: i64,
    aliases: HashMap<String, String>,
    commands: Vec<CommandEntry>,
    by_name: HashMap<String, usize>,
}

impl Registry {
    /// Loads the command registry, provisioning the default document first if
    /// `path` does not exist yet. A malformed document root is fatal to this
    /// call; individual malformed rows are not.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(RegistryError::Bootstrap)?;
            }
            std::fs::write(path, DEFAULT_DOCUMENT).map_err(RegistryError::Bootstrap)?;
        }

        let raw = std::fs::read_to_string(path).map_err(RegistryError::Read)?;
        let doc: RegistryDoc = toml::from_str(&raw)?;

        let mut registry = Self {
            version: doc.version,
            aliases: doc.alias,
            commands: Vec::new(),
            by_name: HashMap::new(),
        };

        for row in &doc.list {
            if let Some(entry) = parse_row(row) {
                registry.insert(entry);
            }
        }

        // Synthetic entries go in last so they win any name collision with a
        // user row.
        registry.insert(CommandEntry {
            name: EDIT_COMMAND_NAME.to_string(),
            exec: ExecSpec::Program(FILE_OPENER.to_string()),
            args: format!("\"{}\"", path.display()),
        });
        registry.insert(CommandEntry {
            name: SHOW_SETTINGS_COMMAND_NAME.to_string(),
            exec: ExecSpec::ShowSettings,
            args: String::new(),
        });

        Ok(registry)
    }

    fn insert(&mut self, entry: CommandEntry) {
        if let Some(&index) = self.by_name.get(&entry.name) {
            self.commands[index] = entry;
            return;
        }
        self.by_name.insert(entry.name.clone(), self.commands.len());
        self.commands.push(entry);
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.by_name.get(name).map(|&index| &self.commands[index])
    }

    pub fn commands(&self) -> &[CommandEntry] {
        &self.commands
    }

    pub fn command_names(&self) -> Vec<String> {
        self.commands.iter().map(|entry| entry.name.clone()).collect()
    }

    /// Exact-match alias substitution; identity on a miss. Never fails.
    pub fn resolve_alias<'a>(&'a self, exec: &'a str) -> &'a str {
        self.aliases.get(exec).map(String::as_str).unwrap_or(exec)
    }
}

/// One list row is `name\nexec\n[args...]`. Rows with fewer than two fields
/// carry no launchable meaning and are dropped.
fn parse_row(row: &str) -> Option<CommandEntry> {
    let fields: Vec<&str> = row.split('\n').collect();
    if fields.len() < 2 {
        return None;
    }

    let exec = if fields[1] == FILE_FILTER_SENTINEL {
        ExecSpec::FileFilter
    } else {
        ExecSpec::Program(fields[1].to_string())
    };

    let args = if fields.len() >= 3 {
        fields[2..].join("\n")
    } else {
        String::new()
    };

    Some(CommandEntry {
        name: fields[0].to_string(),
        exec,
        args,
    })
}
