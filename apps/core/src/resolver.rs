use std::path::{Path, PathBuf};

/// Turns a symbolic executable reference into a runnable path. Total: a miss
/// is `None`, never an error, and callers fall back to the original
/// reference so the OS loader gets the last word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    dirs: Vec<PathBuf>,
    extensions: Vec<String>,
}

impl PathResolver {
    pub fn new(dirs: Vec<PathBuf>, extensions: Vec<String>) -> Self {
        Self { dirs, extensions }
    }

    pub fn from_env() -> Self {
        let dirs = std::env::var_os("PATH")
            .map(|raw| std::env::split_paths(&raw).collect())
            .unwrap_or_default();
        Self::new(dirs, default_extensions())
    }

    pub fn resolve(&self, exec_ref: &str) -> Option<PathBuf> {
        if exec_ref.trim().is_empty() {
            return None;
        }

        let literal = Path::new(exec_ref);
        if literal.is_absolute() {
            // Rooted input never consults the search dirs.
            return is_executable(literal).then(|| literal.to_path_buf());
        }

        for dir in &self.dirs {
            for extension in &self.extensions {
                let file_name = if ends_with_ignore_case(exec_ref, extension) {
                    exec_ref.to_string()
                } else {
                    format!("{exec_ref}{extension}")
                };
                let candidate = dir.join(file_name);
                if is_executable(&candidate) {
                    return Some(candidate);
                }
            }
        }

        None
    }
}

#[cfg(windows)]
fn default_extensions() -> Vec<String> {
    match std::env::var("PATHEXT") {
        Ok(raw) if !raw.trim().is_empty() => raw
            .split(';')
            .filter(|extension| !extension.is_empty())
            .map(str::to_string)
            .collect(),
        _ => vec![".exe".to_string(), ".bat".to_string(), ".cmd".to_string()],
    }
}

#[cfg(not(windows))]
fn default_extensions() -> Vec<String> {
    vec![String::new()]
}

fn ends_with_ignore_case(name: &str, extension: &str) -> bool {
    if extension.is_empty() {
        return true;
    }
    name.to_ascii_lowercase()
        .ends_with(&extension.to_ascii_lowercase())
}

#[cfg(windows)]
fn is_executable(path: &Path) -> bool {
    // Existence is the whole test on Windows.
    path.is_file()
}

#[cfg(not(windows))]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::ends_with_ignore_case;

    #[test]
    fn extension_suffix_check_is_case_insensitive() {
        assert!(ends_with_ignore_case("foo.CMD", ".cmd"));
        assert!(ends_with_ignore_case("foo.cmd", ".CMD"));
        assert!(!ends_with_ignore_case("foo.exe", ".cmd"));
        assert!(ends_with_ignore_case("foo", ""));
    }
}
