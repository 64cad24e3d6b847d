use std::fmt::{Display, Formatter};

use crate::model::Verb;

#[derive(Debug)]
pub enum LaunchError {
    EmptyTarget,
    Refused { target: String, detail: String },
    UnsupportedVerb(Verb),
    Spawn(std::io::Error),
}

impl Display for LaunchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTarget => write!(f, "empty launch target"),
            Self::Refused { target, detail } => {
                write!(f, "launch refused for {target}: {detail}")
            }
            Self::UnsupportedVerb(verb) => {
                write!(f, "verb '{}' is not supported on this platform", verb.as_str())
            }
            Self::Spawn(error) => write!(f, "process spawn failed: {error}"),
        }
    }
}

impl std::error::Error for LaunchError {}

/// OS launch boundary: run `target` with `args` under a launch verb. Kept as
/// a trait so controller tests can observe launches without starting
/// processes.
pub trait TargetLauncher: Send {
    fn launch(&self, target: &str, args: &str, verb: Verb) -> Result<(), LaunchError>;
}

/// Hands the target to the OS shell ("open with default handler / run with
/// verb").
#[derive(Debug, Default)]
pub struct ShellLauncher;

#[cfg(target_os = "windows")]
impl TargetLauncher for ShellLauncher {
    fn launch(&self, target: &str, args: &str, verb: Verb) -> Result<(), LaunchError> {
        use windows_sys::Win32::UI::Shell::ShellExecuteW;
        use windows_sys::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;

        let trimmed = target.trim();
        if trimmed.is_empty() {
            return Err(LaunchError::EmptyTarget);
        }

        let verb_wide = to_wide(verb.as_str());
        let target_wide = to_wide(trimmed);
        let args_wide = to_wide(args);
        let args_ptr = if args.is_empty() {
            std::ptr::null()
        } else {
            args_wide.as_ptr()
        };

        let instance = unsafe {
            ShellExecuteW(
                std::ptr::null_mut(),
                verb_wide.as_ptr(),
                target_wide.as_ptr(),
                args_ptr,
                std::ptr::null(),
                SW_SHOWNORMAL,
            )
        };

        // Per ShellExecute contract, values <= 32 are error codes.
        if instance as usize <= 32 {
            return Err(LaunchError::Refused {
                target: trimmed.to_string(),
                detail: format!("ShellExecuteW returned {}", instance as usize),
            });
        }

        Ok(())
    }
}

#[cfg(not(target_os = "windows"))]
impl TargetLauncher for ShellLauncher {
    fn launch(&self, target: &str, args: &str, verb: Verb) -> Result<(), LaunchError> {
        let trimmed = target.trim();
        if trimmed.is_empty() {
            return Err(LaunchError::EmptyTarget);
        }
        if verb == Verb::RunAs {
            return Err(LaunchError::UnsupportedVerb(verb));
        }

        if args.trim().is_empty() {
            std::process::Command::new("xdg-open")
                .arg(trimmed)
                .spawn()
                .map_err(LaunchError::Spawn)?;
        } else {
            std::process::Command::new(trimmed)
                .args(args.split_whitespace())
                .spawn()
                .map_err(LaunchError::Spawn)?;
        }

        Ok(())
    }
}

#[cfg(target_os = "windows")]
fn to_wide(value: &str) -> Vec<u16> {
    value.encode_utf16().chain(std::iter::once(0)).collect()
}

impl<T: TargetLauncher + Sync + ?Sized> TargetLauncher for std::sync::Arc<T> {
    fn launch(&self, target: &str, args: &str, verb: Verb) -> Result<(), LaunchError> {
        (**self).launch(target, args, verb)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRecord {
    pub target: String,
    pub args: String,
    pub verb: Verb,
}

/// Records launches instead of performing them.
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    records: std::sync::Mutex<Vec<LaunchRecord>>,
}

impl RecordingLauncher {
    pub fn records(&self) -> Vec<LaunchRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl TargetLauncher for RecordingLauncher {
    fn launch(&self, target: &str, args: &str, verb: Verb) -> Result<(), LaunchError> {
        if target.trim().is_empty() {
            return Err(LaunchError::EmptyTarget);
        }
        if let Ok(mut records) = self.records.lock() {
            records.push(LaunchRecord {
                target: target.to_string(),
                args: args.to_string(),
                verb,
            });
        }
        Ok(())
    }
}
