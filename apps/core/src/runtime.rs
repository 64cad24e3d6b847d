use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::activation::{
    establish_session, Activation, ActivationError, ActivationMachine, BackendSpawner,
    CommandBackendSpawner, SurfacePresenter,
};
use crate::config::{self, Config, ConfigError};
use crate::controller::{ExecuteOutcome, SessionError};
use crate::discovery;
use crate::executor::ShellLauncher;
use crate::hotkey_runtime::HotkeyRuntimeError;
use crate::logging;
use crate::model::Verb;
use crate::resolver::PathResolver;

#[derive(Debug)]
pub enum RuntimeError {
    Config(ConfigError),
    Activation(ActivationError),
    Hotkey(HotkeyRuntimeError),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(error) => write!(f, "config error: {error}"),
            Self::Activation(error) => write!(f, "activation error: {error}"),
            Self::Hotkey(error) => write!(f, "hotkey runtime error: {error:?}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<ConfigError> for RuntimeError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<ActivationError> for RuntimeError {
    fn from(value: ActivationError) -> Self {
        Self::Activation(value)
    }
}

impl From<HotkeyRuntimeError> for RuntimeError {
    fn from(value: HotkeyRuntimeError) -> Self {
        Self::Hotkey(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Options {
    pub background: bool,
    pub config_path: Option<PathBuf>,
    pub one_shot_query: Option<String>,
}

pub fn parse_cli_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--background" => options.background = true,
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--config requires a path argument".to_string())?;
                options.config_path = Some(PathBuf::from(value));
            }
            "--query" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--query requires a pattern argument".to_string())?;
                options.one_shot_query = Some(value.clone());
            }
            other => return Err(format!("unrecognized argument: {other}")),
        }
    }

    Ok(options)
}

pub fn run_with_options(options: Options) -> Result<(), RuntimeError> {
    if let Err(error) = logging::init() {
        eprintln!("[keyspring-core] file logging unavailable: {error}");
    }

    let loaded = config::load(options.config_path.clone())?;
    config::validate(&loaded)?;
    if !loaded.config_path.exists() {
        config::save(&loaded)?;
        println!(
            "[keyspring-core] wrote default config to {}",
            loaded.config_path.display()
        );
    }

    println!(
        "[keyspring-core] startup mode={} background={} hotkey={} registry_path={} channel={}",
        runtime_mode(),
        options.background,
        loaded.hotkey,
        loaded.registry_path.display(),
        loaded.channel_name,
    );

    if let Some(pattern) = &options.one_shot_query {
        return run_one_shot(&loaded, pattern);
    }

    run_hotkey_loop(&loaded)
}

/// Spawns a session, runs a single filter, prints the ranked results, and
/// tears the session down. The headless way to exercise the whole path.
fn run_one_shot(config: &Config, pattern: &str) -> Result<(), RuntimeError> {
    let spawner = CommandBackendSpawner::new(&config.backend_program, &config.channel_name);
    let mut session = establish_session(
        &spawner,
        discovery::default_sources(),
        Box::new(ShellLauncher),
        PathResolver::from_env(),
        config.registry_path.clone(),
    )?;

    let outcome = session
        .controller
        .on_pattern_changed(pattern)
        .map_err(ActivationError::Session);
    match outcome {
        Ok(()) => {
            for result in session.controller.results() {
                println!("{:>6}  {}", result.score, result.text);
            }
        }
        Err(error) => {
            session.process.terminate();
            return Err(RuntimeError::Activation(error));
        }
    }

    session.process.terminate();
    Ok(())
}

fn runtime_mode() -> &'static str {
    #[cfg(target_os = "windows")]
    {
        "windows-hotkey-runtime"
    }

    #[cfg(not(target_os = "windows"))]
    {
        "non-windows-one-shot"
    }
}

#[cfg(target_os = "windows")]
fn run_hotkey_loop(config: &Config) -> Result<(), RuntimeError> {
    use crate::activation::default_presenter;
    use crate::hotkey::parse_hotkey;
    use crate::hotkey_runtime::{default_hotkey_registrar, run_message_loop};

    let _single_instance = match acquire_single_instance_guard() {
        Ok(Some(guard)) => guard,
        Ok(None) => {
            println!("[keyspring-core] runtime already active; exiting duplicate process");
            return Ok(());
        }
        Err(error) => {
            return Err(RuntimeError::Hotkey(HotkeyRuntimeError::EventLoopFailed(
                error,
            )))
        }
    };

    if let Err(error) = crate::startup::sync_with_flag(config.launch_at_startup) {
        logging::warn(&format!("startup registration not updated: {error}"));
    }

    let hotkey = parse_hotkey(&config.hotkey)
        .map_err(|error| RuntimeError::Hotkey(HotkeyRuntimeError::InvalidHotkey(error)))?;
    let mut registrar = default_hotkey_registrar();
    registrar.register_hotkey(&hotkey)?;
    println!(
        "[keyspring-core] hotkey registered chord={}",
        hotkey.canonical()
    );

    let machine = Arc::new(Mutex::new(ActivationMachine::new()));
    let presenter: Arc<dyn SurfacePresenter> = Arc::from(default_presenter());
    let spawner: Arc<dyn BackendSpawner> = Arc::new(CommandBackendSpawner::new(
        &config.backend_program,
        &config.channel_name,
    ));

    println!("[keyspring-core] event loop running");
    let loop_machine = Arc::clone(&machine);
    let loop_config = config.clone();
    run_message_loop(move |_hotkey_id| {
        handle_activation(&loop_machine, &spawner, &presenter, &loop_config);
    })?;

    registrar.unregister_all()?;
    if let Ok(mut machine) = machine.lock() {
        machine.shutdown();
    }
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn run_hotkey_loop(_config: &Config) -> Result<(), RuntimeError> {
    println!("[keyspring-core] non-windows runtime: no global hotkey loop; use --query");
    Ok(())
}

/// One hotkey press. Reuse goes straight to the presenter; a fresh spawn is
/// pushed to a worker thread so the message loop stays responsive.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn handle_activation(
    machine: &Arc<Mutex<ActivationMachine>>,
    spawner: &Arc<dyn BackendSpawner>,
    presenter: &Arc<dyn SurfacePresenter>,
    config: &Config,
) {
    let decision = match machine.lock() {
        Ok(mut machine) => machine.on_activate(),
        Err(_) => return,
    };

    match decision {
        Activation::Reuse { pid } => {
            logging::info(&format!("reusing live session backend_pid={pid}"));
            if !presenter.bring_to_front(pid) {
                logging::warn(&format!("no foregroundable window for backend_pid={pid}"));
            }
        }
        Activation::InFlight | Activation::Ignored => {}
        Activation::SpawnNew => {
            let machine = Arc::clone(machine);
            let spawner = Arc::clone(spawner);
            let registry_path = config.registry_path.clone();
            std::thread::spawn(move || {
                let built = establish_session(
                    spawner.as_ref(),
                    discovery::default_sources(),
                    Box::new(ShellLauncher),
                    PathResolver::from_env(),
                    registry_path,
                );
                match built {
                    Ok(session) => {
                        logging::info(&format!(
                            "session established backend_pid={}",
                            session.process.pid()
                        ));
                        if let Ok(mut machine) = machine.lock() {
                            machine.complete_spawn(session);
                        }
                    }
                    Err(error) => {
                        logging::error(&format!("session spawn failed: {error}"));
                        if let Ok(mut machine) = machine.lock() {
                            machine.fail_spawn();
                        }
                    }
                }
            });
        }
    }
}

/// Runs the selected result on the active session, reporting rather than
/// propagating launch refusals; a channel failure tears the session down so
/// the next activation respawns.
pub fn execute_active_selection(
    machine: &Arc<Mutex<ActivationMachine>>,
    verb: Verb,
) -> Option<ExecuteOutcome> {
    let mut machine = machine.lock().ok()?;
    let session = machine.session_mut()?;
    match session.controller.execute_selected(verb) {
        Ok(outcome) => Some(outcome),
        Err(error) => {
            logging::error(&format!("execute failed: {error}"));
            None
        }
    }
}

/// Applies a pattern change on the active session. `ChannelUnavailable` is
/// session-fatal: the machine drops to idle and the next hotkey press spawns
/// fresh.
pub fn apply_pattern_change(machine: &Arc<Mutex<ActivationMachine>>, pattern: &str) {
    let Ok(mut guard) = machine.lock() else {
        return;
    };
    let Some(session) = guard.session_mut() else {
        return;
    };
    match session.controller.on_pattern_changed(pattern) {
        Ok(()) => {}
        Err(SessionError::Channel(error)) => {
            logging::error(&format!("backend channel lost: {error}"));
            guard.on_session_lost();
        }
        Err(error) => {
            logging::error(&format!("pattern change failed: {error}"));
        }
    }
}

#[cfg(target_os = "windows")]
struct SingleInstanceGuard {
    handle: windows_sys::Win32::Foundation::HANDLE,
}

#[cfg(target_os = "windows")]
impl Drop for SingleInstanceGuard {
    fn drop(&mut self) {
        unsafe {
            windows_sys::Win32::Foundation::CloseHandle(self.handle);
        }
    }
}

#[cfg(target_os = "windows")]
fn acquire_single_instance_guard() -> Result<Option<SingleInstanceGuard>, String> {
    use windows_sys::Win32::Foundation::GetLastError;
    use windows_sys::Win32::System::Threading::CreateMutexW;

    let mutex_name: Vec<u16> = "Local\\KeySpringRuntimeSingleton"
        .encode_utf16()
        .chain(std::iter::once(0))
        .collect();
    let handle = unsafe { CreateMutexW(std::ptr::null(), 0, mutex_name.as_ptr()) };
    if handle.is_null() {
        let error = unsafe { GetLastError() };
        return Err(format!("CreateMutexW failed with error {error}"));
    }

    // ERROR_ALREADY_EXISTS
    let error = unsafe { GetLastError() };
    if error == 183 {
        unsafe {
            windows_sys::Win32::Foundation::CloseHandle(handle);
        }
        return Ok(None);
    }

    Ok(Some(SingleInstanceGuard { handle }))
}

#[cfg(test)]
mod tests {
    use super::{parse_cli_args, Options};
    use std::path::PathBuf;

    #[test]
    fn cli_defaults_to_foreground_hotkey_mode() {
        let options = parse_cli_args(&[]).expect("empty args should parse");
        assert_eq!(options, Options::default());
    }

    #[test]
    fn cli_parses_background_config_and_query() {
        let args = vec![
            "--background".to_string(),
            "--config".to_string(),
            "C:\\conf\\keyspring.toml".to_string(),
            "--query".to_string(),
            "term".to_string(),
        ];
        let options = parse_cli_args(&args).expect("args should parse");
        assert!(options.background);
        assert_eq!(
            options.config_path,
            Some(PathBuf::from("C:\\conf\\keyspring.toml"))
        );
        assert_eq!(options.one_shot_query.as_deref(), Some("term"));
    }

    #[test]
    fn cli_rejects_unknown_flags() {
        let error = parse_cli_args(&["--what".to_string()]).expect_err("should reject");
        assert!(error.contains("--what"));
    }

    #[test]
    fn cli_rejects_dangling_value_flags() {
        assert!(parse_cli_args(&["--config".to_string()]).is_err());
        assert!(parse_cli_args(&["--query".to_string()]).is_err());
    }
}
