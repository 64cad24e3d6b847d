use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

use crate::backend::{self, ChannelError, SearchBackend};
use crate::controller::{SessionController, SessionError};
use crate::discovery::LaunchableSource;
use crate::executor::TargetLauncher;
use crate::resolver::PathResolver;

#[derive(Debug)]
pub enum ActivationError {
    Spawn(std::io::Error),
    Channel(ChannelError),
    Session(SessionError),
}

impl Display for ActivationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(error) => write!(f, "backend spawn failed: {error}"),
            Self::Channel(error) => write!(f, "backend connect failed: {error}"),
            Self::Session(error) => write!(f, "session build failed: {error}"),
        }
    }
}

impl std::error::Error for ActivationError {}

impl From<ChannelError> for ActivationError {
    fn from(value: ChannelError) -> Self {
        Self::Channel(value)
    }
}

impl From<SessionError> for ActivationError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

/// Handle on the spawned ranker process.
pub trait BackendProcess: Send {
    fn pid(&self) -> u32;
    fn is_alive(&mut self) -> bool;
    fn terminate(&mut self);
}

pub struct ChildBackendProcess {
    child: std::process::Child,
}

impl ChildBackendProcess {
    pub fn new(child: std::process::Child) -> Self {
        Self { child }
    }
}

impl BackendProcess for ChildBackendProcess {
    fn pid(&self) -> u32 {
        self.child.id()
    }

    fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    fn terminate(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Brings a live session's surface back to the foreground. Window-by-pid
/// enumeration is a Windows capability; other hosts supply their own answer
/// or decline.
pub trait SurfacePresenter: Send + Sync {
    fn bring_to_front(&self, backend_pid: u32) -> bool;
}

#[derive(Debug, Default)]
pub struct NoopPresenter;

impl SurfacePresenter for NoopPresenter {
    fn bring_to_front(&self, _backend_pid: u32) -> bool {
        false
    }
}

#[cfg(target_os = "windows")]
#[derive(Debug, Default)]
pub struct WindowEnumPresenter;

#[cfg(target_os = "windows")]
impl SurfacePresenter for WindowEnumPresenter {
    fn bring_to_front(&self, backend_pid: u32) -> bool {
        use windows_sys::Win32::Foundation::{HWND, LPARAM};
        use windows_sys::Win32::UI::WindowsAndMessaging::{
            EnumWindows, GetWindowThreadProcessId, IsWindowVisible, SetForegroundWindow,
            ShowWindow, SW_RESTORE,
        };

        struct EnumState {
            pid: u32,
            hwnd: HWND,
        }

        unsafe extern "system" fn enum_callback(hwnd: HWND, lparam: LPARAM) -> i32 {
            let state = &mut *(lparam as *mut EnumState);
            let mut owner_pid = 0_u32;
            GetWindowThreadProcessId(hwnd, &mut owner_pid);
            if owner_pid == state.pid && IsWindowVisible(hwnd) != 0 {
                state.hwnd = hwnd;
                return 0;
            }
            1
        }

        let mut state = EnumState {
            pid: backend_pid,
            hwnd: std::ptr::null_mut(),
        };
        unsafe {
            EnumWindows(Some(enum_callback), &mut state as *mut EnumState as LPARAM);
        }
        if state.hwnd.is_null() {
            return false;
        }

        unsafe {
            ShowWindow(state.hwnd, SW_RESTORE);
            SetForegroundWindow(state.hwnd) != 0
        }
    }
}

pub fn default_presenter() -> Box<dyn SurfacePresenter> {
    #[cfg(target_os = "windows")]
    {
        Box::new(WindowEnumPresenter)
    }

    #[cfg(not(target_os = "windows"))]
    {
        Box::new(NoopPresenter)
    }
}

/// Spawns the ranker process and connects its channel.
pub trait BackendSpawner: Send + Sync {
    fn spawn(&self) -> Result<(Box<dyn BackendProcess>, Box<dyn SearchBackend>), ActivationError>;
}

const CONNECT_ATTEMPTS: u32 = 100;
const CONNECT_INTERVAL: Duration = Duration::from_millis(50);

pub struct CommandBackendSpawner {
    program: String,
    channel_name: String,
}

impl CommandBackendSpawner {
    pub fn new(program: &str, channel_name: &str) -> Self {
        Self {
            program: program.to_string(),
            channel_name: channel_name.to_string(),
        }
    }
}

impl BackendSpawner for CommandBackendSpawner {
    fn spawn(&self) -> Result<(Box<dyn BackendProcess>, Box<dyn SearchBackend>), ActivationError> {
        let child = std::process::Command::new(&self.program)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
            .map_err(ActivationError::Spawn)?;
        let mut process = ChildBackendProcess::new(child);

        // The ranker needs a beat to start listening. The retry lives here,
        // in the spawn path, and only here; an established channel that
        // fails later is session-fatal with no retry.
        match connect_with_retry(&self.channel_name) {
            Ok(channel) => Ok((Box::new(process), channel)),
            Err(error) => {
                process.terminate();
                Err(ActivationError::Channel(error))
            }
        }
    }
}

fn connect_with_retry(channel_name: &str) -> Result<Box<dyn SearchBackend>, ChannelError> {
    let mut attempt = 0;
    loop {
        match backend::connect(channel_name) {
            Ok(channel) => return Ok(channel),
            Err(ChannelError::Connect(error)) => {
                attempt += 1;
                if attempt >= CONNECT_ATTEMPTS {
                    return Err(ChannelError::Connect(error));
                }
                std::thread::sleep(CONNECT_INTERVAL);
            }
            Err(error) => return Err(error),
        }
    }
}

/// One live pairing of controller and ranker process.
pub struct Session {
    pub process: Box<dyn BackendProcess>,
    pub controller: SessionController<Box<dyn SearchBackend>>,
}

/// Spawns the backend, connects, and builds the candidate set to completion.
/// Only a session that got this far is eligible for hotkey reuse; that is
/// the "channel connected" gate.
pub fn establish_session(
    spawner: &dyn BackendSpawner,
    sources: Vec<Box<dyn LaunchableSource>>,
    launcher: Box<dyn TargetLauncher>,
    resolver: PathResolver,
    registry_path: PathBuf,
) -> Result<Session, ActivationError> {
    let (mut process, channel) = spawner.spawn()?;
    let mut controller = SessionController::new(channel, sources, launcher, resolver, registry_path);
    if let Err(error) = controller.build_candidates() {
        process.terminate();
        return Err(ActivationError::Session(error));
    }
    Ok(Session {
        process,
        controller,
    })
}

#[derive(Debug, PartialEq, Eq)]
pub enum Activation {
    /// Caller should spawn a session off-thread and report back with
    /// `complete_spawn` or `fail_spawn`.
    SpawnNew,
    /// A live session exists; bring its surface forward instead.
    Reuse { pid: u32 },
    /// A spawn is already pending; this press is absorbed.
    InFlight,
    /// Shutting down; activations are ignored.
    Ignored,
}

enum MachineState {
    Idle,
    Spawning,
    Active(Session),
    ShuttingDown,
}

/// Owns the backend session across repeated asynchronous hotkey triggers.
/// Reuse is gated on a fully established session, never on a bare process
/// handle, which closes the near-simultaneous-activation race.
pub struct ActivationMachine {
    state: MachineState,
}

impl Default for ActivationMachine {
    fn default() -> Self {
        Self {
            state: MachineState::Idle,
        }
    }
}

impl ActivationMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_activate(&mut self) -> Activation {
        match std::mem::replace(&mut self.state, MachineState::Idle) {
            MachineState::Idle => {
                self.state = MachineState::Spawning;
                Activation::SpawnNew
            }
            MachineState::Spawning => {
                self.state = MachineState::Spawning;
                Activation::InFlight
            }
            MachineState::Active(mut session) => {
                if session.process.is_alive() {
                    let pid = session.process.pid();
                    self.state = MachineState::Active(session);
                    Activation::Reuse { pid }
                } else {
                    // Backend death is only noticed here, on the next press.
                    session.process.terminate();
                    self.state = MachineState::Spawning;
                    Activation::SpawnNew
                }
            }
            MachineState::ShuttingDown => {
                self.state = MachineState::ShuttingDown;
                Activation::Ignored
            }
        }
    }

    pub fn complete_spawn(&mut self, session: Session) {
        if matches!(self.state, MachineState::Spawning) {
            self.state = MachineState::Active(session);
        } else {
            // No spawn pending (shutdown or a caller bug raced this
            // completion); reap the backend instead of leaking it.
            let mut session = session;
            session.process.terminate();
        }
    }

    pub fn fail_spawn(&mut self) {
        if matches!(self.state, MachineState::Spawning) {
            self.state = MachineState::Idle;
        }
    }

    /// Channel failure is fatal to the session; the next activation starts
    /// over with a fresh spawn.
    pub fn on_session_lost(&mut self) {
        if let MachineState::Active(session) =
            std::mem::replace(&mut self.state, MachineState::Idle)
        {
            let mut session = session;
            session.process.terminate();
        }
    }

    pub fn shutdown(&mut self) {
        if let MachineState::Active(session) =
            std::mem::replace(&mut self.state, MachineState::ShuttingDown)
        {
            let mut session = session;
            session.process.terminate();
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        match &mut self.state {
            MachineState::Active(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, MachineState::Active(_))
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, MachineState::Idle)
    }
}
