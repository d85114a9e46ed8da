//! Process executor.
//!
//! Runs the compiler once per unit, optionally under a leak-checking
//! supervisor, captures stdout, and classifies how the process ended.
//! Abnormal terminations become an [`ExecutionFault`]; everything else is
//! handed to the decoder.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::Duration;

use kantan_mi::{decode, DecodeFault, DecodeMode, Decoded};

pub mod reaper;

/// Exit code the leak-checking supervisor reports when it found leaks.
pub const LEAK_EXIT_CODE: i32 = 255;

const SIGABRT: i32 = 6;
const SIGSEGV: i32 = 11;

/// Run the compiler under a leak-checking supervisor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeakCheck {
    /// Supervisor program, `valgrind` unless overridden.
    pub supervisor: PathBuf,
    /// Extra arguments placed before the supervisor's own flags.
    pub supervisor_args: Vec<OsString>,
    pub suppressions: Option<PathBuf>,
}

impl Default for LeakCheck {
    fn default() -> Self {
        LeakCheck {
            supervisor: PathBuf::from("valgrind"),
            supervisor_args: Vec::new(),
            suppressions: None,
        }
    }
}

impl LeakCheck {
    /// Where the supervisor writes its report for a unit: `<base>.xml`.
    pub fn report_path(base: &Path) -> PathBuf {
        let mut path = base.as_os_str().to_owned();
        path.push(".xml");
        PathBuf::from(path)
    }

    fn args(&self, report: &Path) -> Vec<OsString> {
        let mut args = self.supervisor_args.clone();
        if let Some(suppressions) = &self.suppressions {
            let mut arg = OsString::from("--suppressions=");
            arg.push(suppressions);
            args.push(arg);
        }
        args.push("--leak-check=full".into());
        args.push(format!("--error-exitcode={LEAK_EXIT_CODE}").into());
        args.push("--xml=yes".into());
        let mut xml_file = OsString::from("--xml-file=");
        xml_file.push(report);
        args.push(xml_file);
        args
    }
}

/// One compiler invocation.
#[derive(Clone, Debug)]
pub struct ExecRequest<'a> {
    /// Extension-less path identifying the unit; the leak report goes next
    /// to it.
    pub base: &'a Path,
    /// Compiler options, placed before the input files.
    pub args: &'a [String],
    pub inputs: &'a [PathBuf],
    pub mode: DecodeMode,
    /// Accepted for callers that want to bound a run. Not enforced yet, so a
    /// hung compiler hangs its worker.
    pub timeout: Option<Duration>,
}

/// The full command line of an invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLine {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// How a process ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Termination {
    Exited(i32),
    Signaled(i32),
    /// Neither an exit code nor a signal is available.
    Unknown,
}

impl Termination {
    pub fn from_status(status: &ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Termination::Exited(code);
        }
        match termination_signal(status) {
            Some(signal) => Termination::Signaled(signal),
            None => Termination::Unknown,
        }
    }

    pub fn exit_code(self) -> Option<i32> {
        match self {
            Termination::Exited(code) => Some(code),
            Termination::Signaled(_) | Termination::Unknown => None,
        }
    }
}

#[cfg(unix)]
fn termination_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn termination_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

/// Abnormal ways an invocation can end.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FaultKind {
    MemoryLeaks,
    Crashed,
    Aborted,
    Signal(i32),
    TimedOut,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::MemoryLeaks => write!(f, "memory leaks"),
            FaultKind::Crashed => write!(f, "crashed"),
            FaultKind::Aborted => write!(f, "aborted"),
            FaultKind::Signal(signal) => write!(f, "killed by signal {signal}"),
            FaultKind::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Classify a termination. The leak exit code only means something when the
/// supervisor was in charge.
pub fn classify(termination: Termination, leak_checked: bool) -> Option<FaultKind> {
    match termination {
        Termination::Exited(LEAK_EXIT_CODE) if leak_checked => Some(FaultKind::MemoryLeaks),
        Termination::Exited(_) | Termination::Unknown => None,
        Termination::Signaled(SIGSEGV) => Some(FaultKind::Crashed),
        Termination::Signaled(SIGABRT) => Some(FaultKind::Aborted),
        Termination::Signaled(signal) => Some(FaultKind::Signal(signal)),
    }
}

/// The compiler ended abnormally.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct ExecutionFault {
    pub kind: FaultKind,
    /// Whatever the process printed before it ended.
    pub raw: String,
}

/// The compiler could not be started at all.
#[derive(Debug, thiserror::Error)]
#[error("could not execute '{}': {}", .program.display(), .source)]
pub struct SpawnError {
    pub program: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// What one invocation produced.
#[derive(Clone, Debug, PartialEq)]
pub enum ExecutionResult {
    Output(Decoded),
    Fault(ExecutionFault),
    DecodeFault(DecodeFault),
}

impl ExecutionResult {
    /// Captured stdout, whatever the outcome.
    pub fn raw(&self) -> &str {
        match self {
            ExecutionResult::Output(decoded) => decoded.raw(),
            ExecutionResult::Fault(fault) => &fault.raw,
            ExecutionResult::DecodeFault(fault) => &fault.raw,
        }
    }
}

/// Something that can run one compiler invocation.
///
/// Shared by every worker, hence `Sync`.
pub trait Execute: Sync {
    fn execute(&self, request: &ExecRequest<'_>) -> Result<ExecutionResult, SpawnError>;
}

/// Runs the real compiler binary.
#[derive(Clone, Debug)]
pub struct Executor {
    compiler: PathBuf,
    leak_check: Option<LeakCheck>,
}

impl Executor {
    pub fn new(compiler: impl Into<PathBuf>) -> Self {
        Executor {
            compiler: compiler.into(),
            leak_check: None,
        }
    }

    #[must_use]
    pub fn with_leak_check(mut self, leak_check: LeakCheck) -> Self {
        self.leak_check = Some(leak_check);
        self
    }

    pub fn compiler(&self) -> &Path {
        &self.compiler
    }

    pub fn leak_check(&self) -> Option<&LeakCheck> {
        self.leak_check.as_ref()
    }

    /// Build the command line for `request`: the supervisor and its flags
    /// (when leak checking), then the compiler, its options and the inputs.
    pub fn command_line(&self, request: &ExecRequest<'_>) -> CommandLine {
        let compiler_args = request
            .args
            .iter()
            .map(OsString::from)
            .chain(request.inputs.iter().map(OsString::from));

        match &self.leak_check {
            Some(leak_check) => {
                let report = LeakCheck::report_path(request.base);
                let mut args = leak_check.args(&report);
                args.push(self.compiler.clone().into_os_string());
                args.extend(compiler_args);
                CommandLine {
                    program: leak_check.supervisor.clone(),
                    args,
                }
            }
            None => CommandLine {
                program: self.compiler.clone(),
                args: compiler_args.collect(),
            },
        }
    }
}

impl Execute for Executor {
    fn execute(&self, request: &ExecRequest<'_>) -> Result<ExecutionResult, SpawnError> {
        if let Some(timeout) = request.timeout {
            tracing::debug!(?timeout, "timeout requested but not enforced");
        }

        let command_line = self.command_line(request);
        tracing::debug!(command = %command_line, "spawning compiler");

        let output = Command::new(&command_line.program)
            .args(&command_line.args)
            .output()
            .map_err(|source| SpawnError {
                program: command_line.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.stderr.is_empty() {
            tracing::debug!(stderr = %String::from_utf8_lossy(&output.stderr), "compiler stderr");
        }

        let termination = Termination::from_status(&output.status);
        let fault = classify(termination, self.leak_check.is_some());
        tracing::debug!(?termination, ?fault, "compiler finished");

        if self.leak_check.is_some() {
            reaper::reap(&LeakCheck::report_path(request.base), fault.is_some());
        }

        Ok(match fault {
            Some(kind) => ExecutionResult::Fault(ExecutionFault { kind, raw: stdout }),
            None => match decode(stdout, termination.exit_code(), request.mode) {
                Ok(decoded) => ExecutionResult::Output(decoded),
                Err(fault) => ExecutionResult::DecodeFault(fault),
            },
        })
    }
}
