use crate::memory::Memory;
use crate::mi::Results;
use crate::typedef::*;
use std::{fmt, path::Path};

/// A breakpoint as acknowledged by the debugger
#[derive(Debug, PartialEq, Clone)]
pub struct Breakpoint {
    /// The number the debugger assigned
    pub number: BreakpointNumber,
    /// The location it was requested at
    pub location: String,
    /// The function it resolved to, if the debugger reported one
    pub func: Option<String>,
}

/// The innermost frame of a stopped debuggee
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Frame {
    /// The function being executed
    pub func: Option<String>,
    /// The source file
    pub file: Option<String>,
    /// The line within `file`
    pub line: Option<u32>,
}

/// Why the debuggee stopped
#[derive(Debug, PartialEq, Clone)]
pub enum StopReason {
    /// Execution reached a breakpoint
    Breakpoint(BreakpointNumber),
    /// The debuggee terminated with the given exit code
    Exited(i32),
    /// The debuggee received a signal, e.g. `SIGSEGV`, and is still around
    Signal(String),
    /// The debuggee was terminated by a signal
    Killed(String),
    /// Anything else the debugger reported
    Other(String),
}

/// A suspension of the debuggee
#[derive(Debug, PartialEq, Clone)]
pub struct StopEvent {
    /// Why it stopped
    pub reason: StopReason,
    /// Where it stopped, unless it is gone
    pub frame: Option<Frame>,
}

impl StopEvent {
    /// Whether the debuggee is gone after this stop
    pub fn is_final(&self) -> bool {
        match self.reason {
            StopReason::Exited(_) | StopReason::Killed(_) => true,
            _ => false,
        }
    }

    /// The number of the breakpoint that was hit, if any
    pub fn breakpoint(&self) -> Option<BreakpointNumber> {
        match self.reason {
            StopReason::Breakpoint(number) => Some(number),
            _ => None,
        }
    }

    /// Decodes the payload of a GDB/MI `*stopped` record
    pub fn from_mi(results: &Results) -> Result<StopEvent> {
        let reason = match results.get_str("reason") {
            Some("breakpoint-hit") => {
                let number = results.require_str("bkptno")?;
                let number = number.parse::<BreakpointNumber>().map_err(|_| InspectError::MalformedRecord {
                    line: format!("bkptno={:?}", number),
                })?;

                StopReason::Breakpoint(number)
            }
            Some("exited-normally") => StopReason::Exited(0),
            Some("exited") => {
                let code = results.require_str("exit-code")?;

                // gdb prints the exit code in octal
                let code = i32::from_str_radix(code, 8).map_err(|_| InspectError::MalformedRecord {
                    line: format!("exit-code={:?}", code),
                })?;

                StopReason::Exited(code)
            }
            Some("exited-signalled") => {
                StopReason::Killed(results.get_str("signal-name").unwrap_or("unknown").into())
            }
            Some("signal-received") => {
                StopReason::Signal(results.get_str("signal-name").unwrap_or("unknown").into())
            }
            Some(other) => StopReason::Other(other.into()),
            None => StopReason::Other("unknown".into()),
        };

        let frame = results.get("frame").map(|frame| Frame {
            func: frame.get_str("func").map(String::from),
            file: frame.get_str("file").map(String::from),
            line: frame.get_str("line").and_then(|line| line.parse().ok()),
        });

        let frame = match reason {
            StopReason::Exited(_) | StopReason::Killed(_) => None,
            _ => frame,
        };

        Ok(StopEvent { reason, frame })
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ()", self.func.as_ref().map_or("??", String::as_str))?;

        if let Some(ref file) = self.file {
            write!(f, " at {}", file)?;

            if let Some(line) = self.line {
                write!(f, ":{}", line)?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for StopEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            StopReason::Breakpoint(number) => write!(f, "Breakpoint {}", number)?,
            StopReason::Exited(0) => return write!(f, "Program exited normally"),
            StopReason::Exited(code) => return write!(f, "Program exited with code {}", code),
            StopReason::Signal(ref signal) => write!(f, "Program received signal {}", signal)?,
            StopReason::Killed(ref signal) => {
                return write!(f, "Program terminated with signal {}", signal)
            }
            StopReason::Other(ref reason) => write!(f, "Stopped ({})", reason)?,
        }

        if let Some(ref frame) = self.frame {
            write!(f, ", {}", frame)?;
        }

        Ok(())
    }
}

/// Control over a debugger session with a single debuggee
///
/// This is the seam between the session logic and a concrete debugger. Memory reads go
/// through the [`Memory`](trait.Memory.html) supertrait.
pub trait Debugger: Memory {
    /// Inserts a breakpoint at `location`, a function name or `file:line`
    fn insert_breakpoint(&mut self, location: &str) -> Result<Breakpoint>;

    /// Starts the debuggee, optionally feeding `input` to its stdin, and waits for it
    /// to stop
    fn run(&mut self, input: Option<&Path>) -> Result<StopEvent>;

    /// Resumes the stopped debuggee and waits for it to stop again
    fn resume(&mut self) -> Result<StopEvent>;

    /// Evaluates `expression` in the current frame and returns its printed value
    fn evaluate(&mut self, expression: &str) -> Result<String>;

    /// Terminates the debugger
    fn shutdown(&mut self) -> Result<()>;

    /// Drains everything the debuggee printed since the last call
    fn take_program_output(&mut self) -> Vec<String> {
        Vec::new()
    }
}
