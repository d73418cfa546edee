use crate::adjacency::{write_adjacency, View};
use crate::config::SessionConfig;
use crate::debugger::{Breakpoint, Debugger, StopEvent, StopReason};
use crate::typedef::*;
use std::io::Write;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
enum State {
    NotStarted,
    Stopped(StopEvent),
    Finished(StopEvent),
}

/// What happened during a session
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Report {
    /// The locations of all breakpoint hits, in the order they happened
    pub hits: Vec<String>,
    /// Configured breakpoint locations that were never hit
    pub unhit: Vec<String>,
    /// The stop that ended the debuggee, if it ended
    pub outcome: Option<StopEvent>,
}

impl Report {
    /// The exit code of the debuggee, if it exited on its own
    pub fn exit_code(&self) -> Option<i32> {
        match self.outcome {
            Some(StopEvent {
                reason: StopReason::Exited(code),
                ..
            }) => Some(code),
            _ => None,
        }
    }

    /// The status to exit with: the debuggee's exit code, `128 + signal` when a signal
    /// killed it, and 1 when it never finished
    pub fn exit_status(&self) -> i32 {
        match self.outcome.as_ref().map(|event| &event.reason) {
            Some(StopReason::Exited(code)) => *code,
            Some(StopReason::Killed(signal)) => signal_number(signal).map_or(1, |n| 128 + n),
            _ => 1,
        }
    }
}

fn signal_number(name: &str) -> Option<i32> {
    let number = match name {
        "SIGHUP" => 1,
        "SIGINT" => 2,
        "SIGQUIT" => 3,
        "SIGILL" => 4,
        "SIGTRAP" => 5,
        "SIGABRT" => 6,
        "SIGBUS" => 7,
        "SIGFPE" => 8,
        "SIGKILL" => 9,
        "SIGSEGV" => 11,
        "SIGPIPE" => 13,
        "SIGALRM" => 14,
        "SIGTERM" => 15,
        _ => return None,
    };

    Some(number)
}

/// A debugging session over a single run of the debuggee
///
/// Starting the session inserts every configured breakpoint in order and runs the
/// debuggee with its input redirected. From then on every stop is recorded until the
/// debuggee is gone.
pub struct Session<D: Debugger> {
    debugger: D,
    config: SessionConfig,
    breakpoints: Vec<Breakpoint>,
    stops: Vec<StopEvent>,
    state: State,
}

impl<D: Debugger> Session<D> {
    /// Creates a session that has not been started yet
    pub fn new(debugger: D, config: SessionConfig) -> Session<D> {
        Session {
            debugger,
            config,
            breakpoints: Vec::new(),
            stops: Vec::new(),
            state: State::NotStarted,
        }
    }

    /// The configuration of this session
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The underlying debugger
    pub fn debugger(&self) -> &D {
        &self.debugger
    }

    /// The breakpoints inserted so far
    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    /// Every stop so far, in order
    pub fn stops(&self) -> &[StopEvent] {
        &self.stops
    }

    /// The stop the debuggee is currently suspended at
    pub fn current(&self) -> Option<&StopEvent> {
        match self.state {
            State::Stopped(ref event) => Some(event),
            _ => None,
        }
    }

    /// Whether the debuggee is gone
    pub fn is_finished(&self) -> bool {
        match self.state {
            State::Finished(_) => true,
            _ => false,
        }
    }

    /// The configured location of the breakpoint the debuggee is suspended at
    pub fn current_location(&self) -> Option<&str> {
        let number = self.current()?.breakpoint()?;
        self.location_of(number)
    }

    /// The configured location of breakpoint `number`
    pub fn location_of(&self, number: BreakpointNumber) -> Option<&str> {
        self.breakpoints
            .iter()
            .find(|b| b.number == number)
            .map(|b| b.location.as_str())
    }

    /// Inserts the breakpoints, starts the debuggee and waits for the first stop
    pub fn start(&mut self) -> Result<&StopEvent> {
        ensure!(self.state == State::NotStarted, InspectError::AlreadyStarted);

        for location in &self.config.breakpoints {
            let breakpoint = self.debugger.insert_breakpoint(location)?;

            info!(
                number = breakpoint.number,
                location = %breakpoint.location,
                "breakpoint inserted"
            );

            self.breakpoints.push(breakpoint);
        }

        if let Some(ref input) = self.config.input {
            info!(input = %input.display(), "starting debuggee");
        } else {
            info!("starting debuggee");
        }

        let event = self.debugger.run(self.config.input.as_deref())?;
        Ok(self.record(event))
    }

    /// Resumes the debuggee until it stops again
    pub fn resume(&mut self) -> Result<&StopEvent> {
        self.ensure_stopped()?;

        let event = self.debugger.resume()?;
        Ok(self.record(event))
    }

    /// Writes the adjacency list of `view` as currently held by the debuggee
    pub fn dump<W: Write + ?Sized>(&mut self, view: View, out: &mut W) -> Result<usize> {
        self.ensure_stopped()?;

        write_adjacency(&mut self.debugger, &self.config.symbols, view, out)
    }

    /// Evaluates `expression` in the current frame
    pub fn evaluate(&mut self, expression: &str) -> Result<String> {
        self.ensure_stopped()?;

        self.debugger.evaluate(expression)
    }

    /// Drains everything the debuggee printed since the last call
    pub fn take_program_output(&mut self) -> Vec<String> {
        self.debugger.take_program_output()
    }

    /// Summarizes the session so far
    pub fn report(&self) -> Report {
        let hits: Vec<String> = self
            .stops
            .iter()
            .filter_map(StopEvent::breakpoint)
            .filter_map(|number| self.location_of(number))
            .map(String::from)
            .collect();

        let unhit = self
            .breakpoints
            .iter()
            .map(|b| &b.location)
            .filter(|location| !hits.contains(*location))
            .cloned()
            .collect();

        let outcome = match self.state {
            State::Finished(ref event) => Some(event.clone()),
            _ => None,
        };

        Report {
            hits,
            unhit,
            outcome,
        }
    }

    /// Runs the debuggee to its end without interaction
    ///
    /// At every breakpoint hit, each configured dump for that location is written to
    /// `out` along with anything the debuggee printed. With `strict` set, breakpoints
    /// that were never hit turn into an error.
    pub fn run_batch<W: Write + ?Sized>(&mut self, out: &mut W) -> Result<Report> {
        if self.state == State::NotStarted {
            self.start()?;
        }

        loop {
            for line in self.take_program_output() {
                writeln!(out, "{}", line)?;
            }

            let event = match self.state {
                State::Stopped(ref event) => event.clone(),
                _ => break,
            };

            let location = self.current_location().map(String::from);
            let dumps: Vec<View> = self
                .config
                .dumps
                .iter()
                .filter(|dump| Some(&dump.at) == location.as_ref())
                .map(|dump| dump.view)
                .collect();

            for view in dumps {
                writeln!(out, "-- {} adjacency at {}", view, event)?;
                self.dump(view, out)?;
            }

            self.resume()?;
        }

        let report = self.report();

        if !report.unhit.is_empty() {
            warn!(unhit = ?report.unhit, "some breakpoints were never hit");

            ensure!(
                !self.config.strict,
                InspectError::BreakpointsNotHit {
                    locations: report.unhit.join(", "),
                }
            );
        }

        Ok(report)
    }

    /// Terminates the debugger
    pub fn finish(mut self) -> Result<Report> {
        let report = self.report();
        self.debugger.shutdown()?;

        Ok(report)
    }

    fn ensure_stopped(&self) -> Result<()> {
        match self.state {
            State::Stopped(_) => Ok(()),
            State::NotStarted => bail!(InspectError::NotStarted),
            State::Finished(_) => bail!(InspectError::Exited),
        }
    }

    fn record(&mut self, event: StopEvent) -> &StopEvent {
        info!(%event, "debuggee stopped");

        self.stops.push(event.clone());

        self.state = if event.is_final() {
            State::Finished(event)
        } else {
            State::Stopped(event)
        };

        &self.stops[self.stops.len() - 1]
    }
}
