use crate::config::GdbConfig;
use crate::consts::*;
use crate::debugger::{Breakpoint, Debugger, StopEvent};
use crate::memory::{element_expr, parse_integer, Memory};
use crate::mi::{Channel, Command};
use crate::typedef::*;
use failure::ResultExt;
use std::{
    io::{BufRead, BufReader, Write},
    path::Path,
    process::{Child, ChildStdin, ChildStdout, Command as Process, Stdio},
};
use tracing::{debug, info, warn};

/// A gdb driven over GDB/MI
///
/// [`launch`](#method.launch) spawns a gdb process and owns it; [`over`](#method.over)
/// speaks to whatever is on the other end of a pair of streams.
pub struct Gdb<R = BufReader<ChildStdout>, W = ChildStdin> {
    child: Option<Child>,
    channel: Channel<R, W>,
    running: bool,
}

impl Gdb {
    /// Starts gdb and loads `program` into it
    pub fn launch(config: &GdbConfig, program: &Path) -> Result<Gdb> {
        info!(gdb = %config.path.display(), program = %program.display(), "launching debugger");

        let mut child = Process::new(&config.path)
            .arg("--interpreter=mi")
            .arg("--quiet")
            .arg("--nx")
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|_| format!("unable to start {}", config.path.display()))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| format_err!("no stdin handle for the debugger"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| format_err!("no stdout handle for the debugger"))?;

        let mut gdb = Gdb::over(BufReader::new(stdout), stdin);
        gdb.child = Some(child);
        gdb.load(program)?;

        Ok(gdb)
    }
}

impl<R: BufRead, W: Write> Gdb<R, W> {
    /// Speaks MI to a gdb reading `writer` and printing to `reader`
    pub fn over(reader: R, writer: W) -> Gdb<R, W> {
        Gdb {
            child: None,
            channel: Channel::new(reader, writer),
            running: true,
        }
    }

    /// Sets gdb up for a scripted session and loads `program` into it
    pub fn load(&mut self, program: &Path) -> Result<()> {
        self.channel.execute(&Command::gdb_set("confirm", "off"))?;
        self.channel
            .execute(&Command::gdb_set("startup-with-shell", "on"))?;
        self.channel
            .execute(&Command::file_exec_and_symbols(program))
            .with_context(|_| format!("unable to load {}", program.display()))?;

        Ok(())
    }

    /// The channel to gdb
    pub fn channel(&self) -> &Channel<R, W> {
        &self.channel
    }

    fn wait_for_stop(&mut self) -> Result<StopEvent> {
        let results = self.channel.wait_for_stop()?;
        let event = StopEvent::from_mi(&results)?;

        debug!(%event, "stopped");

        Ok(event)
    }
}

impl<R: BufRead, W: Write> Memory for Gdb<R, W> {
    fn resolve(&mut self, name: &str) -> Result<i64> {
        let value = self.evaluate(name)?;
        parse_integer(name, &value)
    }

    fn index(&mut self, array: &str, path: &[usize]) -> Result<i64> {
        let expr = element_expr(array, path);
        let value = self.evaluate(&expr)?;
        parse_integer(&expr, &value)
    }
}

impl<R: BufRead, W: Write> Debugger for Gdb<R, W> {
    fn insert_breakpoint(&mut self, location: &str) -> Result<Breakpoint> {
        let (_, results) = self.channel.execute(&Command::break_insert(location))?;
        let bkpt = results.require("bkpt")?;

        let number = bkpt
            .get_str("number")
            .ok_or_else(|| InspectError::MissingField {
                field: "bkpt.number".into(),
            })?;
        let number = number
            .parse::<BreakpointNumber>()
            .map_err(|_| InspectError::MalformedRecord {
                line: format!("number={:?}", number),
            })?;

        Ok(Breakpoint {
            number,
            location: location.into(),
            func: bkpt.get_str("func").map(String::from),
        })
    }

    fn run(&mut self, input: Option<&Path>) -> Result<StopEvent> {
        let input = input.unwrap_or_else(|| Path::new(NULL_INPUT));

        self.channel.execute(&Command::redirect_stdin(input))?;
        self.channel.execute(&Command::exec_run())?;
        self.wait_for_stop()
    }

    fn resume(&mut self) -> Result<StopEvent> {
        self.channel.execute(&Command::exec_continue())?;
        self.wait_for_stop()
    }

    fn evaluate(&mut self, expression: &str) -> Result<String> {
        let (_, results) = self.channel.execute(&Command::evaluate(expression))?;
        Ok(results.require_str("value")?.into())
    }

    fn shutdown(&mut self) -> Result<()> {
        if !self.running {
            return Ok(());
        }

        self.running = false;
        self.channel.execute(&Command::gdb_exit())?;

        if let Some(ref mut child) = self.child {
            let status = child.wait()?;
            debug!(%status, "debugger exited");
        }

        Ok(())
    }

    fn take_program_output(&mut self) -> Vec<String> {
        self.channel.take_program_output()
    }
}

impl<R, W> Drop for Gdb<R, W> {
    fn drop(&mut self) {
        if !self.running {
            return;
        }

        if let Some(ref mut child) = self.child {
            if let Err(e) = child.kill() {
                warn!(error = %e, "unable to kill the debugger");
            }

            let _ = child.wait();
        }
    }
}
