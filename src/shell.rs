use crate::adjacency::View;
use crate::debugger::Debugger;
use crate::session::Session;
use crate::typedef::*;
use colored::*;
use rustyline::Editor;
use std::{io::Write, str::FromStr};
use tracing::debug;

/// A command typed at the prompt
#[derive(Debug, PartialEq, Clone)]
pub enum ShellCommand {
    /// Prints the list of commands
    Help,
    /// Resumes the debuggee
    Continue,
    /// Dumps an adjacency list
    Dump(View),
    /// Evaluates an expression
    Print(String),
    /// Lists the breakpoints and the hits so far
    Info,
    /// Ends the session
    Quit,
    /// Does nothing
    Nothing,
}

impl FromStr for ShellCommand {
    type Err = ::failure::Error;

    fn from_str(s: &str) -> Result<ShellCommand> {
        let s = s.trim();
        let (name, rest) = match s.find(char::is_whitespace) {
            Some(i) => (&s[..i], s[i..].trim()),
            None => (s, ""),
        };

        let command = match name {
            "" => ShellCommand::Nothing,
            "help" | "h" => ShellCommand::Help,
            "continue" | "c" => ShellCommand::Continue,
            "adj" | "a" if rest.is_empty() => bail!("usage: adj <forward|reversed>"),
            "adj" | "a" => ShellCommand::Dump(rest.parse()?),
            "print" | "p" if rest.is_empty() => bail!("usage: print <expression>"),
            "print" | "p" => ShellCommand::Print(rest.into()),
            "info" | "i" => ShellCommand::Info,
            "quit" | "q" | "exit" => ShellCommand::Quit,
            other => bail!(
                "unknown command {:?}. Type \"help\" to show the list of commands",
                other
            ),
        };

        Ok(command)
    }
}

/// What the shell does after a command
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Flow {
    /// Keep prompting
    Prompt,
    /// The debuggee is gone
    Finished,
    /// The user asked to leave
    Quit,
}

/// Runs a single command against the session, writing everything it prints to `out`
pub fn execute<D, W>(
    session: &mut Session<D>,
    command: &ShellCommand,
    out: &mut W,
) -> Result<Flow>
where
    D: Debugger,
    W: Write + ?Sized,
{
    debug!(?command, "executing");

    match command {
        ShellCommand::Nothing => {}
        ShellCommand::Help => {
            writeln!(out, "Commands")?;
            writeln!(out)?;
            writeln!(out, "help\t\t- prints this message")?;
            writeln!(out, "continue\t- resumes the program until the next breakpoint")?;
            writeln!(out, "adj <view>\t- dumps the \"forward\" or \"reversed\" adjacency list")?;
            writeln!(out, "print <expr>\t- evaluates an expression in the current frame")?;
            writeln!(out, "info\t\t- lists the breakpoints and the hits so far")?;
            writeln!(out, "quit\t\t- exits the debugger")?;
        }
        ShellCommand::Continue => {
            session.resume()?;

            for line in session.take_program_output() {
                writeln!(out, "{}", line)?;
            }

            if let Some(event) = session.stops().last() {
                writeln!(out, "{}", event)?;
            }

            if session.is_finished() {
                return Ok(Flow::Finished);
            }
        }
        ShellCommand::Dump(view) => {
            session.dump(*view, out)?;
        }
        ShellCommand::Print(expression) => {
            let value = session.evaluate(expression)?;
            writeln!(out, "{} = {}", expression, value)?;
        }
        ShellCommand::Info => {
            let report = session.report();

            for breakpoint in session.breakpoints() {
                let hits = report
                    .hits
                    .iter()
                    .filter(|&hit| hit == &breakpoint.location)
                    .count();

                writeln!(
                    out,
                    "{}\t{}\t{}\thit {} time{}",
                    breakpoint.number,
                    breakpoint.location,
                    breakpoint.func.as_ref().map_or("?", String::as_str),
                    hits,
                    if hits == 1 { "" } else { "s" }
                )?;
            }
        }
        ShellCommand::Quit => return Ok(Flow::Quit),
    }

    Ok(Flow::Prompt)
}

/// An interactive prompt shown while the debuggee is suspended
pub struct Shell<'a, D: Debugger> {
    session: &'a mut Session<D>,
    editor: Editor<()>,
}

impl<'a, D: Debugger> Shell<'a, D> {
    /// Creates a shell over a started session
    pub fn new(session: &'a mut Session<D>) -> Shell<'a, D> {
        Shell {
            session,
            editor: Editor::<()>::new(),
        }
    }

    fn prompt(&self) -> String {
        let location = self
            .session
            .current_location()
            .map(String::from)
            .or_else(|| {
                self.session
                    .current()
                    .and_then(|event| event.frame.as_ref())
                    .and_then(|frame| frame.func.clone())
            })
            .unwrap_or_else(|| "??".into());

        format!("[{}] {} > ", location.red(), "adjdump".green())
    }

    /// Reads and executes commands until the debuggee is gone or the user quits
    pub fn run(&mut self) -> Result<Flow> {
        let stdout = std::io::stdout();

        for line in self.session.take_program_output() {
            println!("{}", line);
        }

        if let Some(event) = self.session.stops().last() {
            println!("{}", event.to_string().cyan());
        }

        if self.session.is_finished() {
            return Ok(Flow::Finished);
        }

        loop {
            let prompt = self.prompt();

            let input = match self.editor.readline(&prompt) {
                Ok(line) => line,
                Err(_) => return Ok(Flow::Quit),
            };

            self.editor.add_history_entry(input.trim());

            let result = input
                .parse::<ShellCommand>()
                .and_then(|command| execute(&mut *self.session, &command, &mut stdout.lock()));

            match result {
                Ok(Flow::Prompt) => {}
                Ok(flow) => return Ok(flow),
                Err(e) => eprintln!("{}", e.to_string().red()),
            }
        }
    }
}
