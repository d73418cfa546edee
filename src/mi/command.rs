use std::{fmt, path::Path};

/// A GDB/MI command, rendered without its token
#[derive(Debug, PartialEq, Clone)]
pub struct Command {
    operation: String,
    parameters: Vec<String>,
    verbatim: bool,
}

impl Command {
    /// A command running `operation`, which includes the leading dash
    pub fn new<S: Into<String>>(operation: S) -> Command {
        Command {
            operation: operation.into(),
            parameters: Vec::new(),
            verbatim: false,
        }
    }

    /// Appends a parameter
    pub fn arg<S: Into<String>>(mut self, parameter: S) -> Command {
        self.parameters.push(parameter.into());
        self
    }

    /// Sends the parameters as they are
    ///
    /// Commands backed by a CLI command get the rest of the line unparsed, so MI
    /// quoting would reach the CLI as literal quotes.
    pub fn verbatim(mut self) -> Command {
        self.verbatim = true;
        self
    }

    /// The operation, e.g. `-exec-run`
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// `-gdb-set <variable> <value>`
    pub fn gdb_set(variable: &str, value: &str) -> Command {
        Command::new("-gdb-set").arg(variable).arg(value)
    }

    /// `-file-exec-and-symbols <program>`
    pub fn file_exec_and_symbols(program: &Path) -> Command {
        Command::new("-file-exec-and-symbols").arg(program.to_string_lossy())
    }

    /// `-break-insert <location>`
    pub fn break_insert(location: &str) -> Command {
        Command::new("-break-insert").arg(location)
    }

    /// `-exec-arguments < <input>`, which makes the shell redirect stdin on the next run
    pub fn redirect_stdin(input: &Path) -> Command {
        Command::new("-exec-arguments")
            .arg("<")
            .arg(shell_quote(&input.to_string_lossy()))
            .verbatim()
    }

    /// `-exec-run`
    pub fn exec_run() -> Command {
        Command::new("-exec-run")
    }

    /// `-exec-continue`
    pub fn exec_continue() -> Command {
        Command::new("-exec-continue")
    }

    /// `-data-evaluate-expression <expression>`
    pub fn evaluate(expression: &str) -> Command {
        Command::new("-data-evaluate-expression").arg(expression)
    }

    /// `-gdb-exit`
    pub fn gdb_exit() -> Command {
        Command::new("-gdb-exit")
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.operation)?;

        for parameter in &self.parameters {
            if !self.verbatim && needs_quoting(parameter) {
                write!(f, " {}", quote(parameter))?;
            } else {
                write!(f, " {}", parameter)?;
            }
        }

        Ok(())
    }
}

fn needs_quoting(parameter: &str) -> bool {
    parameter.is_empty()
        || parameter
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '\\' || c == '\'')
}

fn quote(parameter: &str) -> String {
    let mut quoted = String::with_capacity(parameter.len() + 2);
    quoted.push('"');

    for c in parameter.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }

    quoted.push('"');
    quoted
}

fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+,:@%=".contains(c));

    if plain {
        return word.into();
    }

    format!("'{}'", word.replace('\'', "'\\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_parameters() {
        assert_eq!(Command::break_insert("find_sccs").to_string(), "-break-insert find_sccs");
        assert_eq!(
            Command::redirect_stdin(Path::new("cases/03")).to_string(),
            "-exec-arguments < cases/03"
        );
        assert_eq!(Command::exec_run().to_string(), "-exec-run");
    }

    #[test]
    fn quoted_parameters() {
        assert_eq!(
            Command::evaluate("adj_list[0][1]").to_string(),
            "-data-evaluate-expression adj_list[0][1]"
        );
        assert_eq!(
            Command::evaluate("*adj_list@n").to_string(),
            "-data-evaluate-expression *adj_list@n"
        );
        assert_eq!(
            Command::evaluate("n + 1").to_string(),
            "-data-evaluate-expression \"n + 1\""
        );
        assert_eq!(
            Command::evaluate("name == \"a\\b\"").to_string(),
            "-data-evaluate-expression \"name == \\\"a\\\\b\\\"\""
        );
        assert_eq!(Command::new("-x").arg("").to_string(), "-x \"\"");
    }

    #[test]
    fn input_paths_are_shell_quoted() {
        assert_eq!(
            Command::redirect_stdin(Path::new("cases/my case")).to_string(),
            "-exec-arguments < 'cases/my case'"
        );
        assert_eq!(
            Command::redirect_stdin(Path::new("it's")).to_string(),
            "-exec-arguments < 'it'\\''s'"
        );
        assert_eq!(
            Command::redirect_stdin(Path::new("/dev/null")).to_string(),
            "-exec-arguments < /dev/null"
        );
    }
}
