use crate::typedef::*;
use std::fmt;

/// A value carried by a result
#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    /// A C string constant
    Const(String),
    /// `{name=value,...}`
    Tuple(Vec<(String, Value)>),
    /// `[value,...]`, a list of results is stored as a list of single field tuples
    List(Vec<Value>),
}

impl Value {
    /// The string of a constant
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Const(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up a field of a tuple
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Tuple(fields) => lookup(fields, name),
            _ => None,
        }
    }

    /// Looks up a constant field of a tuple
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }
}

fn lookup<'a>(fields: &'a [(String, Value)], name: &str) -> Option<&'a Value> {
    fields
        .iter()
        .find(|(field, _)| field == name)
        .map(|(_, value)| value)
}

/// The named values attached to a record
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Results(pub Vec<(String, Value)>);

impl Results {
    /// Looks up a result by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        lookup(&self.0, name)
    }

    /// Looks up a constant result by name
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Like [`get`](#method.get) but fails when the result is missing
    pub fn require(&self, name: &str) -> Result<&Value> {
        match self.get(name) {
            Some(value) => Ok(value),
            None => bail!(InspectError::MissingField { field: name.into() }),
        }
    }

    /// Like [`get_str`](#method.get_str) but fails when the result is missing
    pub fn require_str(&self, name: &str) -> Result<&str> {
        match self.get_str(name) {
            Some(value) => Ok(value),
            None => bail!(InspectError::MissingField { field: name.into() }),
        }
    }
}

/// The class of a result record
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ResultClass {
    /// `^done`
    Done,
    /// `^running`
    Running,
    /// `^connected`
    Connected,
    /// `^error`
    Error,
    /// `^exit`
    Exit,
}

/// The kind of an asynchronous record
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum AsyncKind {
    /// `*`, execution state changes of the target
    Exec,
    /// `+`, progress of long running operations
    Status,
    /// `=`, supplementary information
    Notify,
}

/// The kind of a stream record
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum StreamKind {
    /// `~`, output of the CLI console
    Console,
    /// `@`, output of the target
    Target,
    /// `&`, gdb's internal log
    Log,
}

/// One line of GDB/MI output
#[derive(Debug, PartialEq, Clone)]
pub enum Record {
    /// The answer to a command
    Result {
        /// The token of the command this answers
        token: Option<u64>,
        /// How the command went
        class: ResultClass,
        /// The payload
        results: Results,
    },
    /// An out of band notification
    Async {
        /// The token of the command that caused it, if any
        token: Option<u64>,
        /// Which stream of notifications it belongs to
        kind: AsyncKind,
        /// What happened, e.g. `stopped`
        class: String,
        /// The payload
        results: Results,
    },
    /// Text emitted by gdb
    Stream {
        /// Where the text came from
        kind: StreamKind,
        /// The unescaped text
        text: String,
    },
    /// The `(gdb)` prompt that terminates a batch of output
    Prompt,
    /// Anything that is not MI, usually output of the debuggee itself
    Unrecognized(String),
}

impl Record {
    /// Parses a single line of GDB/MI output
    ///
    /// Lines that do not follow the MI grammar come back as
    /// [`Record::Unrecognized`](#variant.Unrecognized) instead of failing, since the
    /// debuggee shares gdb's output stream.
    pub fn parse(line: &str) -> Record {
        let line = line.trim_end_matches(&['\r', '\n'][..]);

        if line.trim_end() == "(gdb)" {
            return Record::Prompt;
        }

        Parser::new(line)
            .record()
            .unwrap_or_else(|| Record::Unrecognized(line.into()))
    }

    /// Separates debuggee output from an MI record printed right behind it on the same
    /// line, which happens when the debuggee's last write did not end in a newline
    ///
    /// Only records that drive the command flow are looked for: results, `*running`,
    /// `*stopped` and streams. `pending` is the token of the command awaiting its
    /// result; when the output ends in its digits they are given back to the result.
    pub fn split_output(line: &str, pending: Option<u64>) -> Option<(String, Record)> {
        let line = line.trim_end_matches(&['\r', '\n'][..]);

        for (start, c) in line.char_indices().skip(1) {
            if !"^*~@&".contains(c) {
                continue;
            }

            let record = match Parser::new(&line[start..]).record() {
                Some(record) => record,
                None => continue,
            };
            let output = &line[..start];

            match record {
                Record::Result {
                    token: None,
                    class,
                    results,
                } => {
                    let own = pending.map(|token| token.to_string()).unwrap_or_default();

                    if !own.is_empty() && output.ends_with(&own) {
                        let record = Record::Result {
                            token: pending,
                            class,
                            results,
                        };

                        return Some((output[..output.len() - own.len()].into(), record));
                    }

                    let record = Record::Result {
                        token: None,
                        class,
                        results,
                    };

                    return Some((output.into(), record));
                }
                Record::Async {
                    kind: AsyncKind::Exec,
                    class,
                    token,
                    results,
                } => {
                    if class == "running" || class == "stopped" {
                        let record = Record::Async {
                            kind: AsyncKind::Exec,
                            class,
                            token,
                            results,
                        };

                        return Some((output.into(), record));
                    }
                }
                Record::Stream { kind, text } => {
                    return Some((output.into(), Record::Stream { kind, text }));
                }
                _ => {}
            }
        }

        None
    }
}

impl fmt::Display for ResultClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResultClass::Done => "done",
            ResultClass::Running => "running",
            ResultClass::Connected => "connected",
            ResultClass::Error => "error",
            ResultClass::Exit => "exit",
        };

        write!(f, "{}", name)
    }
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Parser<'a> {
        Parser {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).cloned()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, c: u8) -> Option<()> {
        if self.peek() == Some(c) {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }

    fn at_end(&self) -> bool {
        self.pos == self.input.len()
    }

    fn record(&mut self) -> Option<Record> {
        let token = self.token();

        let record = match self.bump()? {
            b'^' => {
                let class = match self.word()?.as_str() {
                    "done" => ResultClass::Done,
                    "running" => ResultClass::Running,
                    "connected" => ResultClass::Connected,
                    "error" => ResultClass::Error,
                    "exit" => ResultClass::Exit,
                    _ => return None,
                };

                Record::Result {
                    token,
                    class,
                    results: self.trailing_results()?,
                }
            }
            c @ b'*' | c @ b'+' | c @ b'=' => {
                let kind = match c {
                    b'*' => AsyncKind::Exec,
                    b'+' => AsyncKind::Status,
                    _ => AsyncKind::Notify,
                };

                Record::Async {
                    token,
                    kind,
                    class: self.word()?,
                    results: self.trailing_results()?,
                }
            }
            c @ b'~' | c @ b'@' | c @ b'&' if token.is_none() => {
                let kind = match c {
                    b'~' => StreamKind::Console,
                    b'@' => StreamKind::Target,
                    _ => StreamKind::Log,
                };

                Record::Stream {
                    kind,
                    text: self.c_string()?,
                }
            }
            _ => return None,
        };

        if self.at_end() {
            Some(record)
        } else {
            None
        }
    }

    fn token(&mut self) -> Option<u64> {
        let start = self.pos;

        while let Some(b'0'..=b'9') = self.peek() {
            self.pos += 1;
        }

        if start == self.pos {
            return None;
        }

        std::str::from_utf8(&self.input[start..self.pos])
            .ok()
            .and_then(|digits| digits.parse().ok())
    }

    fn word(&mut self) -> Option<String> {
        let start = self.pos;

        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == b'-' || c == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }

        if start == self.pos {
            return None;
        }

        Some(String::from_utf8_lossy(&self.input[start..self.pos]).into_owned())
    }

    fn trailing_results(&mut self) -> Option<Results> {
        let mut results = Vec::new();

        while self.eat(b',').is_some() {
            results.push(self.result()?);
        }

        Some(Results(results))
    }

    fn result(&mut self) -> Option<(String, Value)> {
        let name = self.word()?;
        self.eat(b'=')?;
        Some((name, self.value()?))
    }

    fn value(&mut self) -> Option<Value> {
        match self.peek()? {
            b'"' => self.c_string().map(Value::Const),
            b'{' => {
                self.bump();
                let mut fields = Vec::new();

                if self.eat(b'}').is_some() {
                    return Some(Value::Tuple(fields));
                }

                loop {
                    fields.push(self.result()?);

                    match self.bump()? {
                        b',' => continue,
                        b'}' => return Some(Value::Tuple(fields)),
                        _ => return None,
                    }
                }
            }
            b'[' => {
                self.bump();
                let mut items = Vec::new();

                if self.eat(b']').is_some() {
                    return Some(Value::List(items));
                }

                loop {
                    let item = if let Some(b'"') | Some(b'{') | Some(b'[') = self.peek() {
                        self.value()?
                    } else {
                        let (name, value) = self.result()?;
                        Value::Tuple(vec![(name, value)])
                    };

                    items.push(item);

                    match self.bump()? {
                        b',' => continue,
                        b']' => return Some(Value::List(items)),
                        _ => return None,
                    }
                }
            }
            _ => None,
        }
    }

    fn c_string(&mut self) -> Option<String> {
        self.eat(b'"')?;

        let mut bytes = Vec::new();

        loop {
            match self.bump()? {
                b'"' => break,
                b'\\' => {
                    let escaped = match self.bump()? {
                        b'n' => b'\n',
                        b't' => b'\t',
                        b'r' => b'\r',
                        b'a' => 0x07,
                        b'b' => 0x08,
                        b'f' => 0x0c,
                        b'v' => 0x0b,
                        b'e' => 0x1b,
                        c @ b'0'..=b'7' => {
                            let mut code = u32::from(c - b'0');

                            for _ in 0..2 {
                                match self.peek() {
                                    Some(d @ b'0'..=b'7') => {
                                        self.pos += 1;
                                        code = code * 8 + u32::from(d - b'0');
                                    }
                                    _ => break,
                                }
                            }

                            code as u8
                        }
                        other => other,
                    };

                    bytes.push(escaped);
                }
                c => bytes.push(c),
            }
        }

        Some(String::from_utf8_lossy(&bytes).into_owned())
    }
}
