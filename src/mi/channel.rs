use crate::mi::{AsyncKind, Command, Record, ResultClass, Results, StreamKind};
use crate::typedef::*;
use std::{
    collections::VecDeque,
    io::{BufRead, Write},
};
use tracing::{debug, trace};

/// The command/response protocol spoken with a gdb running `--interpreter=mi`
///
/// Every command is sent with a fresh token and completes once the result record
/// carrying that token arrives. Stop notifications that show up in between are queued
/// for [`wait_for_stop`](#method.wait_for_stop); lines that are not MI are kept as
/// output of the debuggee.
pub struct Channel<R, W> {
    reader: R,
    writer: W,
    next_token: u64,
    stops: VecDeque<Results>,
    program_output: Vec<String>,
}

impl<R: BufRead, W: Write> Channel<R, W> {
    /// Speaks MI over the given pair of streams
    pub fn new(reader: R, writer: W) -> Channel<R, W> {
        Channel {
            reader,
            writer,
            next_token: 1,
            stops: VecDeque::new(),
            program_output: Vec::new(),
        }
    }

    /// Sends `command` and waits for its result
    ///
    /// An `^error` result turns into an error carrying gdb's message.
    pub fn execute(&mut self, command: &Command) -> Result<(ResultClass, Results)> {
        let token = self.next_token;
        self.send(command)?;

        loop {
            let record = self.read_record(Some(token))?;

            match self.reclaim_token(record, token) {
                Record::Result {
                    token: Some(t),
                    class,
                    results,
                } if t == token => {
                    trace!(token, %class, "command finished");

                    if class == ResultClass::Error {
                        let msg = results.get_str("msg").unwrap_or("unknown error");
                        bail!(InspectError::Gdb { msg: msg.into() });
                    }

                    return Ok((class, results));
                }
                record => self.dispatch(record),
            }
        }
    }

    /// Blocks until the debuggee stops and returns the payload of the `*stopped` record
    pub fn wait_for_stop(&mut self) -> Result<Results> {
        loop {
            if let Some(stop) = self.stops.pop_front() {
                return Ok(stop);
            }

            let record = self.read_record(None)?;
            self.dispatch(record);
        }
    }

    /// Drains everything the debuggee printed so far
    pub fn take_program_output(&mut self) -> Vec<String> {
        std::mem::replace(&mut self.program_output, Vec::new())
    }

    /// Writes `command` under a fresh token without waiting for its result
    pub fn send(&mut self, command: &Command) -> Result<()> {
        let token = self.next_token;
        self.next_token += 1;

        debug!(token, %command, "sending command");

        writeln!(self.writer, "{}{}", token, command)?;
        self.writer.flush()?;

        Ok(())
    }

    /// The stream commands are written to
    pub fn writer(&self) -> &W {
        &self.writer
    }

    fn read_record(&mut self, pending: Option<u64>) -> Result<Record> {
        let mut bytes = Vec::new();

        if self.reader.read_until(b'\n', &mut bytes)? == 0 {
            bail!(InspectError::DebuggerExited);
        }

        let line = String::from_utf8_lossy(&bytes);

        match Record::parse(&line) {
            Record::Unrecognized(text) => match Record::split_output(&text, pending) {
                Some((output, record)) => {
                    trace!(%output, "debuggee output ran into a record");

                    if !output.is_empty() {
                        self.program_output.push(output);
                    }

                    Ok(record)
                }
                None => Ok(Record::Unrecognized(text)),
            },
            record => Ok(record),
        }
    }

    /// Tokens above `token` were never issued, so a result carrying one is the
    /// debuggee's trailing digits followed by `token`
    fn reclaim_token(&mut self, record: Record, token: u64) -> Record {
        match record {
            Record::Result {
                token: Some(glued),
                class,
                results,
            } if glued > token => {
                let digits = glued.to_string();
                let own = token.to_string();

                if !digits.ends_with(&own) {
                    return Record::Result {
                        token: Some(glued),
                        class,
                        results,
                    };
                }

                self.program_output
                    .push(digits[..digits.len() - own.len()].into());

                Record::Result {
                    token: Some(token),
                    class,
                    results,
                }
            }
            record => record,
        }
    }

    fn dispatch(&mut self, record: Record) {
        match record {
            Record::Async {
                kind: AsyncKind::Exec,
                class,
                results,
                ..
            } if class == "stopped" => {
                trace!(reason = ?results.get_str("reason"), "debuggee stopped");
                self.stops.push_back(results);
            }
            Record::Async { kind, class, .. } => trace!(?kind, %class, "async record"),
            Record::Stream {
                kind: StreamKind::Target,
                text,
            } => self
                .program_output
                .extend(text.lines().map(String::from)),
            Record::Stream { kind, text } => trace!(?kind, text = %text.trim_end(), "stream"),
            Record::Result { token, class, .. } => {
                debug!(?token, %class, "ignoring result of an unknown command")
            }
            Record::Prompt => {}
            Record::Unrecognized(line) => self.program_output.push(line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn channel(output: &str) -> Channel<Cursor<Vec<u8>>, Vec<u8>> {
        Channel::new(Cursor::new(output.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn matches_results_by_token() {
        let mut channel = channel(
            "=thread-group-added,id=\"i1\"\n\
             (gdb) \n\
             1^done,bkpt={number=\"1\",func=\"main\"}\n\
             (gdb) \n",
        );

        let (class, results) = channel.execute(&Command::break_insert("main")).unwrap();

        assert_eq!(class, ResultClass::Done);
        assert_eq!(results.get("bkpt").unwrap().get_str("func"), Some("main"));
        assert_eq!(
            String::from_utf8(channel.writer.clone()).unwrap(),
            "1-break-insert main\n"
        );
    }

    #[test]
    fn errors_carry_the_message() {
        let mut channel = channel("1^error,msg=\"No symbol \\\"n\\\" in current context.\"\n");

        let err = channel.execute(&Command::evaluate("n")).unwrap_err();

        assert_eq!(err.to_string(), "gdb: No symbol \"n\" in current context.");
    }

    #[test]
    fn stops_are_queued_and_output_is_kept() {
        let mut channel = channel(
            "1^running\n\
             *running,thread-id=\"all\"\n\
             (gdb) \n\
             @\"partial\\n\"\n\
             4\n\
             *stopped,reason=\"breakpoint-hit\",bkptno=\"1\",frame={func=\"main\"}\n\
             *stopped,reason=\"exited-normally\"\n",
        );

        channel.execute(&Command::exec_run()).unwrap();

        let first = channel.wait_for_stop().unwrap();
        assert_eq!(first.get_str("bkptno"), Some("1"));

        let second = channel.wait_for_stop().unwrap();
        assert_eq!(second.get_str("reason"), Some("exited-normally"));

        assert_eq!(channel.take_program_output(), vec!["partial", "4"]);
        assert!(channel.take_program_output().is_empty());
    }

    #[test]
    fn stops_before_the_result_are_not_lost() {
        let mut channel = channel(
            "*stopped,reason=\"exited\",exit-code=\"01\"\n\
             2^done\n",
        );
        channel.next_token = 2;

        channel.execute(&Command::exec_continue()).unwrap();

        let stop = channel.wait_for_stop().unwrap();
        assert_eq!(stop.get_str("exit-code"), Some("01"));
    }

    #[test]
    fn stops_glued_to_program_output() {
        let mut channel = channel("done*stopped,reason=\"exited-normally\"\n");

        let stop = channel.wait_for_stop().unwrap();

        assert_eq!(stop.get_str("reason"), Some("exited-normally"));
        assert_eq!(channel.take_program_output(), vec!["done"]);
    }

    #[test]
    fn results_glued_to_program_output() {
        let mut channel = channel(
            "vertex 0=> 1 21^done,value=\"3\"\n\
             42^done,value=\"4\"\n",
        );

        let (_, results) = channel.execute(&Command::evaluate("n")).unwrap();
        assert_eq!(results.get_str("value"), Some("3"));
        assert_eq!(channel.take_program_output(), vec!["vertex 0=> 1 2"]);

        let (_, results) = channel.execute(&Command::evaluate("n")).unwrap();
        assert_eq!(results.get_str("value"), Some("4"));
        assert_eq!(channel.take_program_output(), vec!["4"]);
    }

    #[test]
    fn invalid_utf8_output() {
        let mut channel = Channel::new(
            Cursor::new(b"\xff\xfe\n*stopped,reason=\"exited-normally\"\n".to_vec()),
            Vec::new(),
        );

        let stop = channel.wait_for_stop().unwrap();

        assert_eq!(stop.get_str("reason"), Some("exited-normally"));
        assert_eq!(channel.take_program_output(), vec!["\u{fffd}\u{fffd}"]);
    }

    #[test]
    fn end_of_stream() {
        let mut channel = channel("");

        let err = channel.execute(&Command::gdb_exit()).unwrap_err();
        assert_eq!(err.to_string(), "the debugger exited unexpectedly");
        channel.wait_for_stop().unwrap_err();
    }
}
