//! The GDB machine interface
//!
//! GDB/MI is a line oriented protocol. Commands go to gdb's stdin prefixed with a
//! numeric token, gdb answers with output records on stdout: one result record per
//! command (echoing the token), asynchronous records for state changes like a stopped
//! debuggee, and stream records carrying plain text.

mod channel;
mod command;
mod record;

pub use self::channel::Channel;
pub use self::command::Command;
pub use self::record::{AsyncKind, Record, ResultClass, Results, StreamKind, Value};
