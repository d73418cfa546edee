//! A couple of useful type aliases

/// A number assigned to a breakpoint by the debugger
pub type BreakpointNumber = u32;

/// A handy alias for `Result` that carries a generic error type.
pub type Result<T> = ::std::result::Result<T, ::failure::Error>;

/// The file name looked up in the working directory when no config is given
pub const CONFIG_FILE_NAME: &str = "adjdump.toml";

#[derive(Fail, Debug)]
#[allow(missing_docs)]
pub enum InspectError {
    #[fail(display = "gdb: {}", msg)]
    Gdb { msg: String },
    #[fail(display = "the debugger exited unexpectedly")]
    DebuggerExited,
    #[fail(display = "malformed debugger output: {:?}", line)]
    MalformedRecord { line: String },
    #[fail(display = "expected field {:?} in the debugger response", field)]
    MissingField { field: String },
    #[fail(display = "unknown symbol {:?}", name)]
    UnknownSymbol { name: String },
    #[fail(display = "index out of bounds in {:?}", expr)]
    IndexOutOfBounds { expr: String },
    #[fail(display = "value of {:?} is not an integer: {:?}", expr, value)]
    NotAnInteger { expr: String, value: String },
    #[fail(display = "value of {:?} is negative ({}) where a count was expected", expr, value)]
    NegativeCount { expr: String, value: i64 },
    #[fail(
        display = "unknown view {:?}. Expected one of \"forward\", \"reversed\"",
        view
    )]
    UnknownView { view: String },
    #[fail(display = "the debuggee is not running")]
    NotStarted,
    #[fail(display = "the session has already been started")]
    AlreadyStarted,
    #[fail(display = "the debuggee has exited")]
    Exited,
    #[fail(display = "no program to debug. Pass one on the command line or set `program`")]
    MissingProgram,
    #[fail(display = "config requires version {} but this is {}", required, running)]
    IncompatibleConfig { required: String, running: String },
    #[fail(display = "malformed dump request {:?}. Expected <location>=<view>", request)]
    MalformedDump { request: String },
    #[fail(display = "breakpoints never hit: {}", locations)]
    BreakpointsNotHit { locations: String },
}
