use lazy_static::lazy_static;
use semver::Version;

lazy_static! {
    /// The current version of the adjdump crate
    pub static ref VERSION: Version = Version::parse(env!("CARGO_PKG_VERSION"))
        .unwrap_or_else(|_| Version::new(0, 0, 0));
}

/// The file fed to the debuggee's standard input when nothing else is configured
pub const DEFAULT_INPUT: &str = "cases/03";

/// The debugger binary looked up on `PATH`
pub const DEFAULT_GDB: &str = "gdb";

/// Breakpoints inserted when nothing else is configured, in insertion order
pub const DEFAULT_BREAKPOINTS: [&str; 4] = ["main", "find_sccs", "dfs", "reverse_adj_list"];

/// What the debuggee reads when no input file is configured, since gdb's own stdin
/// carries its commands
pub const NULL_INPUT: &str = "/dev/null";
