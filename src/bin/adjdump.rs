use adjdump::typedef::*;
use adjdump::{logging, AutoDump, Flow, Gdb, Session, SessionConfig, Shell};
use colored::*;
use std::{env, io, path::PathBuf, process};
use structopt::StructOpt;
use tracing::info;

/// Run a graph program under gdb and inspect its adjacency lists at every breakpoint
#[derive(StructOpt, Debug)]
#[structopt(name = "adjdump")]
struct Opt {
    /// The program to debug
    #[structopt(parse(from_os_str))]
    program: Option<PathBuf>,

    /// Config file, defaults to ./adjdump.toml if present
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// File redirected to the program's stdin
    #[structopt(short, long, parse(from_os_str))]
    input: Option<PathBuf>,

    /// Run the program with /dev/null as its stdin instead of an input file
    #[structopt(long, conflicts_with = "input")]
    no_input: bool,

    /// Breakpoint location, may be repeated. Replaces the configured breakpoints
    #[structopt(short = "b", long = "break", number_of_values = 1)]
    breakpoints: Vec<String>,

    /// The gdb executable
    #[structopt(long, parse(from_os_str))]
    gdb: Option<PathBuf>,

    /// Run to completion without a prompt
    #[structopt(long)]
    batch: bool,

    /// Dump a view whenever a breakpoint is hit in batch mode, e.g. `dfs=reversed`
    #[structopt(long = "dump", number_of_values = 1)]
    dumps: Vec<AutoDump>,

    /// Fail a batch run if a breakpoint was never hit
    #[structopt(long)]
    strict: bool,

    /// Log more, may be repeated
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,
}

impl Opt {
    /// Applies the command line on top of the configured values
    fn apply(self, config: &mut SessionConfig) {
        if self.program.is_some() {
            config.program = self.program;
        }

        if self.no_input {
            config.input = None;
        } else if self.input.is_some() {
            config.input = self.input;
        }

        if !self.breakpoints.is_empty() {
            config.breakpoints = self.breakpoints;
        }

        if let Some(gdb) = self.gdb {
            config.gdb.path = gdb;
        }

        config.dumps.extend(self.dumps);
        config.strict |= self.strict;
    }
}

fn main() {
    match run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            let mut causes = e.iter_chain();

            if let Some(first) = causes.next() {
                eprintln!("{} {}", "error:".red().bold(), first);
            }

            for cause in causes {
                eprintln!("  caused by: {}", cause);
            }

            process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let opts = Opt::from_args();

    logging::init(opts.verbose);

    let batch = opts.batch;
    let mut config = SessionConfig::discover(opts.config.as_deref(), env::current_dir()?)?;
    opts.apply(&mut config);

    let gdb = Gdb::launch(&config.gdb, config.program()?)?;
    let mut session = Session::new(gdb, config);

    if batch {
        let stdout = io::stdout();
        let report = session.run_batch(&mut stdout.lock())?;

        eprintln!(
            "{} {}",
            "breakpoints hit:".cyan(),
            if report.hits.is_empty() {
                "none".into()
            } else {
                report.hits.join(" -> ")
            }
        );
    } else {
        session.start()?;

        if Shell::new(&mut session).run()? == Flow::Quit {
            info!("leaving before the program finished");
        }
    }

    let report = session.finish()?;

    Ok(report.exit_status())
}

#[cfg(test)]
mod tests {
    use super::*;
    use adjdump::View;

    fn opts(args: &[&str]) -> Opt {
        Opt::from_iter_safe(std::iter::once("adjdump").chain(args.iter().cloned())).unwrap()
    }

    #[test]
    fn command_line_overrides_config() {
        let mut config = SessionConfig {
            input: Some("cases/01".into()),
            breakpoints: vec!["main".into()],
            ..Default::default()
        };

        opts(&[
            "./scc",
            "-i",
            "cases/03",
            "-b",
            "dfs",
            "-b",
            "find_sccs",
            "--dump",
            "dfs=reversed",
            "--strict",
        ])
        .apply(&mut config);

        assert_eq!(config.program, Some(PathBuf::from("./scc")));
        assert_eq!(config.input, Some(PathBuf::from("cases/03")));
        assert_eq!(config.breakpoints, vec!["dfs", "find_sccs"]);
        assert_eq!(
            config.dumps,
            vec![AutoDump {
                at: "dfs".into(),
                view: View::Reversed,
            }]
        );
        assert!(config.strict);
    }

    #[test]
    fn defaults_survive_an_empty_command_line() {
        let mut config = SessionConfig::default();
        opts(&[]).apply(&mut config);

        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn input_can_be_disabled() {
        let mut config = SessionConfig::default();
        opts(&["--no-input"]).apply(&mut config);

        assert_eq!(config.input, None);
    }

    #[test]
    fn bad_dump_requests_are_rejected() {
        Opt::from_iter_safe(&["adjdump", "--dump", "dfs"]).unwrap_err();
        Opt::from_iter_safe(&["adjdump", "--dump", "dfs=upward"]).unwrap_err();
    }
}
