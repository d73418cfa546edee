mod common;

use adjdump::{AutoDump, Report, Session, SessionConfig, StopEvent, StopReason, View};
use common::{three_vertices, ScriptedDebugger, FUNCTIONS};
use std::path::PathBuf;

fn session(hits: &[u32], config: SessionConfig) -> Session<ScriptedDebugger> {
    let debugger = ScriptedDebugger::new(&FUNCTIONS, hits, 0).with_memory(three_vertices());
    Session::new(debugger, config)
}

#[test]
fn start_inserts_breakpoints_then_runs_with_input() {
    let mut session = session(&[1], SessionConfig::default());

    let first = session.start().unwrap().clone();

    assert_eq!(first.reason, StopReason::Breakpoint(1));
    assert_eq!(session.debugger().inserted, FUNCTIONS.to_vec());
    assert_eq!(session.debugger().input, Some(PathBuf::from("cases/03")));
    assert_eq!(session.current_location(), Some("main"));
}

#[test]
fn every_breakpoint_is_hit_in_program_order() {
    let mut session = session(&[1, 2, 4, 3, 3, 3], SessionConfig::default());

    let report = session.run_batch(&mut Vec::new()).unwrap();

    assert_eq!(
        report.hits,
        vec!["main", "find_sccs", "reverse_adj_list", "dfs", "dfs", "dfs"]
    );
    assert!(report.unhit.is_empty());
    assert_eq!(report.exit_code(), Some(0));
    assert!(session.is_finished());
}

#[test]
fn unhit_breakpoints_are_reported() {
    let mut session = session(&[1, 2], SessionConfig::default());

    let report = session.run_batch(&mut Vec::new()).unwrap();

    assert_eq!(report.unhit, vec!["dfs", "reverse_adj_list"]);
}

#[test]
fn strict_batch_fails_on_unhit_breakpoints() {
    let config = SessionConfig {
        strict: true,
        ..Default::default()
    };
    let mut session = session(&[1, 2], config);

    let err = session.run_batch(&mut Vec::new()).unwrap_err();

    assert_eq!(err.to_string(), "breakpoints never hit: dfs, reverse_adj_list");
}

#[test]
fn batch_dumps_at_configured_breakpoints() {
    let config = SessionConfig {
        dumps: vec![
            AutoDump {
                at: "find_sccs".into(),
                view: View::Forward,
            },
            AutoDump {
                at: "dfs".into(),
                view: View::Reversed,
            },
        ],
        ..Default::default()
    };
    let debugger = ScriptedDebugger::new(&FUNCTIONS, &[1, 2, 4, 3], 0)
        .with_memory(three_vertices())
        .with_output("scc: reading");
    let mut session = Session::new(debugger, config);

    let mut out = Vec::new();
    session.run_batch(&mut out).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "scc: reading\n\
         -- forward adjacency at Breakpoint 2, find_sccs () at scc.c\n\
         vertex 0=> 1 2\n\
         vertex 1=> 2\n\
         vertex 2=>\n\
         -- reversed adjacency at Breakpoint 3, dfs () at scc.c\n\
         vertex 0=>\n\
         vertex 1=> 0\n\
         vertex 2=> 0 1\n"
    );
}

#[test]
fn inspection_needs_a_suspended_debuggee() {
    let mut session = session(&[1], SessionConfig::default());

    let err = session.dump(View::Forward, &mut Vec::new()).unwrap_err();
    assert_eq!(err.to_string(), "the debuggee is not running");
    session.resume().unwrap_err();

    session.start().unwrap();
    session.dump(View::Forward, &mut Vec::new()).unwrap();
    session.start().unwrap_err();

    session.resume().unwrap();
    assert!(session.is_finished());

    let err = session.evaluate("n").unwrap_err();
    assert_eq!(err.to_string(), "the debuggee has exited");
}

#[test]
fn dump_before_the_vertex_count_exists_fails() {
    let debugger = ScriptedDebugger::new(&FUNCTIONS, &[1], 0);
    let mut session = Session::new(debugger, SessionConfig::default());
    session.start().unwrap();

    let mut out = Vec::new();
    session.dump(View::Forward, &mut out).unwrap_err();

    assert!(out.is_empty());
}

#[test]
fn no_input_redirection() {
    let config = SessionConfig {
        input: None,
        ..Default::default()
    };
    let mut session = session(&[1], config);
    session.start().unwrap();

    assert_eq!(session.debugger().input, None);
}

#[test]
fn finish_reports_the_exit() {
    let debugger = ScriptedDebugger::new(&FUNCTIONS, &[], 3);
    let mut session = Session::new(debugger, SessionConfig::default());

    session.start().unwrap();

    let report = session.finish().unwrap();
    assert_eq!(report.exit_code(), Some(3));
    assert!(report.hits.is_empty());
}

fn ended_by(reason: StopReason) -> Report {
    Report {
        outcome: Some(StopEvent {
            reason,
            frame: None,
        }),
        ..Default::default()
    }
}

#[test]
fn exit_status_follows_the_debuggee() {
    assert_eq!(ended_by(StopReason::Exited(0)).exit_status(), 0);
    assert_eq!(ended_by(StopReason::Exited(3)).exit_status(), 3);
    assert_eq!(ended_by(StopReason::Killed("SIGSEGV".into())).exit_status(), 139);
    assert_eq!(ended_by(StopReason::Killed("SIGABRT".into())).exit_status(), 134);
    assert_eq!(ended_by(StopReason::Killed("SIGPWR".into())).exit_status(), 1);
    assert_eq!(Report::default().exit_status(), 1);
}

#[test]
fn quitting_early_is_not_a_success() {
    let mut session = session(&[1, 2], SessionConfig::default());
    session.start().unwrap();

    let report = session.finish().unwrap();

    assert_eq!(report.outcome, None);
    assert_eq!(report.exit_status(), 1);
}
