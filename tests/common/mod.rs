#![allow(dead_code)]

use adjdump::typedef::*;
use adjdump::{Breakpoint, Debugger, Frame, Memory, MemorySnapshot, StopEvent, StopReason};
use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
};

/// A debugger that replays a fixed sequence of stops over a fixed memory image
pub struct ScriptedDebugger {
    pub memory: MemorySnapshot,
    pub inserted: Vec<String>,
    pub input: Option<PathBuf>,
    pub shut_down: bool,
    pub output: Vec<String>,
    functions: Vec<&'static str>,
    script: VecDeque<StopEvent>,
}

impl ScriptedDebugger {
    /// Stops at the given breakpoint numbers in order, then exits with `exit_code`
    pub fn new(functions: &[&'static str], hits: &[BreakpointNumber], exit_code: i32) -> ScriptedDebugger {
        let mut script: VecDeque<StopEvent> = hits
            .iter()
            .map(|&number| StopEvent {
                reason: StopReason::Breakpoint(number),
                frame: Some(Frame {
                    func: Some(functions[number as usize - 1].into()),
                    file: Some("scc.c".into()),
                    line: None,
                }),
            })
            .collect();

        script.push_back(StopEvent {
            reason: StopReason::Exited(exit_code),
            frame: None,
        });

        ScriptedDebugger {
            memory: MemorySnapshot::new(),
            inserted: Vec::new(),
            input: None,
            shut_down: false,
            output: Vec::new(),
            functions: functions.to_vec(),
            script,
        }
    }

    pub fn with_memory(mut self, memory: MemorySnapshot) -> ScriptedDebugger {
        self.memory = memory;
        self
    }

    pub fn with_output(mut self, line: &str) -> ScriptedDebugger {
        self.output.push(line.into());
        self
    }

    fn next_stop(&mut self) -> Result<StopEvent> {
        match self.script.pop_front() {
            Some(event) => Ok(event),
            None => failure::bail!("the script ran out of stops"),
        }
    }
}

impl Memory for ScriptedDebugger {
    fn resolve(&mut self, name: &str) -> Result<i64> {
        self.memory.resolve(name)
    }

    fn index(&mut self, array: &str, path: &[usize]) -> Result<i64> {
        self.memory.index(array, path)
    }
}

impl Debugger for ScriptedDebugger {
    fn insert_breakpoint(&mut self, location: &str) -> Result<Breakpoint> {
        self.inserted.push(location.into());

        Ok(Breakpoint {
            number: self.inserted.len() as BreakpointNumber,
            location: location.into(),
            func: self
                .functions
                .get(self.inserted.len() - 1)
                .map(|&f| f.to_string()),
        })
    }

    fn run(&mut self, input: Option<&Path>) -> Result<StopEvent> {
        self.input = input.map(Path::to_path_buf);
        self.next_stop()
    }

    fn resume(&mut self) -> Result<StopEvent> {
        self.next_stop()
    }

    fn evaluate(&mut self, expression: &str) -> Result<String> {
        Ok(self.memory.resolve(expression)?.to_string())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.shut_down = true;
        Ok(())
    }

    fn take_program_output(&mut self) -> Vec<String> {
        std::mem::replace(&mut self.output, Vec::new())
    }
}

/// The memory of the three vertex graph 0 -> 1, 0 -> 2, 1 -> 2
pub fn three_vertices() -> MemorySnapshot {
    MemorySnapshot::new()
        .scalar("n", 3)
        .array("out_going_edge_count", vec![2, 1, 0])
        .nested("adj_list", vec![vec![1, 2], vec![2], vec![]])
        .array("incoming_edge_count", vec![0, 1, 2])
        .nested("reversed_adj_list", vec![vec![], vec![0], vec![0, 1]])
}

/// The functions of the default breakpoints, in insertion order
pub const FUNCTIONS: [&str; 4] = ["main", "find_sccs", "dfs", "reverse_adj_list"];
