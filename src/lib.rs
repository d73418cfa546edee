#![deny(missing_docs)]

//! Inspect the adjacency lists of a graph program while it runs under gdb
//!
//! # Introduction
//! `adjdump` drives a gdb session over a compiled program that computes strongly connected
//! components. It inserts breakpoints at the interesting functions, runs the program with
//! a test case redirected to its stdin and, whenever the program is suspended, dumps the
//! forward or reversed adjacency list straight out of its memory:
//!
//! ```text
//! vertex 0=> 1 2
//! vertex 1=> 2
//! vertex 2=>
//! ```
//!
//! The dump only depends on the [Memory][memory] trait, the [Session][session] only on the
//! [Debugger][debugger] trait. [Gdb][gdb] implements both by speaking GDB/MI to a gdb
//! child process.
//!
//! [memory]: trait.Memory.html
//! [session]: struct.Session.html
//! [debugger]: trait.Debugger.html
//! [gdb]: struct.Gdb.html

#[macro_use]
extern crate failure;

mod adjacency;
mod config;
mod consts;
mod debugger;
mod gdb;
pub mod logging;
mod memory;
pub mod mi;
mod session;
mod shell;
pub mod typedef;

pub use crate::adjacency::*;
pub use crate::config::*;
pub use crate::consts::*;
pub use crate::debugger::*;
pub use crate::gdb::*;
pub use crate::memory::*;
pub use crate::session::*;
pub use crate::shell::*;
