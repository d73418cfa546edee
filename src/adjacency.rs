use crate::memory::Memory;
use crate::typedef::*;
use serde::{Deserialize, Serialize};
use std::{fmt, io::Write, str::FromStr};
use tracing::{debug, trace};

/// Which of the two adjacency representations to read
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Copy, Clone)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// The graph as read from the input, edges pointing outward
    Forward,
    /// The graph with every edge reversed
    Reversed,
}

impl FromStr for View {
    type Err = ::failure::Error;

    fn from_str(s: &str) -> Result<View> {
        match s.trim().to_lowercase().as_str() {
            "forward" | "f" | "adj_list" => Ok(View::Forward),
            "reversed" | "r" | "reversed_adj_list" => Ok(View::Reversed),
            other => bail!(InspectError::UnknownView { view: other.into() }),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Forward => write!(f, "forward"),
            View::Reversed => write!(f, "reversed"),
        }
    }
}

/// The variables holding one adjacency representation
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct ListSymbols {
    /// The per-vertex degree array
    pub degrees: String,
    /// The per-vertex array of neighbours
    pub lists: String,
}

/// The debuggee variables an adjacency dump reads
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(default)]
pub struct Symbols {
    /// The number of vertices
    pub vertex_count: String,
    /// Variables of the forward view
    pub forward: ListSymbols,
    /// Variables of the reversed view
    pub reversed: ListSymbols,
}

impl Symbols {
    /// The variables backing `view`
    pub fn for_view(&self, view: View) -> &ListSymbols {
        match view {
            View::Forward => &self.forward,
            View::Reversed => &self.reversed,
        }
    }
}

impl Default for Symbols {
    fn default() -> Symbols {
        Symbols {
            vertex_count: "n".into(),
            forward: ListSymbols {
                degrees: "out_going_edge_count".into(),
                lists: "adj_list".into(),
            },
            reversed: ListSymbols {
                degrees: "incoming_edge_count".into(),
                lists: "reversed_adj_list".into(),
            },
        }
    }
}

/// An adjacency list copied out of the debuggee
#[derive(Debug, PartialEq, Clone)]
pub struct Adjacency {
    /// The view this list was read from
    pub view: View,
    /// The neighbours of every vertex, indexed by vertex
    pub rows: Vec<Vec<i64>>,
}

impl Adjacency {
    /// Reads the complete adjacency list of `view`
    pub fn read<M: Memory + ?Sized>(
        memory: &mut M,
        symbols: &Symbols,
        view: View,
    ) -> Result<Adjacency> {
        let vertices = vertex_count(memory, symbols)?;

        let rows = (0..vertices)
            .map(|vertex| read_row(&mut *memory, symbols.for_view(view), vertex))
            .collect::<Result<Vec<_>>>()?;

        Ok(Adjacency { view, rows })
    }
}

impl fmt::Display for Adjacency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (vertex, row) in self.rows.iter().enumerate() {
            writeln!(f, "{}", format_row(vertex, row))?;
        }

        Ok(())
    }
}

/// Writes the adjacency list of `view` to `out`, one line per vertex
///
/// Every line is written as soon as it has been read, so a failing read leaves the lines
/// of all previous vertices in `out`. Returns the number of vertices written.
pub fn write_adjacency<M, W>(
    memory: &mut M,
    symbols: &Symbols,
    view: View,
    out: &mut W,
) -> Result<usize>
where
    M: Memory + ?Sized,
    W: Write + ?Sized,
{
    let vertices = vertex_count(memory, symbols)?;
    let list = symbols.for_view(view);

    debug!(%view, vertices, lists = %list.lists, "dumping adjacency list");

    for vertex in 0..vertices {
        let row = read_row(memory, list, vertex)?;
        writeln!(out, "{}", format_row(vertex, &row))?;
    }

    out.flush()?;

    Ok(vertices)
}

fn format_row(vertex: usize, row: &[i64]) -> String {
    let mut line = format!("vertex {}=>", vertex);

    for neighbour in row {
        line.push_str(&format!(" {}", neighbour));
    }

    line
}

fn vertex_count<M: Memory + ?Sized>(memory: &mut M, symbols: &Symbols) -> Result<usize> {
    let name = &symbols.vertex_count;
    let value = memory.resolve(name)?;

    as_count(name.clone(), value)
}

fn read_row<M: Memory + ?Sized>(
    memory: &mut M,
    list: &ListSymbols,
    vertex: usize,
) -> Result<Vec<i64>> {
    let degree = memory.index(&list.degrees, &[vertex])?;
    let degree = as_count(format!("{}[{}]", list.degrees, vertex), degree)?;

    trace!(vertex, degree, "reading row");

    (0..degree)
        .map(|edge| memory.index(&list.lists, &[vertex, edge]))
        .collect()
}

fn as_count(expr: String, value: i64) -> Result<usize> {
    ensure!(value >= 0, InspectError::NegativeCount { expr, value });

    Ok(value as usize)
}
