use crate::typedef::*;
use std::collections::HashMap;

/// Read-only access to the memory of a suspended debuggee
///
/// Values are addressed by symbol name, arrays by a path of indices. Every read goes
/// straight to the backing store, nothing is cached between calls.
pub trait Memory {
    /// Reads the integer value of the variable `name`
    fn resolve(&mut self, name: &str) -> Result<i64>;

    /// Reads the integer element `array[path[0]][path[1]]...`
    fn index(&mut self, array: &str, path: &[usize]) -> Result<i64>;
}

/// Renders the expression `array[i][j]...` for the given index path
pub fn element_expr(array: &str, path: &[usize]) -> String {
    let mut expr = String::from(array);

    for i in path {
        expr.push_str(&format!("[{}]", i));
    }

    expr
}

/// Parses the leading integer of a value as printed by the debugger
///
/// Accepts plain decimals, negative numbers and `0x` prefixed hex. Anything after the
/// first whitespace is ignored, so a char printed as `97 'a'` yields `97`.
pub fn parse_integer(expr: &str, value: &str) -> Result<i64> {
    let token = value.split_whitespace().next().unwrap_or_default();

    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };

    let parsed = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16)
    } else {
        digits.parse::<i64>()
    };

    match parsed {
        Ok(n) if negative => Ok(-n),
        Ok(n) => Ok(n),
        Err(_) => bail!(InspectError::NotAnInteger {
            expr: expr.into(),
            value: value.into(),
        }),
    }
}

/// A value held by a [`MemorySnapshot`]
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// A single integer
    Scalar(i64),
    /// A one dimensional integer array
    Array(Vec<i64>),
    /// An array of integer arrays
    Nested(Vec<Vec<i64>>),
}

/// An in-memory stand-in for a debuggee's memory
///
/// Every expression read is recorded, which makes it possible to check exactly what a
/// consumer of [`Memory`] touched.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshot {
    cells: HashMap<String, Cell>,
    reads: Vec<String>,
}

impl MemorySnapshot {
    /// Creates an empty snapshot
    pub fn new() -> MemorySnapshot {
        Default::default()
    }

    /// Defines a scalar variable
    pub fn scalar(mut self, name: &str, value: i64) -> MemorySnapshot {
        self.cells.insert(name.into(), Cell::Scalar(value));
        self
    }

    /// Defines a one dimensional array
    pub fn array(mut self, name: &str, values: Vec<i64>) -> MemorySnapshot {
        self.cells.insert(name.into(), Cell::Array(values));
        self
    }

    /// Defines an array of arrays
    pub fn nested(mut self, name: &str, values: Vec<Vec<i64>>) -> MemorySnapshot {
        self.cells.insert(name.into(), Cell::Nested(values));
        self
    }

    /// The expressions read so far, in order
    pub fn reads(&self) -> &[String] {
        &self.reads
    }

    /// Whether any read touched the variable `name`
    pub fn was_read(&self, name: &str) -> bool {
        self.reads
            .iter()
            .any(|expr| expr == name || expr.starts_with(&format!("{}[", name)))
    }

    fn cell(&self, name: &str) -> Result<&Cell> {
        match self.cells.get(name) {
            Some(cell) => Ok(cell),
            None => bail!(InspectError::UnknownSymbol { name: name.into() }),
        }
    }
}

impl Memory for MemorySnapshot {
    fn resolve(&mut self, name: &str) -> Result<i64> {
        self.reads.push(name.into());

        match self.cell(name)? {
            Cell::Scalar(value) => Ok(*value),
            _ => bail!(InspectError::NotAnInteger {
                expr: name.into(),
                value: "{...}".into(),
            }),
        }
    }

    fn index(&mut self, array: &str, path: &[usize]) -> Result<i64> {
        let expr = element_expr(array, path);
        self.reads.push(expr.clone());

        let value = match (self.cell(array)?, path) {
            (Cell::Array(values), [i]) => values.get(*i).cloned(),
            (Cell::Nested(rows), [i, j]) => rows.get(*i).and_then(|row| row.get(*j)).cloned(),
            _ => bail!(InspectError::NotAnInteger {
                expr,
                value: "{...}".into(),
            }),
        };

        match value {
            Some(value) => Ok(value),
            None => bail!(InspectError::IndexOutOfBounds { expr }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_element_expressions() {
        assert_eq!(element_expr("n", &[]), "n");
        assert_eq!(element_expr("adj_list", &[2, 0]), "adj_list[2][0]");
    }

    #[test]
    fn parses_debugger_values() {
        assert_eq!(parse_integer("n", "3").unwrap(), 3);
        assert_eq!(parse_integer("top", "-1").unwrap(), -1);
        assert_eq!(parse_integer("c", "97 'a'").unwrap(), 97);
        assert_eq!(parse_integer("p", "0x1f").unwrap(), 31);
    }

    #[test]
    fn rejects_non_integers() {
        parse_integer("adj_list", "{1, 2}").unwrap_err();
        parse_integer("name", "").unwrap_err();
    }

    #[test]
    fn snapshot_reads_are_recorded() {
        let mut memory = MemorySnapshot::new()
            .scalar("n", 2)
            .nested("adj_list", vec![vec![1], vec![]]);

        assert_eq!(memory.resolve("n").unwrap(), 2);
        assert_eq!(memory.index("adj_list", &[0, 0]).unwrap(), 1);

        assert_eq!(memory.reads(), &["n".to_string(), "adj_list[0][0]".to_string()]);
        assert!(memory.was_read("adj_list"));
        assert!(!memory.was_read("adj"));
    }

    #[test]
    fn snapshot_fails_like_a_debugger() {
        let mut memory = MemorySnapshot::new().array("degrees", vec![1]);

        memory.resolve("n").unwrap_err();
        memory.index("degrees", &[1]).unwrap_err();
        memory.index("degrees", &[0, 0]).unwrap_err();
    }
}
