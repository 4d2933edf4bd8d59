//! Compact text rendering of small digraphs.
//!
//! Each row is a sequence of cells terminated by `/`. A cell is `*` (or `#`)
//! when the arc exists and `.` otherwise; whitespace is ignored. The row count
//! defines the vertex count, so every row must have exactly that many cells.
//! For example `".*/*./"` is the two-cycle on two vertices.

use std::{fmt, str::FromStr};

use super::Digraph;
use crate::error::DigraphError;

impl Digraph {
    /// Parses the compact text format.
    ///
    /// Arcs within a row are stored in ascending head order.
    ///
    /// # Errors
    /// Returns [`DigraphError::UnexpectedCharacter`] for characters outside the
    /// format, [`DigraphError::UnterminatedRow`] when the input ends inside a
    /// row, and [`DigraphError::NonSquareRow`] when a row's width differs from
    /// the row count.
    pub fn parse(text: &str) -> Result<Self, DigraphError> {
        let mut rows = Vec::new();
        let mut widths = Vec::new();
        let mut current = Vec::new();
        let mut column = 0;

        for (offset, ch) in text.char_indices() {
            match ch {
                '*' | '#' => {
                    current.push(column);
                    column += 1;
                }
                '.' => column += 1,
                '/' => {
                    rows.push(std::mem::take(&mut current));
                    widths.push(column);
                    column = 0;
                }
                c if c.is_whitespace() => {}
                found => return Err(DigraphError::UnexpectedCharacter { found, offset }),
            }
        }
        if column > 0 {
            return Err(DigraphError::UnterminatedRow { row: rows.len() });
        }

        let size = rows.len();
        if let Some((row, &columns)) = widths
            .iter()
            .enumerate()
            .find(|&(_, &width)| width != size)
        {
            return Err(DigraphError::NonSquareRow {
                row,
                columns,
                rows: size,
            });
        }
        Self::from_adjacency(&rows)
    }
}

impl FromStr for Digraph {
    type Err = DigraphError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl fmt::Display for Digraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut cells = vec!['.'; self.vertices];
        for tail in 0..self.vertices {
            cells.fill('.');
            for &head in self.arcs(tail) {
                cells[head] = '*';
            }
            for cell in &cells {
                write!(f, "{cell}")?;
            }
            f.write_str("/")?;
        }
        Ok(())
    }
}
