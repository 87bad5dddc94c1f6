//! Table detection over extracted PDF text lines.
//!
//! The PDF text layer carries no table structure, so tables are recovered
//! from layout: a run of consecutive lines that split into the same number
//! of columns on wide gaps (two or more spaces, or a tab) is a table. The
//! first line of the run is taken as the header.

use once_cell::sync::Lazy;
use regex::Regex;

static COLUMN_GAP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\t+|\s{2,}").expect("Column gap regex pattern is valid and should compile"));

/// Fewest consecutive aligned lines that form a table.
const MIN_TABLE_ROWS: usize = 2;
/// Fewest columns a line must split into to be a table row.
const MIN_TABLE_COLUMNS: usize = 2;

/// A run of page lines, either prose or a recovered table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Line(String),
    Table(Vec<Vec<String>>),
}

fn split_columns(line: &str) -> Vec<String> {
    COLUMN_GAP
        .split(line.trim())
        .map(str::to_string)
        .filter(|cell| !cell.is_empty())
        .collect()
}

/// Group `lines` into prose lines and tables.
pub fn detect_tables(lines: &[String]) -> Vec<Block> {
    let rows: Vec<Vec<String>> = lines.iter().map(|line| split_columns(line)).collect();
    let mut blocks = Vec::with_capacity(lines.len());
    let mut idx = 0;

    while idx < lines.len() {
        let columns = rows[idx].len();
        let mut end = idx + 1;
        if columns >= MIN_TABLE_COLUMNS {
            while end < lines.len() && rows[end].len() == columns {
                end += 1;
            }
        }

        if columns >= MIN_TABLE_COLUMNS && end - idx >= MIN_TABLE_ROWS {
            blocks.push(Block::Table(rows[idx..end].to_vec()));
            idx = end;
        } else {
            blocks.push(Block::Line(lines[idx].clone()));
            idx += 1;
        }
    }

    blocks
}
