//! Markdown rendering of tabular data.
//!
//! Used by the spreadsheet, slide and PDF table paths so every table reaches
//! the chunker in one shape: a GFM table whose first row is the header.

/// Render rows of cells as a GitHub-Flavored Markdown table.
///
/// The first row is the header. Rows are padded to the widest row, pipes are
/// escaped and line breaks inside cells become spaces. Returns an empty
/// string when there is nothing to render.
///
/// ```
/// # use chunkwise::extraction::table::cells_to_markdown;
/// let cells = vec![
///     vec!["Name".to_string(), "Age".to_string()],
///     vec!["Alice".to_string(), "30".to_string()],
/// ];
/// let markdown = cells_to_markdown(&cells);
/// assert!(markdown.starts_with("| Name | Age |\n|------|------|"));
/// ```
pub fn cells_to_markdown(cells: &[Vec<String>]) -> String {
    let num_cols = cells.iter().map(Vec::len).max().unwrap_or(0);
    if num_cols == 0 {
        return String::new();
    }

    let estimated_capacity = cells.len().saturating_mul(num_cols).saturating_mul(12).max(64);
    let mut markdown = String::with_capacity(estimated_capacity);

    for (row_idx, row) in cells.iter().enumerate() {
        markdown.push('|');
        for col in 0..num_cols {
            markdown.push(' ');
            if let Some(cell) = row.get(col) {
                push_cell(&mut markdown, cell);
            }
            markdown.push_str(" |");
        }
        markdown.push('\n');

        if row_idx == 0 {
            markdown.push('|');
            for _ in 0..num_cols {
                markdown.push_str("------|");
            }
            markdown.push('\n');
        }
    }

    markdown.truncate(markdown.trim_end().len());
    markdown
}

fn push_cell(buffer: &mut String, cell: &str) {
    for ch in cell.trim().chars() {
        match ch {
            '|' => buffer.push_str("\\|"),
            '\n' | '\r' => buffer.push(' '),
            _ => buffer.push(ch),
        }
    }
}

/// Flatten rows into ` | `-joined lines without a header separator.
pub fn cells_to_lines(cells: &[Vec<String>]) -> String {
    cells
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| cell.split_whitespace().collect::<Vec<_>>().join(" "))
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .filter(|line| !line.replace('|', "").trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
