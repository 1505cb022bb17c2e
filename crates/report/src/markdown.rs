//! Markdown helpers.

/// Renders a Markdown table with columns padded to their widest cell.
///
/// Pipes and newlines inside cells are escaped so a cell can never break the
/// table. Rows shorter than the header are padded with empty cells.
pub fn md_table<S: AsRef<str>>(headers: &[&str], rows: &[Vec<S>]) -> String {
    let columns = headers.len();
    let header_cells: Vec<String> = headers.iter().map(|h| escape_cell(h)).collect();
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            (0..columns)
                .map(|i| row.get(i).map(|c| escape_cell(c.as_ref())).unwrap_or_default())
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header_cells.iter().map(|h| h.chars().count().max(3)).collect();
    for row in &body {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &header_cells, &widths);
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &separator, &widths);
    for row in &body {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    out.push('|');
    for (cell, width) in cells.iter().zip(widths) {
        let pad = width.saturating_sub(cell.chars().count());
        out.push(' ');
        out.push_str(cell);
        out.push_str(&" ".repeat(pad));
        out.push_str(" |");
    }
    out.push('\n');
}

/// Escapes characters that would break a table cell.
pub fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|").replace(['\r', '\n'], " ")
}
