//! Fixed-width text tables.
//!
//! Every report the tool prints goes through [`render_table`]: columns are
//! left-aligned and padded to their widest cell, separated by `" | "`, with a
//! `-+-` underline below the header row.

/// Printed in place of a table that has no rows.
pub const NO_RESULTS: &str = "(no results)";

const COLUMN_SEPARATOR: &str = " | ";
const UNDERLINE_SEPARATOR: &str = "-+-";

/// Render `rows` under `headers`, or [`NO_RESULTS`] when there are no rows.
///
/// Rows shorter than the header are padded with empty cells; extra cells are
/// ignored.
pub fn render_table<R, C>(headers: &[&str], rows: &[R]) -> String
where
    R: AsRef<[C]>,
    C: AsRef<str>,
{
    if rows.is_empty() {
        return format!("{NO_RESULTS}\n");
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.as_ref().iter().take(headers.len()).enumerate() {
            widths[i] = widths[i].max(cell.as_ref().chars().count());
        }
    }

    let mut out = String::new();
    let header_cells: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| pad(h, *w))
        .collect();
    out.push_str(&header_cells.join(COLUMN_SEPARATOR));
    out.push('\n');

    let underline: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&underline.join(UNDERLINE_SEPARATOR));
    out.push('\n');

    for row in rows {
        let cells = row.as_ref();
        let line: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| pad(cells.get(i).map(|c| c.as_ref()).unwrap_or(""), *w))
            .collect();
        out.push_str(&line.join(COLUMN_SEPARATOR));
        out.push('\n');
    }

    out
}

fn pad(cell: &str, width: usize) -> String {
    format!("{cell:<width$}")
}
