//! GitHub-style table rendering.

use crate::convert::Conversion;
use crate::node::NodeRef;
use crate::Result;

/// Render a `<table>` as a padded pipe table.
///
/// The header is the first row of `<thead>`, or the first row of the table
/// when there is no `<thead>`. Every column is at least three characters
/// wide so the separator row stays valid.
pub fn convert_table(table: &NodeRef, conversion: &mut Conversion) -> Result<String> {
    let sections: Vec<NodeRef> = table.element_children().collect();

    let mut caption = String::new();
    let mut rows = Vec::new();
    for section in &sections {
        match section.tag_name() {
            "caption" => {
                caption = section.whole_text().split_whitespace().collect::<Vec<_>>().join(" ")
            }
            "tr" => rows.push((*section, false)),
            "thead" | "tbody" | "tfoot" => {
                let in_head = section.tag_name() == "thead";
                rows.extend(
                    section
                        .element_children()
                        .filter(|row| row.tag_name() == "tr")
                        .map(|row| (row, in_head)),
                );
            }
            _ => {}
        }
    }

    if rows.is_empty() {
        return Ok(String::new());
    }

    let header_index = rows.iter().position(|(_, in_head)| *in_head).unwrap_or(0);
    let has_head = rows[header_index].1;

    let header = process_row(&rows[header_index].0, conversion)?;
    let mut body = Vec::new();
    for (index, (row, in_head)) in rows.iter().enumerate() {
        if index == header_index || (has_head && *in_head) {
            continue;
        }
        body.push(process_row(row, conversion)?);
    }

    let column_count = body.iter().map(Vec::len).fold(header.len(), usize::max);
    let mut widths = vec![3; column_count];
    for row in std::iter::once(&header).chain(&body) {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::from("\n\n");
    if !caption.is_empty() {
        out.push_str(&caption);
        out.push_str("\n\n");
    }

    write_row(&mut out, &header, &widths);
    out.push('|');
    for &width in &widths {
        out.push(' ');
        out.push_str(&"-".repeat(width));
        out.push_str(" |");
    }
    out.push('\n');
    for row in &body {
        write_row(&mut out, row, &widths);
    }
    out.push('\n');

    Ok(out)
}

/// Rendered, trimmed content of each `td`/`th` in a row
fn process_row(row: &NodeRef, conversion: &mut Conversion) -> Result<Vec<String>> {
    let mut cells = Vec::new();
    for cell in row.element_children() {
        if matches!(cell.tag_name(), "td" | "th") {
            cells.push(conversion.process(&cell)?.trim().to_string());
        }
    }
    Ok(cells)
}

/// Missing trailing cells are written as empty
fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    out.push('|');
    for (i, &width) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let padding = width.saturating_sub(cell.chars().count());
        out.push(' ');
        out.push_str(cell);
        out.push_str(&" ".repeat(padding));
        out.push_str(" |");
    }
    out.push('\n');
}
