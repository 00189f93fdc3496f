//! XLSX text rendering via calamine.
//!
//! Every sheet becomes a `--- Sheet: <name> ---` header followed by a
//! tab-separated rendering of all rows; sheets are joined with a blank
//! line, in workbook order.

use std::path::Path;

use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use curasense_core::{CuraError, Result};

/// Renders every sheet of an XLSX workbook as plain text.
pub fn extract(path: &Path) -> Result<String> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| CuraError::extraction(format!("failed to open workbook: {e}")))?;

    let names = workbook.sheet_names();
    let mut sections = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| CuraError::extraction(format!("failed to read sheet '{name}': {e}")))?;
        sections.push(render_sheet(&name, &range));
    }

    Ok(sections.join("\n\n"))
}

/// Renders one sheet: header line plus tab-joined cells per row.
pub(crate) fn render_sheet(name: &str, range: &Range<Data>) -> String {
    let mut out = format!("--- Sheet: {name} ---");
    for row in range.rows() {
        let cells: Vec<String> = row.iter().map(cell_as_string).collect();
        out.push('\n');
        out.push_str(&cells.join("\t"));
    }
    out
}

fn cell_as_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}
