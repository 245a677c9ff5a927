//! Maps a [`TableModel`] onto a styled cell grid.
//!
//! Rendering never fails: a model that passed validation always renders, and
//! anything unexpected in a cell falls back to its text.

use crate::helpers::string::display_width;
use crate::spreadsheet::cell::Alignment;
use crate::spreadsheet::cell::CellStyle;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::cell::Fill;
use crate::spreadsheet::cell::Font;
use crate::spreadsheet::cell::HorizontalAlignment;
use crate::spreadsheet::cell::RenderedCell;
use crate::spreadsheet::cell::VerticalAlignment;
use crate::spreadsheet::format::number_format;
use crate::spreadsheet::sheet::RenderedSheet;
use crate::spreadsheet::RenderOptions;
use crate::table::LogicalRow;
use crate::table::TableModel;

/// Text written into an empty top-left cell that receives the corner hyperlink.
pub const CORNER_LINK_LABEL: &str = "Link to Table";

const HEADER_FILL: &str = "FFFFFF";
const SHADED_FILL: &str = "D9D9D9";
const PLAIN_FILL: &str = "FFFFFF";
const LINK_COLOR: &str = "0563C1";

/// Prepended to first-column text once per indent level.
const INDENT_PREFIX: &str = "  ";

/// Characters added to the longest value when sizing a column.
const WIDTH_PADDING: usize = 2;

pub fn render(model: &TableModel, options: &RenderOptions) -> RenderedSheet {
    let mut sheet = RenderedSheet::new(&options.sheet_name);
    sheet.rows = model
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| render_row(index, row, model, options))
        .collect();
    if let Some(url) = &options.corner_hyperlink {
        link_corner(&mut sheet, url);
    }
    sheet.column_widths = column_widths(&sheet, options.width_cap);
    sheet
}

fn render_row(index: usize, row: &LogicalRow, model: &TableModel, options: &RenderOptions) -> Vec<RenderedCell> {
    (0..model.column_count)
        .map(|col| {
            let text = row.cells.get(col).map(String::as_str).unwrap_or_default();
            let number = row.numbers.get(col).copied().flatten().filter(|number| number.value.is_finite());
            let link = row.links.get(col).cloned().flatten();

            let mut cell = match number {
                Some(number) => {
                    let mut cell = RenderedCell::new(index, col, CellValue::Number(number.value));
                    cell.style.number_format = Some(number_format(&number.format));
                    cell
                }
                None if text.is_empty() => RenderedCell::new(index, col, CellValue::Empty),
                None => RenderedCell::new(index, col, CellValue::Text(indented_text(row, col, text))),
            };
            cell.style.fill = row_fill(index, model.header_row_offset, options.alternating_shading);
            cell.style.alignment = alignment(index, col, row);
            if index == 0 {
                cell.style.font = Font { bold: true, ..Font::default() };
            }
            if link.is_some() {
                cell.style.font = link_font();
                cell.hyperlink = link;
            }
            cell
        })
        .collect()
}

fn indented_text(row: &LogicalRow, col: usize, text: &str) -> String {
    if col == 0 && row.indent_level > 0 && !row.center_continuous {
        format!("{}{}", INDENT_PREFIX.repeat(row.indent_level as usize), text)
    } else {
        text.to_owned()
    }
}

/// Header row is always filled; shading alternates from the anchor row, which is always gray.
fn row_fill(index: usize, anchor: usize, alternating_shading: bool) -> Option<Fill> {
    if index == 0 {
        Some(Fill::solid(HEADER_FILL))
    } else if alternating_shading && index >= anchor {
        let color = if (index - anchor) % 2 == 0 { SHADED_FILL } else { PLAIN_FILL };
        Some(Fill::solid(color))
    } else {
        None
    }
}

fn alignment(index: usize, col: usize, row: &LogicalRow) -> Alignment {
    let vertical = Some(VerticalAlignment::Center);
    if index == 0 {
        Alignment { horizontal: Some(HorizontalAlignment::Center), vertical, indent: 0 }
    } else if row.center_continuous || is_merged(row, col) {
        Alignment { horizontal: Some(HorizontalAlignment::CenterContinuous), vertical, indent: 0 }
    } else if col == 0 && row.indent_level > 0 {
        Alignment { horizontal: None, vertical, indent: row.indent_level }
    } else {
        Alignment { horizontal: None, vertical, indent: 0 }
    }
}

fn is_merged(row: &LogicalRow, col: usize) -> bool {
    row.column_merges
        .iter()
        .any(|(&start, &width)| col >= start && col < start + width)
}

fn link_font() -> Font {
    Font {
        bold: true,
        underline: true,
        color: Some(LINK_COLOR.to_owned()),
    }
}

fn link_corner(sheet: &mut RenderedSheet, url: &str) {
    if sheet.rows.is_empty() {
        sheet.rows.push(Vec::new());
    }
    let first_row = &mut sheet.rows[0];
    if first_row.is_empty() {
        let mut cell = RenderedCell::new(0, 0, CellValue::Empty);
        cell.style = CellStyle {
            fill: Some(Fill::solid(HEADER_FILL)),
            alignment: alignment(0, 0, &LogicalRow::default()),
            ..CellStyle::default()
        };
        first_row.push(cell);
    }
    let corner = &mut first_row[0];
    if corner.value.is_empty() {
        corner.value = CellValue::Text(CORNER_LINK_LABEL.to_owned());
    }
    corner.style.font = link_font();
    corner.hyperlink = Some(url.to_owned());
}

fn column_widths(sheet: &RenderedSheet, cap: usize) -> Vec<usize> {
    let mut widths = vec![0usize; sheet.column_count()];
    for cell in sheet.cells() {
        let width = display_width(&cell.value.to_string());
        if let Some(max) = widths.get_mut(cell.col) {
            *max = (*max).max(width);
        }
    }
    widths
        .into_iter()
        .map(|width| (width + WIDTH_PADDING).min(cap))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnBoundary;
    use crate::table::NumericCell;
    use crate::table::NumericCellFormat;
    use std::collections::BTreeMap;

    fn row(cells: &[&str]) -> LogicalRow {
        LogicalRow {
            cells: cells.iter().map(|cell| cell.to_string()).collect(),
            links: vec![None; cells.len()],
            numbers: cells.iter().map(|cell| crate::table::numeric::classify(cell)).collect(),
            ..LogicalRow::default()
        }
    }

    fn model(rows: Vec<LogicalRow>, offset: usize) -> TableModel {
        let columns = rows.first().map(|row| row.cells.len()).unwrap_or(0);
        let boundaries = (0..columns).map(|col| ColumnBoundary::new(col, col + 1)).collect();
        TableModel::new(rows, boundaries, offset).unwrap()
    }

    fn fill_of(sheet: &RenderedSheet, row: usize) -> Option<&str> {
        sheet.cell(row, 0).and_then(|cell| cell.fill()).map(|fill| fill.color.as_str())
    }

    #[test]
    fn header_row_styling() {
        let sheet = render(&model(vec![row(&["", "2024"]), row(&["Sales", "1"])], 1), &RenderOptions::default());
        for cell in &sheet.rows[0] {
            assert!(cell.font().bold);
            assert_eq!(cell.fill(), Some(&Fill::solid("FFFFFF")));
            assert_eq!(cell.alignment().horizontal, Some(HorizontalAlignment::Center));
            assert_eq!(cell.alignment().vertical, Some(VerticalAlignment::Center));
        }
        assert!(!sheet.rows[1][0].font().bold);
        assert!(!sheet.show_grid_lines);
    }

    #[test]
    fn shading_starts_at_anchor() {
        let rows = (0..7).map(|index| row(&[&format!("r{index}")])).collect();
        let options = RenderOptions { alternating_shading: true, ..RenderOptions::default() };
        let sheet = render(&model(rows, 3), &options);
        assert_eq!(fill_of(&sheet, 1), None);
        assert_eq!(fill_of(&sheet, 2), None);
        assert_eq!(fill_of(&sheet, 3), Some("D9D9D9"));
        assert_eq!(fill_of(&sheet, 4), Some("FFFFFF"));
        assert_eq!(fill_of(&sheet, 5), Some("D9D9D9"));
        assert_eq!(fill_of(&sheet, 6), Some("FFFFFF"));
    }

    #[test]
    fn shading_disabled_keeps_vertical_centering() {
        let rows = (0..4).map(|index| row(&[&format!("r{index}"), "x"])).collect();
        let sheet = render(&model(rows, 1), &RenderOptions::default());
        for index in 1..4 {
            assert_eq!(fill_of(&sheet, index), None);
            assert_eq!(sheet.rows[index][1].alignment().vertical, Some(VerticalAlignment::Center));
        }
    }

    #[test]
    fn numbers_carry_formats() {
        let sheet = render(
            &model(vec![row(&["", "", ""]), row(&["Net", "$1,234.50", "(12.5)%"])], 1),
            &RenderOptions::default(),
        );
        let money = &sheet.rows[1][1];
        assert_eq!(money.value, CellValue::Number(1234.5));
        assert_eq!(money.number_format(), Some("$#,##0.00"));
        let rate = &sheet.rows[1][2];
        assert_eq!(rate.value, CellValue::Number(-0.125));
        assert_eq!(rate.number_format(), Some("0.0%;(0.0%)"));
        assert_eq!(sheet.rows[1][0].number_format(), None);
        assert_eq!(sheet.rows[0][1].value, CellValue::Empty);
    }

    #[test]
    fn non_finite_numbers_fall_back_to_text() {
        let mut broken = row(&["", "n/a"]);
        broken.numbers[1] = Some(NumericCell { value: f64::INFINITY, format: NumericCellFormat::default() });
        let sheet = render(&model(vec![row(&["", ""]), broken], 1), &RenderOptions::default());
        assert_eq!(sheet.rows[1][1].value, CellValue::Text("n/a".to_owned()));
        assert_eq!(sheet.rows[1][1].number_format(), None);
    }

    #[test]
    fn linked_cells() {
        let mut header = row(&["Exhibit", "Filed"]);
        header.links[0] = Some("https://www.sec.gov/ex1".to_owned());
        let sheet = render(&model(vec![header, row(&["a", "b"])], 1), &RenderOptions::default());
        let cell = &sheet.rows[0][0];
        assert_eq!(cell.value, CellValue::Text("Exhibit".to_owned()));
        assert_eq!(cell.hyperlink.as_deref(), Some("https://www.sec.gov/ex1"));
        assert_eq!(cell.font(), &link_font());
        assert_eq!(sheet.rows[0][1].hyperlink, None);
    }

    #[test]
    fn corner_link_placeholder() {
        let options = RenderOptions {
            corner_hyperlink: Some("https://www.sec.gov/filing".to_owned()),
            ..RenderOptions::default()
        };
        let sheet = render(&model(vec![row(&["", "2024"]), row(&["a", "1"])], 1), &options);
        let corner = &sheet.rows[0][0];
        assert_eq!(corner.value, CellValue::Text(CORNER_LINK_LABEL.to_owned()));
        assert_eq!(corner.hyperlink.as_deref(), Some("https://www.sec.gov/filing"));
        assert!(corner.font().bold && corner.font().underline);
        assert_eq!(sheet.column_widths[0], CORNER_LINK_LABEL.len() + 2);

        let sheet = render(&model(vec![row(&["Item", "2024"])], 0), &options);
        assert_eq!(sheet.rows[0][0].value, CellValue::Text("Item".to_owned()));
        assert!(sheet.rows[0][0].hyperlink.is_some());

        let sheet = render(&TableModel::default(), &options);
        assert_eq!(sheet.rows[0][0].value, CellValue::Text(CORNER_LINK_LABEL.to_owned()));
        assert_eq!(sheet.column_widths.len(), 1);
    }

    #[test]
    fn row_alignment_precedence() {
        let mut full = row(&["Segment", "", ""]);
        full.center_continuous = true;
        full.indent_level = 2;
        let mut merged = row(&["", "Three Months", ""]);
        merged.column_merges = BTreeMap::from([(1, 2)]);
        let mut indented = row(&["Cost", "5", "6"]);
        indented.indent_level = 2;
        indented.left_padding = 28;
        let sheet = render(&model(vec![row(&["", "", ""]), full, merged, indented], 1), &RenderOptions::default());

        for cell in &sheet.rows[1] {
            assert_eq!(cell.alignment().horizontal, Some(HorizontalAlignment::CenterContinuous));
        }
        assert_eq!(sheet.rows[1][0].value, CellValue::Text("Segment".to_owned()));

        assert_eq!(sheet.rows[2][0].alignment().horizontal, None);
        assert_eq!(sheet.rows[2][1].alignment().horizontal, Some(HorizontalAlignment::CenterContinuous));
        assert_eq!(sheet.rows[2][2].alignment().horizontal, Some(HorizontalAlignment::CenterContinuous));

        assert_eq!(sheet.rows[3][0].alignment().indent, 2);
        assert_eq!(sheet.rows[3][0].value, CellValue::Text("    Cost".to_owned()));
        assert_eq!(sheet.rows[3][1].alignment().indent, 0);
        assert_eq!(sheet.rows[3][1].alignment().vertical, Some(VerticalAlignment::Center));
    }

    #[test]
    fn widths_are_capped() {
        let long = "x".repeat(80);
        let rows = vec![row(&["Item", "2024"]), row(&[&long, "1234.5"])];
        let sheet = render(&model(rows.clone(), 1), &RenderOptions::default());
        assert_eq!(sheet.column_widths, vec![50, 8]);
        let sheet = render(&model(rows, 1), &RenderOptions::wide());
        assert_eq!(sheet.column_widths, vec![70, 8]);
    }

    #[test]
    fn rendering_is_deterministic() {
        let table = model(vec![row(&["", "2024"]), row(&["Sales", "$1,000"]), row(&["Cost", "(200)"])], 1);
        let options = RenderOptions { alternating_shading: true, ..RenderOptions::default() };
        assert_eq!(render(&table, &options), render(&table, &options));
    }
}
