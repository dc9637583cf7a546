use crate::error::{ReportError, Result};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub caption: &'static str,
    pub align: Align,
    pub field: &'static str,
}

impl Column {
    pub const fn left(caption: &'static str, field: &'static str) -> Self {
        Self { caption, align: Align::Left, field }
    }

    pub const fn right(caption: &'static str, field: &'static str) -> Self {
        Self { caption, align: Align::Right, field }
    }
}

/// One table row: field key to pre-formatted cell text.
pub type Row = HashMap<&'static str, String>;

/// Renders an aligned markdown table: header, divider, then one line per row.
///
/// Every column's field must be present in every row.
pub fn render(columns: &[Column], rows: &[Row]) -> Result<Vec<String>> {
    let widths = column_widths(columns, rows)?;

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(line(columns.iter().zip(&widths).map(|(c, &w)| {
        pad(c.caption, w, c.align, ' ')
    })));
    lines.push(line(columns.iter().zip(&widths).map(|(c, &w)| {
        pad(":", w, c.align, '-')
    })));

    for row in rows {
        lines.push(line(columns.iter().zip(&widths).map(|(c, &w)| {
            // presence already checked while measuring
            let cell = row.get(c.field).map(String::as_str).unwrap_or_default();
            pad(cell, w, c.align, ' ')
        })));
    }

    Ok(lines)
}

fn column_widths(columns: &[Column], rows: &[Row]) -> Result<Vec<usize>> {
    columns
        .iter()
        .map(|column| {
            rows.iter().try_fold(text_width(column.caption), |width, row| {
                let cell = row.get(column.field).ok_or_else(|| ReportError::MissingCell {
                    field: column.field.to_string(),
                })?;
                Ok(width.max(text_width(cell)))
            })
        })
        .collect()
}

fn text_width(text: &str) -> usize {
    text.chars().count()
}

/// Pads `text` to exactly `width` characters with `fill`, truncating when it is
/// longer. Left alignment keeps the head of the text, right alignment the tail.
fn pad(text: &str, width: usize, align: Align, fill: char) -> String {
    let len = text_width(text);
    let padding = fill.to_string().repeat(width.saturating_sub(len));
    match align {
        Align::Left => {
            let head: String = text.chars().take(width).collect();
            format!("{head}{padding}")
        }
        Align::Right => {
            let tail: String = text.chars().skip(len.saturating_sub(width)).collect();
            format!("{padding}{tail}")
        }
    }
}

fn line<I: IntoIterator<Item = String>>(cells: I) -> String {
    let cells: Vec<String> = cells.into_iter().collect();
    format!("| {} |", cells.join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(cells: &[(&'static str, &str)]) -> Row {
        cells.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn widths_come_from_longest_cell_or_caption() {
        let columns = [Column::left("Name", "name"), Column::right("Commits", "commits")];
        let rows = [
            row(&[("name", "Bo"), ("commits", "7")]),
            row(&[("name", "Alexandra"), ("commits", "12")]),
        ];

        let lines = render(&columns, &rows).unwrap();
        assert_eq!(
            lines,
            vec![
                "| Name      | Commits |",
                "| :-------- | ------: |",
                "| Bo        |       7 |",
                "| Alexandra |      12 |",
            ]
        );
    }

    #[test]
    fn empty_row_set_renders_header_and_divider() {
        let columns = [Column::left(" ", "picture"), Column::right("Files", "files")];
        let lines = render(&columns, &[]).unwrap();
        assert_eq!(lines, vec!["|   | Files |", "| : | ----: |"]);
    }

    #[test]
    fn missing_cell_is_reported() {
        let columns = [Column::left("Name", "name"), Column::right("Commits", "commits")];
        let rows = [row(&[("name", "Bo")])];
        let err = render(&columns, &rows).unwrap_err();
        assert!(matches!(err, ReportError::MissingCell { field } if field == "commits"));
    }

    #[test]
    fn pad_truncates_to_width() {
        assert_eq!(pad("abcdef", 3, Align::Left, ' '), "abc");
        assert_eq!(pad("abcdef", 3, Align::Right, ' '), "def");
        assert_eq!(pad(":", 4, Align::Left, '-'), ":---");
        assert_eq!(pad(":", 4, Align::Right, '-'), "---:");
    }

    #[test]
    fn widths_count_characters_not_bytes() {
        let columns = [Column::left("Name", "name")];
        let rows = [row(&[("name", "Zoë Ångström")])];
        let lines = render(&columns, &rows).unwrap();
        assert_eq!(lines[0], format!("| Name{} |", " ".repeat(8)));
        assert_eq!(lines[2], "| Zoë Ångström |");
    }
}
