//! Plain-text table rendering for report output.

use tabula_core::Value;
use unicode_width::UnicodeWidthStr;

use crate::reports::Report;

/// Formats a single value for display. Null renders as an empty cell,
/// timestamps as `yyyy-mm-dd`, floats with up to two trimmed decimals.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Boolean(b) => b.to_string(),
        Value::Int32(n) => n.to_string(),
        Value::Int64(n) => n.to_string(),
        Value::Float64(f) => {
            let text = format!("{:.2}", f);
            let trimmed = text.trim_end_matches('0').trim_end_matches('.');
            trimmed.to_string()
        }
        Value::String(s) => s.as_str().to_string(),
        Value::DateTime(ms) => chrono::DateTime::from_timestamp_millis(*ms)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
    }
}

/// Renders a report as an aligned text table with a title line, a header
/// row and a dashed separator. Column widths are display widths, so
/// non-ASCII cell content stays aligned.
pub fn render_table(report: &Report) -> String {
    let rows: Vec<Vec<String>> = report
        .relation
        .iter()
        .map(|entry| {
            (0..report.columns.len())
                .map(|i| entry.get_field(i).map(format_value).unwrap_or_default())
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = report.columns.iter().map(|c| c.width()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if cell.width() > widths[i] {
                widths[i] = cell.width();
            }
        }
    }

    let mut out = String::new();
    out.push_str("== ");
    out.push_str(&report.title);
    out.push_str(" ==\n");

    let header: Vec<String> = report
        .columns
        .iter()
        .zip(&widths)
        .map(|(c, &w)| pad(c, w))
        .collect();
    out.push_str(header.join(" | ").trim_end());
    out.push('\n');

    let total = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);
    out.push_str(&"-".repeat(total));
    out.push('\n');

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| pad(cell, w))
            .collect();
        // Padding the last column would leave trailing spaces
        out.push_str(cells.join(" | ").trim_end());
        out.push('\n');
    }

    out
}

fn pad(text: &str, width: usize) -> String {
    let mut padded = text.to_string();
    for _ in text.width()..width {
        padded.push(' ');
    }
    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use tabula_core::Row;
    use tabula_query::executor::Relation;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&Value::Null), "");
        assert_eq!(format_value(&Value::Boolean(true)), "true");
        assert_eq!(format_value(&Value::Int64(42)), "42");
        assert_eq!(format_value(&Value::Float64(5500.0)), "5500");
        assert_eq!(format_value(&Value::Float64(4666.666)), "4666.67");
        assert_eq!(format_value(&Value::String("Pen".into())), "Pen");
        // 2025-01-05T10:00:00Z
        assert_eq!(format_value(&Value::DateTime(1736071200000)), "2025-01-05");
    }

    #[test]
    fn test_render_alignment() {
        let rows = vec![
            Rc::new(Row::create(vec![
                Value::Int32(1),
                Value::String("Mouse".into()),
            ])),
            Rc::new(Row::create(vec![
                Value::Int32(2),
                Value::String("Mechanical Keyboard".into()),
            ])),
        ];
        let report = Report {
            title: "Products".into(),
            columns: vec!["Id", "Name"],
            relation: Relation::from_rows(rows, vec!["Products".into()]),
        };

        let text = render_table(&report);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "== Products ==");
        assert_eq!(lines[1], "Id | Name");
        assert!(lines[2].chars().all(|c| c == '-'));
        assert_eq!(lines[3], "1  | Mouse");
        assert_eq!(lines[4], "2  | Mechanical Keyboard");
    }

    #[test]
    fn test_last_column_not_padded() {
        let rows = vec![
            Rc::new(Row::create(vec![
                Value::String("Engineering".into()),
                Value::Int64(3),
            ])),
            Rc::new(Row::create(vec![Value::String("Sales".into()), Value::Null])),
        ];
        let report = Report {
            title: "Rollup".into(),
            columns: vec!["Department", "Employees"],
            relation: Relation::from_rows(rows, vec!["Departments".into()]),
        };

        let text = render_table(&report);
        for line in text.lines() {
            assert_eq!(line, line.trim_end());
        }
    }

    #[test]
    fn test_render_empty_relation() {
        let report = Report {
            title: "Empty".into(),
            columns: vec!["A"],
            relation: Relation::empty(),
        };
        let text = render_table(&report);
        assert_eq!(text.lines().count(), 3);
    }
}
