use std::fmt::Write;

use chrono::{DateTime, Utc};
use unicode_width::UnicodeWidthStr;

use crate::models::AnalysisResult;
use crate::view::{self, SeriesKey, SeriesPoint};

const BAR_WIDTH: usize = 30;

pub fn bar_width(value: f64, max: f64, width: usize) -> usize {
    if max <= 0.0 || value <= 0.0 {
        return 0;
    }
    ((value / max) * width as f64).round().min(width as f64) as usize
}

/// Right-pads to `width` terminal columns; CJK characters count as two.
pub fn pad_display(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    format!("{text}{}", " ".repeat(width.saturating_sub(used)))
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, min: usize) -> usize {
    values.map(UnicodeWidthStr::width).max().unwrap_or(0).max(min)
}

/// Escapes text for a markdown table cell.
pub fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn series_max(series: &[SeriesPoint], key: SeriesKey) -> f64 {
    series
        .iter()
        .map(|point| point.value(key))
        .fold(0.0, f64::max)
}

pub fn render_terminal(result: &AnalysisResult, limit: Option<usize>) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Analysis of {} ({})", result.filename, result.status);
    let _ = writeln!(output);
    for tile in view::summary_tiles(result) {
        let _ = writeln!(output, "  {:<18}{}", tile.label, tile.value);
    }

    let series = view::location_series(result);
    let _ = writeln!(output);
    let _ = writeln!(output, "Locations");
    if series.is_empty() {
        let _ = writeln!(output, "  No location statistics returned.");
    } else {
        let name_width = column_width(series.iter().map(|point| point.location.as_str()), 8);
        let _ = writeln!(
            output,
            "  {}  {:>6}  {:>9}  {:>8}",
            pad_display("location", name_width),
            "count",
            "avg score",
            "eligible"
        );
        for point in &series {
            let _ = writeln!(
                output,
                "  {}  {:>6}  {:>9}  {:>8}",
                pad_display(&point.location, name_width),
                point.count,
                point.avg_score,
                point.eligible
            );
        }

        let _ = writeln!(output);
        for key in SeriesKey::ALL {
            let max = series_max(&series, key);
            let _ = writeln!(output, "  {}", key.label());
            for point in &series {
                let value = point.value(key);
                let _ = writeln!(
                    output,
                    "    {} {} {}",
                    pad_display(&point.location, name_width),
                    "█".repeat(bar_width(value, max, BAR_WIDTH)),
                    value
                );
            }
        }
    }

    let rows = view::detail_rows(result);
    let _ = writeln!(output);
    let _ = writeln!(output, "Records");
    if rows.is_empty() {
        let _ = writeln!(output, "  No records returned.");
    } else {
        let shown = limit.unwrap_or(rows.len()).min(rows.len());
        let visible = &rows[..shown];
        let name_width = column_width(visible.iter().map(|row| row.name.as_str()), 4);
        let location_width = column_width(visible.iter().map(|row| row.location.as_str()), 8);
        for row in visible {
            let _ = writeln!(
                output,
                "  {} {} {:>6}  [{}]",
                pad_display(&row.name, name_width),
                pad_display(&row.location, location_width),
                row.display_score(),
                row.badge.label()
            );
        }
        if shown < rows.len() {
            let _ = writeln!(output, "  ... {} more", rows.len() - shown);
        }
    }

    output
}

pub fn build_report(result: &AnalysisResult, generated_at: DateTime<Utc>) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Analysis Report: {}", result.filename);
    let _ = writeln!(
        output,
        "Generated {} (service status: {})",
        generated_at.format("%Y-%m-%d %H:%M UTC"),
        result.status
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    for tile in view::summary_tiles(result) {
        let _ = writeln!(output, "- {}: {}", tile.label, tile.value);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Locations");
    let series = view::location_series(result);
    if series.is_empty() {
        let _ = writeln!(output, "No location statistics returned.");
    } else {
        let _ = writeln!(output, "| Location | Count | Avg score | Eligible |");
        let _ = writeln!(output, "|---|---:|---:|---:|");
        for point in &series {
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} |",
                escape_cell(&point.location),
                point.count,
                point.avg_score,
                point.eligible
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Records");
    let rows = view::detail_rows(result);
    if rows.is_empty() {
        let _ = writeln!(output, "No records returned.");
    } else {
        let _ = writeln!(output, "| Name | Location | Avg score | Eligibility |");
        let _ = writeln!(output, "|---|---|---:|---|");
        for row in &rows {
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} |",
                escape_cell(&row.name),
                escape_cell(&row.location),
                row.display_score(),
                row.badge.label()
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::tests::sample_result;

    #[test]
    fn bars_scale_against_the_largest_value() {
        assert_eq!(bar_width(10.0, 10.0, 30), 30);
        assert_eq!(bar_width(5.0, 10.0, 30), 15);
        assert_eq!(bar_width(0.0, 10.0, 30), 0);
        assert_eq!(bar_width(3.0, 0.0, 30), 0);
    }

    #[test]
    fn terminal_view_lists_locations_in_order() {
        let text = render_terminal(&sample_result(), None);
        let beijing = text.find("Beijing").unwrap();
        let shanghai = text.find("Shanghai").unwrap();
        assert!(beijing < shanghai);
        assert!(text.contains("88.3"));
        assert!(text.contains("[Eligible]"));
        assert!(text.contains("[Not eligible]"));
    }

    #[test]
    fn terminal_view_honours_the_row_limit() {
        let text = render_terminal(&sample_result(), Some(1));
        assert!(text.contains("Li Wei"));
        assert!(!text.contains("Zhang Min"));
        assert!(text.contains("... 1 more"));
    }

    #[test]
    fn padding_counts_wide_characters_twice() {
        assert_eq!(pad_display("北京", 6), "北京  ");
        assert_eq!(pad_display("Beijing", 6), "Beijing");
        assert_eq!(UnicodeWidthStr::width(pad_display("李伟", 8).as_str()), 8);
    }

    #[test]
    fn record_columns_line_up_with_cjk_names() {
        let mut result = sample_result();
        result.detailed_results[0].name = "李伟".into();
        result.detailed_results[0].location = "北京".into();
        let text = render_terminal(&result, None);

        let score_columns: Vec<usize> = text
            .lines()
            .filter(|line| line.contains("[Eligible]") || line.contains("[Not eligible]"))
            .map(|line| {
                let score_end = line.find("  [").unwrap();
                UnicodeWidthStr::width(&line[..score_end])
            })
            .collect();
        assert_eq!(score_columns.len(), 2);
        assert_eq!(score_columns[0], score_columns[1]);
    }

    #[test]
    fn markdown_cells_escape_pipes() {
        let mut result = sample_result();
        result.detailed_results[0].name = "Li | Wei".into();
        let report = build_report(&result, Utc::now());
        assert!(report.contains("| Li \\| Wei | Beijing | 88.3 | Eligible |"));
        assert_eq!(escape_cell("a|b|c"), "a\\|b\\|c");
    }

    #[test]
    fn markdown_report_has_every_section() {
        let generated = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let report = build_report(&sample_result(), generated);
        assert!(report.starts_with("# Analysis Report: users.csv"));
        assert!(report.contains("Generated 2026-03-01 09:30 UTC"));
        assert!(report.contains("- Eligible users: 42"));
        assert!(report.contains("| Beijing | 10 | 82.5 | 7 |"));
        assert!(report.contains("| Li Wei | Beijing | 88.3 | Eligible |"));
        assert!(report.contains("| Zhang Min | Shanghai | 61.0 | Not eligible |"));
    }
}
