use std::io::Write;
use std::path::Path;

use anyhow::Context;

use crate::models::AnalysisResult;
use crate::view;

#[derive(serde::Serialize)]
struct CsvRow<'a> {
    name: &'a str,
    location: &'a str,
    avg_score: f64,
    eligible: bool,
    eligibility: &'a str,
}

pub fn write_detail_csv<W: Write>(result: &AnalysisResult, out: W) -> anyhow::Result<usize> {
    let mut writer = csv::Writer::from_writer(out);
    let rows = view::detail_rows(result);

    for row in &rows {
        writer.serialize(CsvRow {
            name: &row.name,
            location: &row.location,
            avg_score: row.avg_score,
            eligible: row.badge == view::EligibilityBadge::Eligible,
            eligibility: row.badge.label(),
        })?;
    }

    writer.flush()?;
    Ok(rows.len())
}

pub fn export_detail_csv(result: &AnalysisResult, path: &Path) -> anyhow::Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_detail_csv(result, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::sample_result;

    #[test]
    fn writes_one_line_per_record_in_order() {
        let mut buffer = Vec::new();
        let written = write_detail_csv(&sample_result(), &mut buffer).unwrap();
        assert_eq!(written, 2);

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "name,location,avg_score,eligible,eligibility");
        assert_eq!(lines[1], "Li Wei,Beijing,88.26,true,Eligible");
        assert_eq!(lines[2], "Zhang Min,Shanghai,61.04,false,Not eligible");
    }

    #[test]
    fn export_creates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("details.csv");
        export_detail_csv(&sample_result(), &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.records().count(), 2);
    }
}
