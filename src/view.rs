use crate::models::AnalysisResult;

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTile {
    pub label: &'static str,
    pub value: String,
}

/// The four headline numbers, formatted at the service's own precision.
pub fn summary_tiles(result: &AnalysisResult) -> [SummaryTile; 4] {
    let summary = &result.summary;
    [
        SummaryTile {
            label: "Total users",
            value: summary.total_users.to_string(),
        },
        SummaryTile {
            label: "Eligible users",
            value: summary.eligible_users.to_string(),
        },
        SummaryTile {
            label: "Eligibility rate",
            value: format!("{}%", summary.eligibility_rate),
        },
        SummaryTile {
            label: "Average score",
            value: summary.overall_avg_score.to_string(),
        },
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub location: String,
    pub count: u64,
    pub avg_score: f64,
    pub eligible: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKey {
    Count,
    AvgScore,
    Eligible,
}

impl SeriesKey {
    pub const ALL: [SeriesKey; 3] = [SeriesKey::Count, SeriesKey::AvgScore, SeriesKey::Eligible];

    pub fn label(self) -> &'static str {
        match self {
            SeriesKey::Count => "count",
            SeriesKey::AvgScore => "avg score",
            SeriesKey::Eligible => "eligible",
        }
    }
}

impl SeriesPoint {
    pub fn value(&self, key: SeriesKey) -> f64 {
        match key {
            SeriesKey::Count => self.count as f64,
            SeriesKey::AvgScore => self.avg_score,
            SeriesKey::Eligible => self.eligible as f64,
        }
    }
}

pub fn location_series(result: &AnalysisResult) -> Vec<SeriesPoint> {
    result
        .location_stats
        .iter()
        .map(|stat| SeriesPoint {
            location: stat.location.clone(),
            count: stat.count,
            avg_score: stat.avg_score,
            eligible: stat.eligible,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibilityBadge {
    Eligible,
    NotEligible,
}

impl EligibilityBadge {
    /// Only an exact `"YES"` counts as eligible.
    pub fn from_status(status: &str) -> Self {
        if status == "YES" {
            EligibilityBadge::Eligible
        } else {
            EligibilityBadge::NotEligible
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EligibilityBadge::Eligible => "Eligible",
            EligibilityBadge::NotEligible => "Not eligible",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailRow {
    pub name: String,
    pub location: String,
    pub avg_score: f64,
    pub badge: EligibilityBadge,
}

impl DetailRow {
    pub fn display_score(&self) -> String {
        format!("{:.1}", self.avg_score)
    }
}

pub fn detail_rows(result: &AnalysisResult) -> Vec<DetailRow> {
    result
        .detailed_results
        .iter()
        .map(|record| DetailRow {
            name: record.name.clone(),
            location: record.location.clone(),
            avg_score: record.avg_score,
            badge: EligibilityBadge::from_status(&record.eligible_status),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::sample_result;
    use crate::models::DetailRecord;

    #[test]
    fn tiles_show_summary_verbatim() {
        let tiles = summary_tiles(&sample_result());
        assert_eq!(tiles[0].value, "100");
        assert_eq!(tiles[1].value, "42");
        assert_eq!(tiles[2].value, "42%");
        assert_eq!(tiles[3].value, "78.456");

        let total: u64 = tiles[0].value.parse().unwrap();
        let eligible: u64 = tiles[1].value.parse().unwrap();
        assert!(eligible <= total);
    }

    #[test]
    fn series_preserves_location_order_and_values() {
        let series = location_series(&sample_result());
        assert_eq!(
            series,
            vec![
                SeriesPoint {
                    location: "Beijing".into(),
                    count: 10,
                    avg_score: 82.5,
                    eligible: 7
                },
                SeriesPoint {
                    location: "Shanghai".into(),
                    count: 5,
                    avg_score: 75.0,
                    eligible: 2
                },
            ]
        );
        assert_eq!(series[0].value(SeriesKey::AvgScore), 82.5);
        assert_eq!(series[1].value(SeriesKey::Eligible), 2.0);
    }

    #[test]
    fn detail_rows_round_for_display_only() {
        let rows = detail_rows(&sample_result());
        assert_eq!(rows[0].name, "Li Wei");
        assert_eq!(rows[0].display_score(), "88.3");
        assert_eq!(rows[0].avg_score, 88.26);
        assert_eq!(rows[0].badge, EligibilityBadge::Eligible);
        assert_eq!(rows[1].badge, EligibilityBadge::NotEligible);
    }

    #[test]
    fn any_status_other_than_yes_is_not_eligible() {
        for status in ["NO", "yes", "", "PENDING"] {
            assert_eq!(EligibilityBadge::from_status(status), EligibilityBadge::NotEligible);
        }

        let mut result = sample_result();
        result.detailed_results.push(DetailRecord {
            name: "Wang Fang".into(),
            location: "Shenzhen".into(),
            avg_score: 90.0,
            eligible_status: "MAYBE".into(),
        });
        let rows = detail_rows(&result);
        assert_eq!(rows[2].badge.label(), "Not eligible");
        assert_eq!(rows[2].display_score(), "90.0");
    }
}
