use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use anyhow::Context;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Extensions offered by the file picker.
pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["csv", "xlsx", "json", "txt"];

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("{} has no usable file name", path.display()))?
            .to_string();
        let bytes =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Self::new(name, bytes))
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }

    pub fn has_accepted_extension(&self) -> bool {
        self.extension()
            .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }

    pub fn mime_type(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("csv") => "text/csv",
            Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Some("json") => "application/json",
            Some("txt") => "text/plain",
            _ => "application/octet-stream",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub filename: String,
    pub status: String,
    pub summary: Summary,
    #[serde(with = "ordered_locations")]
    pub location_stats: Vec<LocationStat>,
    pub detailed_results: Vec<DetailRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_users: u64,
    pub eligible_users: u64,
    pub eligibility_rate: f64,
    pub overall_avg_score: f64,
}

/// One entry of `location_stats`; the location name is the map key on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationStat {
    pub location: String,
    pub count: u64,
    pub avg_score: f64,
    pub eligible: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct LocationFields {
    count: u64,
    avg_score: f64,
    eligible: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    #[serde(rename = "Name", alias = "name")]
    pub name: String,
    #[serde(rename = "Location", alias = "location")]
    pub location: String,
    pub avg_score: f64,
    #[serde(rename = "EligibleStatus", alias = "eligible_status")]
    pub eligible_status: String,
}

impl AnalysisResult {
    /// Checks the numeric relationships serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        let summary = &self.summary;
        if summary.eligible_users > summary.total_users {
            return Err(format!(
                "eligible_users ({}) exceeds total_users ({})",
                summary.eligible_users, summary.total_users
            ));
        }
        if !(0.0..=100.0).contains(&summary.eligibility_rate) {
            return Err(format!(
                "eligibility_rate {} is outside 0-100",
                summary.eligibility_rate
            ));
        }
        for stat in &self.location_stats {
            if stat.eligible > stat.count {
                return Err(format!(
                    "location {} has eligible ({}) above count ({})",
                    stat.location, stat.eligible, stat.count
                ));
            }
        }
        Ok(())
    }

    /// Canonical indented JSON used for clipboard and `--json` output.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

mod ordered_locations {
    use super::*;

    pub fn serialize<S>(stats: &[LocationStat], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(stats.len()))?;
        for stat in stats {
            map.serialize_entry(
                &stat.location,
                &LocationFields {
                    count: stat.count,
                    avg_score: stat.avg_score,
                    eligible: stat.eligible,
                },
            )?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<LocationStat>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(OrderedLocationsVisitor)
    }

    struct OrderedLocationsVisitor;

    impl<'de> Visitor<'de> for OrderedLocationsVisitor {
        type Value = Vec<LocationStat>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of location name to location statistics")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut stats: Vec<LocationStat> = Vec::with_capacity(access.size_hint().unwrap_or(0));
            let mut index: HashMap<String, usize> = HashMap::with_capacity(stats.capacity());
            while let Some((location, fields)) = access.next_entry::<String, LocationFields>()? {
                let stat = LocationStat {
                    location,
                    count: fields.count,
                    avg_score: fields.avg_score,
                    eligible: fields.eligible,
                };
                // A repeated key keeps its first position and takes the latest value.
                match index.get(&stat.location) {
                    Some(&position) => stats[position] = stat,
                    None => {
                        index.insert(stat.location.clone(), stats.len());
                        stats.push(stat);
                    }
                }
            }
            Ok(stats)
        }
    }
}
