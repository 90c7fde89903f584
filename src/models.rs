use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// One survey submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub entity: String,
    pub rating: u8,
    pub submitted_at: NaiveDateTime,
}

impl Record {
    pub fn is_satisfied(&self) -> bool {
        matches!(self.rating, 4 | 5)
    }
}

/// Survey submissions loaded from a single CSV file.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct entities in order of first appearance.
    pub fn entities(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.records
            .iter()
            .filter(|record| seen.insert(record.entity.as_str()))
            .map(|record| record.entity.clone())
            .collect()
    }

    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.submitted_at).min()?;
        let max = self.records.iter().map(|r| r.submitted_at).max()?;
        Some((min.date(), max.date()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityCsat {
    pub entity: String,
    pub csat: f64,
    pub total_submissions: usize,
}

impl EntityCsat {
    pub fn formatted_csat(&self) -> String {
        format_percentage(self.csat)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub csat: f64,
    pub respondents: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCsat {
    pub entity: String,
    pub points: Vec<DailyPoint>,
}

impl DailyCsat {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

pub fn format_percentage(value: f64) -> String {
    format!("{value:.2}%")
}
