use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::CsatError;
use crate::models::{DailyCsat, DailyPoint, EntityCsat, Record};

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    satisfied: usize,
    total: usize,
}

impl Tally {
    fn add(&mut self, record: &Record) {
        if record.is_satisfied() {
            self.satisfied += 1;
        }
        self.total += 1;
    }
}

/// Percentage of satisfied responses; errors instead of dividing by zero.
pub fn satisfaction_percentage(satisfied: usize, total: usize) -> Result<f64, CsatError> {
    if total == 0 {
        return Err(CsatError::EmptyGroup);
    }
    Ok(satisfied as f64 / total as f64 * 100.0)
}

/// CSAT and submission count per entity, ordered by entity.
pub fn csat_by_entity(records: &[Record]) -> Result<Vec<EntityCsat>, CsatError> {
    let mut groups: BTreeMap<&str, Tally> = BTreeMap::new();

    for record in records {
        groups.entry(record.entity.as_str()).or_default().add(record);
    }

    groups
        .into_iter()
        .map(|(entity, tally)| {
            Ok(EntityCsat {
                entity: entity.to_string(),
                csat: satisfaction_percentage(tally.satisfied, tally.total)?,
                total_submissions: tally.total,
            })
        })
        .collect()
}

/// Day-by-day CSAT for one entity in chronological order.
pub fn daily_csat(records: &[Record], entity: &str) -> Result<DailyCsat, CsatError> {
    let mut days: BTreeMap<NaiveDate, Tally> = BTreeMap::new();

    for record in records.iter().filter(|record| record.entity == entity) {
        days.entry(record.submitted_at.date()).or_default().add(record);
    }

    let points = days
        .into_iter()
        .map(|(date, tally)| {
            Ok(DailyPoint {
                date,
                csat: satisfaction_percentage(tally.satisfied, tally.total)?,
                respondents: tally.total,
            })
        })
        .collect::<Result<Vec<_>, CsatError>>()?;

    Ok(DailyCsat {
        entity: entity.to_string(),
        points,
    })
}
