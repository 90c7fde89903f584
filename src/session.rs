use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::csat;
use crate::error::CsatError;
use crate::filter::{self, TimeRange};
use crate::models::{DailyCsat, Dataset, EntityCsat};

/// An uploaded dataset and when it was loaded.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub source_name: String,
    pub dataset: Dataset,
    pub loaded_at: DateTime<Local>,
}

impl Session {
    pub fn new(source_name: impl Into<String>, dataset: Dataset) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_name: source_name.into(),
            dataset,
            loaded_at: Local::now(),
        }
    }
}

/// Filter selections for one dashboard interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub range: TimeRange,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub entity: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub end: Option<NaiveDate>,
}

/// Treats a blank form value (a cleared date picker sends `start=`) as unset.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Everything the dashboard shows for one set of selections.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub range: TimeRange,
    pub summary: Vec<EntityCsat>,
    pub entities: Vec<String>,
    pub selected_entity: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub daily: Option<DailyCsat>,
}

impl DashboardView {
    pub fn build(
        dataset: &Dataset,
        config: &SessionConfig,
        now: NaiveDateTime,
    ) -> Result<Self, CsatError> {
        let recent = filter::filter_by_time_range(&dataset.records, config.range, now);
        let summary = csat::csat_by_entity(&recent)?;

        let entities = dataset.entities();
        let selected_entity = config
            .entity
            .clone()
            .or_else(|| entities.first().cloned());

        let span = dataset.date_span();
        let start = config.start.or(span.map(|(min, _)| min));
        let end = config.end.or(span.map(|(_, max)| max));

        let daily = match (&selected_entity, start, end) {
            (Some(entity), Some(start), Some(end)) => {
                Some(daily_for_dates(dataset, entity, start, end)?)
            }
            _ => None,
        };

        Ok(Self {
            range: config.range,
            summary,
            entities,
            selected_entity,
            start,
            end,
            daily,
        })
    }
}

/// Daily CSAT for `entity` between two calendar dates, both days included.
pub fn daily_for_dates(
    dataset: &Dataset,
    entity: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<DailyCsat, CsatError> {
    let window = filter::filter_by_date_range(
        &dataset.records,
        filter::start_of_day(start),
        filter::end_of_day(end),
    );
    csat::daily_csat(&window, entity)
}
