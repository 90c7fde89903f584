use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::error::CsatError;
use crate::filter::{self, TimeRange};
use crate::models::{format_percentage, DailyCsat, Dataset, EntityCsat};
use crate::{csat, session};

pub const NO_DAILY_DATA: &str = "No data available for the selected date range.";

pub fn summary_table(summary: &[EntityCsat]) -> String {
    let mut output = String::new();
    let width = summary
        .iter()
        .map(|row| row.entity.chars().count())
        .max()
        .unwrap_or(0)
        .max("Entity".len());

    let _ = writeln!(
        output,
        "{:<width$}  {:>9}  {:>17}",
        "Entity", "CSAT (%)", "Total Submissions"
    );
    for row in summary {
        let _ = writeln!(
            output,
            "{:<width$}  {:>9}  {:>17}",
            row.entity,
            row.formatted_csat(),
            row.total_submissions
        );
    }
    output
}

pub fn daily_table(daily: &DailyCsat) -> String {
    if daily.is_empty() {
        return format!("{NO_DAILY_DATA}\n");
    }

    let mut output = String::new();
    let _ = writeln!(output, "{:<10}  {:>9}  {:>11}", "Date", "CSAT (%)", "Respondents");
    for point in &daily.points {
        let _ = writeln!(
            output,
            "{:<10}  {:>9}  {:>11}",
            point.date.to_string(),
            format_percentage(point.csat),
            point.respondents
        );
    }
    output
}

pub fn build_report(
    source: &str,
    dataset: &Dataset,
    range: TimeRange,
    entity: Option<&str>,
    now: NaiveDateTime,
) -> Result<String, CsatError> {
    let recent = filter::filter_by_time_range(&dataset.records, range, now);
    let summary = csat::csat_by_entity(&recent)?;

    let mut output = String::new();
    let _ = writeln!(output, "# CSAT Report");
    let _ = writeln!(
        output,
        "Generated from {} on {} ({} submissions)",
        source,
        now.format("%Y-%m-%d %H:%M"),
        dataset.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## CSAT Breakdown by Entity ({range})");

    if summary.is_empty() {
        let _ = writeln!(output, "No submissions recorded for this window.");
    } else {
        let _ = writeln!(output, "| Entity | CSAT (%) | Total Submissions |");
        let _ = writeln!(output, "| --- | ---: | ---: |");
        for row in &summary {
            let _ = writeln!(
                output,
                "| {} | {} | {} |",
                row.entity,
                row.formatted_csat(),
                row.total_submissions
            );
        }
    }

    let entities = match entity {
        Some(entity) => vec![entity.to_string()],
        None => dataset.entities(),
    };

    let Some((start, end)) = dataset.date_span() else {
        return Ok(output);
    };

    for entity in entities {
        let daily = session::daily_for_dates(dataset, &entity, start, end)?;
        let _ = writeln!(output);
        let _ = writeln!(output, "## CSAT Day-by-Day for {entity} ({start} to {end})");

        if daily.is_empty() {
            let _ = writeln!(output, "{NO_DAILY_DATA}");
            continue;
        }

        let _ = writeln!(output, "| Date | CSAT (%) | Respondents |");
        let _ = writeln!(output, "| --- | ---: | ---: |");
        for point in &daily.points {
            let _ = writeln!(
                output,
                "| {} | {} | {} |",
                point.date,
                format_percentage(point.csat),
                point.respondents
            );
        }
    }

    Ok(output)
}
