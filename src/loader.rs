use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::error::LoadError;
use crate::models::{Dataset, Record};

pub const ENTITY_COLUMN: &str = "Entity";
pub const RATING_COLUMN: &str = "Rating";
pub const SUBMITTED_AT_COLUMN: &str = "Submitted At";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Entity")]
    entity: String,
    #[serde(rename = "Rating")]
    rating: String,
    #[serde(rename = "Submitted At")]
    submitted_at: String,
}

pub fn load_path(path: &Path) -> Result<Dataset, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let dataset = load_reader(file)?;
    info!(
        path = %path.display(),
        records = dataset.len(),
        "loaded survey CSV"
    );
    Ok(dataset)
}

pub fn load_reader<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|name| name.trim().to_string())
        .collect();

    for required in [ENTITY_COLUMN, RATING_COLUMN, SUBMITTED_AT_COLUMN] {
        if !columns.iter().any(|name| name == required) {
            return Err(LoadError::MissingColumn(required));
        }
    }

    let mut records = Vec::new();
    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        records.push(parse_row(index + 1, row)?);
    }

    debug!(columns = ?columns, records = records.len(), "parsed CSV rows");
    Ok(Dataset::new(columns, records))
}

fn parse_row(row_number: usize, row: CsvRow) -> Result<Record, LoadError> {
    let submitted_at = parse_timestamp(&row.submitted_at).ok_or_else(|| {
        LoadError::InvalidTimestamp {
            row: row_number,
            value: row.submitted_at.clone(),
        }
    })?;

    let rating = row
        .rating
        .trim()
        .parse::<u8>()
        .ok()
        .filter(|value| (1..=5).contains(value))
        .ok_or_else(|| LoadError::InvalidRating {
            row: row_number,
            value: row.rating.clone(),
        })?;

    Ok(Record {
        entity: row.entity,
        rating,
        submitted_at,
    })
}

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn strips_whitespace_around_headers() {
        let csv = " Entity , Rating ,Submitted At  \nSupport,5,2024-03-01 09:15:00\n";
        let dataset = load_reader(csv.as_bytes()).unwrap();

        assert_eq!(dataset.columns, vec!["Entity", "Rating", "Submitted At"]);
        assert_eq!(dataset.len(), 1);
        let record = &dataset.records[0];
        assert_eq!(record.entity, "Support");
        assert_eq!(record.rating, 5);
        assert_eq!(
            record.submitted_at,
            parse_timestamp("2024-03-01 09:15:00").unwrap()
        );
    }

    #[test]
    fn ignores_extra_columns() {
        let csv = "Id,Entity,Rating,Submitted At,Comment\n\
                   1,Billing,2,2024-03-02 10:00:00,slow reply\n";
        let dataset = load_reader(csv.as_bytes()).unwrap();
        assert_eq!(dataset.columns.len(), 5);
        assert_eq!(dataset.records[0].entity, "Billing");
        assert_eq!(dataset.records[0].rating, 2);
    }

    #[test]
    fn reports_missing_column() {
        let csv = "Entity,Score,Submitted At\nSupport,5,2024-03-01 09:15:00\n";
        let err = load_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("Rating")));
    }

    #[test]
    fn rejects_malformed_timestamp() {
        let csv = "Entity,Rating,Submitted At\n\
                   Support,5,2024-03-01 09:15:00\n\
                   Support,4,03/01/2024 09:15\n";
        let err = load_reader(csv.as_bytes()).unwrap_err();
        match err {
            LoadError::InvalidTimestamp { row, value } => {
                assert_eq!(row, 2);
                assert_eq!(value, "03/01/2024 09:15");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_out_of_range_rating() {
        let csv = "Entity,Rating,Submitted At\nSupport,7,2024-03-01 09:15:00\n";
        let err = load_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidRating { row: 1, .. }));

        let csv = "Entity,Rating,Submitted At\nSupport,great,2024-03-01 09:15:00\n";
        let err = load_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidRating { row: 1, .. }));
    }

    #[test]
    fn loads_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Entity,Rating,Submitted At").unwrap();
        writeln!(file, "Support,4,2024-03-01 09:15:00").unwrap();
        writeln!(file, "Billing,1,2024-03-01 11:00:00").unwrap();

        let dataset = load_path(file.path()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.entities(), vec!["Support", "Billing"]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_path(Path::new("does-not-exist.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
