use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::models::JournalEntry;

const COL_TEXT: &str = "text";
const COL_TEXT_CLEAN: &str = "text_clean";
const COL_EMOTION: &str = "emotion";
const COL_DISTORTION: &str = "bias/distortion";
const COL_CONTEXT: &str = "context";
const COL_DATE: &str = "date";

/// Header positions of the recognized columns. Only `text` is required;
/// every other column degrades gracefully when absent.
#[derive(Debug, Default)]
struct ColumnMap {
    text: Option<usize>,
    text_clean: Option<usize>,
    emotion: Option<usize>,
    distortion: Option<usize>,
    context: Option<usize>,
    date: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let mut map = Self::default();
        for (i, name) in headers.iter().enumerate() {
            match name.trim() {
                COL_TEXT => map.text = Some(i),
                COL_TEXT_CLEAN => map.text_clean = Some(i),
                COL_EMOTION => map.emotion = Some(i),
                COL_DISTORTION => map.distortion = Some(i),
                COL_CONTEXT => map.context = Some(i),
                COL_DATE => map.date = Some(i),
                _ => {}
            }
        }
        map
    }
}

fn cell(record: &csv::StringRecord, idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| record.get(i))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Read journal entries from any CSV source. Values arrive already
/// coerced to strings upstream; the engine never parses beyond dates.
pub fn read_entries<R: Read>(reader: R, cfg: &EngineConfig) -> Result<Vec<JournalEntry>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr.headers().context("reading CSV headers")?.clone();
    let cols = ColumnMap::from_headers(&headers);

    let Some(text_idx) = cols.text else {
        bail!("input table has no '{}' column (found: {:?})", COL_TEXT, headers);
    };
    if cols.text_clean.is_none() {
        warn!(
            "No '{}' column - falling back to raw '{}' (normalization is upstream's job)",
            COL_TEXT_CLEAN, COL_TEXT
        );
    }

    let mut entries = Vec::new();
    let mut bad_dates = 0usize;
    for (id, row) in rdr.records().enumerate() {
        let row = row.with_context(|| format!("reading CSV row {}", id + 1))?;
        let raw_text = row.get(text_idx).unwrap_or("").trim().to_string();
        let normalized_text = cell(&row, cols.text_clean).unwrap_or_else(|| raw_text.clone());

        let date = cell(&row, cols.date).and_then(|s| {
            match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
                Ok(d) => Some(d),
                Err(_) => {
                    bad_dates += 1;
                    None
                }
            }
        });

        entries.push(JournalEntry {
            id,
            raw_text,
            normalized_text,
            date,
            emotion: cell(&row, cols.emotion),
            annotated_distortion: cell(&row, cols.distortion),
            context: cell(&row, cols.context),
        });
    }
    if bad_dates > 0 {
        warn!("Unparseable dates coerced to empty - rows={}", bad_dates);
    }

    // no date column at all: allocate consecutive days so period
    // aggregation still works
    if cols.date.is_none() {
        let mut day = cfg.synthetic_start_date;
        for e in entries.iter_mut() {
            e.date = Some(day);
            day = day.succ_opt().unwrap_or(day);
        }
        debug!(
            "Synthetic dates allocated - start={}, entries={}",
            cfg.synthetic_start_date,
            entries.len()
        );
    }

    Ok(entries)
}

pub fn load_journal_csv(path: &Path, cfg: &EngineConfig) -> Result<Vec<JournalEntry>> {
    let start = std::time::Instant::now();
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening input {}", path.display()))?;
    let entries = read_entries(file, cfg)
        .with_context(|| format!("ingesting {}", path.display()))?;
    info!(
        "Input loaded - path={}, entries={}, duration={:.2}s",
        path.display(),
        entries.len(),
        start.elapsed().as_secs_f32()
    );
    Ok(entries)
}

/// Quick shape-of-the-data report logged at startup and echoed in the
/// rendered output.
#[derive(Debug, Clone, Serialize)]
pub struct EdaReport {
    pub entry_count: usize,
    pub with_date: usize,
    pub with_emotion: usize,
    pub with_annotation: usize,
    pub with_context: usize,
    pub unique_emotions: Vec<String>,
    pub unique_annotations: Vec<String>,
    pub avg_text_length: f64,
}

pub fn basic_eda_report(entries: &[JournalEntry]) -> EdaReport {
    let mut unique_emotions: Vec<String> = Vec::new();
    let mut unique_annotations: Vec<String> = Vec::new();
    for e in entries {
        if let Some(em) = &e.emotion {
            if !unique_emotions.contains(em) {
                unique_emotions.push(em.clone());
            }
        }
        if let Some(an) = &e.annotated_distortion {
            if !unique_annotations.contains(an) {
                unique_annotations.push(an.clone());
            }
        }
    }

    let avg_text_length = if entries.is_empty() {
        0.0
    } else {
        entries.iter().map(|e| e.raw_text.chars().count()).sum::<usize>() as f64
            / entries.len() as f64
    };

    let report = EdaReport {
        entry_count: entries.len(),
        with_date: entries.iter().filter(|e| e.date.is_some()).count(),
        with_emotion: entries.iter().filter(|e| e.emotion.is_some()).count(),
        with_annotation: entries.iter().filter(|e| e.annotated_distortion.is_some()).count(),
        with_context: entries.iter().filter(|e| e.context.is_some()).count(),
        unique_emotions,
        unique_annotations,
        avg_text_length,
    };
    info!(
        "EDA - entries={}, dated={}, emotions={}, avg_len={:.1}",
        report.entry_count, report.with_date, report.unique_emotions.len(), report.avg_text_length
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn full_table_round_trips() {
        let csv = "\
text,text_clean,emotion,bias/distortion,context,date
I can't do this!,cant do this,anxiety,catastrophizing,work,2024-02-01
A lovely day.,lovely day,joy,,home,2024-02-02
";
        let entries = read_entries(csv.as_bytes(), &cfg()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, 0);
        assert_eq!(entries[0].raw_text, "I can't do this!");
        assert_eq!(entries[0].normalized_text, "cant do this");
        assert_eq!(entries[0].emotion.as_deref(), Some("anxiety"));
        assert_eq!(entries[0].annotated_distortion.as_deref(), Some("catastrophizing"));
        assert_eq!(entries[0].date, NaiveDate::from_ymd_opt(2024, 2, 1));
        // empty cell degrades to None
        assert_eq!(entries[1].annotated_distortion, None);
    }

    #[test]
    fn missing_text_column_is_fatal() {
        let csv = "body,date\nhello,2024-01-01\n";
        let err = read_entries(csv.as_bytes(), &cfg()).unwrap_err();
        assert!(err.to_string().contains("'text' column"));
    }

    #[test]
    fn missing_text_clean_falls_back_to_raw() {
        let csv = "text\nSome Raw Text\n";
        let entries = read_entries(csv.as_bytes(), &cfg()).unwrap();
        assert_eq!(entries[0].normalized_text, "Some Raw Text");
    }

    #[test]
    fn absent_date_column_gets_synthetic_consecutive_days() {
        let csv = "text\none\ntwo\nthree\n";
        let entries = read_entries(csv.as_bytes(), &cfg()).unwrap();
        let dates: Vec<NaiveDate> = entries.iter().map(|e| e.date.unwrap()).collect();
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(dates[1], NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn unparseable_date_becomes_none_not_an_error() {
        let csv = "text,date\nok,2024-01-05\nbad,yesterday\n";
        let entries = read_entries(csv.as_bytes(), &cfg()).unwrap();
        assert!(entries[0].date.is_some());
        assert!(entries[1].date.is_none());
    }

    #[test]
    fn empty_text_rows_are_valid_entries() {
        let csv = "text,text_clean\n,\n";
        let entries = read_entries(csv.as_bytes(), &cfg()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].raw_text, "");
        assert_eq!(entries[0].normalized_text, "");
    }

    #[test]
    fn eda_report_shapes() {
        let csv = "\
text,emotion,date
first entry,joy,2024-01-01
second,joy,2024-01-02
third,,bad-date
";
        let entries = read_entries(csv.as_bytes(), &cfg()).unwrap();
        let report = basic_eda_report(&entries);
        assert_eq!(report.entry_count, 3);
        assert_eq!(report.with_date, 2);
        assert_eq!(report.with_emotion, 2);
        assert_eq!(report.unique_emotions, vec!["joy".to_string()]);
        assert!(report.avg_text_length > 0.0);
    }
}
