use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::model::{Attendance, ResponseRow};
use crate::store::RESPONSE_COLUMNS;

/// Headline counts for the admin overview. A "response" is a distinct
/// contact name; a "guest" is one attending row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryReport {
    pub total_responses: usize,
    pub attending_responses: usize,
    pub not_attending_responses: usize,
    pub total_guests: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceCount {
    pub choice: String,
    pub count: usize,
}

/// One guest's free-text dietary note, attending rows only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DietaryNote {
    pub guest_name: String,
    pub requirement: String,
}

/// Per-category tallies for the menu planning page, computed over attending
/// rows only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuReport {
    pub starters: Vec<ChoiceCount>,
    pub mains: Vec<ChoiceCount>,
    pub desserts: Vec<ChoiceCount>,
    pub dietary: Vec<DietaryNote>,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not encode rows as CSV: {0}")]
    Encode(#[from] csv::Error),
    #[error("could not flush CSV export: {0}")]
    Flush(#[from] std::io::Error),
    #[error("CSV export was not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub fn summarize(rows: &[ResponseRow]) -> SummaryReport {
    let unique = |wanted: Option<Attendance>| {
        rows.iter()
            .filter(|row| wanted.map_or(true, |a| row.attending == a))
            .map(|row| row.contact_name.as_str())
            .collect::<HashSet<_>>()
            .len()
    };

    SummaryReport {
        total_responses: unique(None),
        attending_responses: unique(Some(Attendance::Yes)),
        not_attending_responses: unique(Some(Attendance::No)),
        total_guests: rows
            .iter()
            .filter(|row| row.attending == Attendance::Yes)
            .count(),
    }
}

pub fn menu_report(rows: &[ResponseRow]) -> MenuReport {
    let attending: Vec<&ResponseRow> = rows
        .iter()
        .filter(|row| row.attending == Attendance::Yes)
        .collect();

    let dietary = attending
        .iter()
        .filter(|row| !row.dietary_requirements.is_empty())
        .map(|row| DietaryNote {
            guest_name: row.guest_name.clone(),
            requirement: row.dietary_requirements.clone(),
        })
        .collect();

    MenuReport {
        starters: tally(&attending, |row| &row.starter_choice),
        mains: tally(&attending, |row| &row.main_choice),
        desserts: tally(&attending, |row| &row.dessert_choice),
        dietary,
    }
}

/// Counts occurrences of each non-empty choice, largest first, ties broken
/// alphabetically so output is stable.
fn tally<'a>(rows: &[&'a ResponseRow], field: impl Fn(&'a ResponseRow) -> &'a str) -> Vec<ChoiceCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        let value = field(row);
        if !value.is_empty() {
            *counts.entry(value).or_insert(0) += 1;
        }
    }

    let mut tallied: Vec<ChoiceCount> = counts
        .into_iter()
        .map(|(choice, count)| ChoiceCount {
            choice: choice.to_string(),
            count,
        })
        .collect();
    tallied.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.choice.cmp(&b.choice)));
    tallied
}

/// Case-insensitive substring match on contact name or guest name. An empty
/// term matches everything.
pub fn search_rows<'a>(rows: &'a [ResponseRow], term: &str) -> Vec<&'a ResponseRow> {
    if term.is_empty() {
        return rows.iter().collect();
    }
    let needle = term.to_lowercase();
    rows.iter()
        .filter(|row| {
            row.contact_name.to_lowercase().contains(&needle)
                || row.guest_name.to_lowercase().contains(&needle)
        })
        .collect()
}

/// The `limit` most recent rows, newest first. Stored timestamps sort
/// lexicographically in chronological order, so a plain string sort works.
pub fn recent_rows(rows: &[ResponseRow], limit: usize) -> Vec<&ResponseRow> {
    let mut ordered: Vec<&ResponseRow> = rows.iter().collect();
    ordered.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    ordered.truncate(limit);
    ordered
}

pub fn attending_only(rows: &[ResponseRow]) -> Vec<ResponseRow> {
    rows.iter()
        .filter(|row| row.attending == Attendance::Yes)
        .cloned()
        .collect()
}

/// Renders rows back to CSV text with the standard column header, for the
/// admin download buttons. The header is written even when there are no
/// rows.
pub fn export_csv(rows: &[ResponseRow]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(RESPONSE_COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(csv::IntoInnerError::into_error)?;
    Ok(String::from_utf8(bytes)?)
}

pub fn export_filename(scope: &str, today: NaiveDate) -> String {
    format!("rsvp_export_{scope}_{}.csv", today.format("%Y%m%d"))
}
