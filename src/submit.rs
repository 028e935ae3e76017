use chrono::NaiveDateTime;

use crate::config::MenuConfig;
use crate::deadline::{format_time_remaining, DeadlineConfig};
use crate::model::{Attendance, ResponseRow, RsvpDraft};
use crate::store::{RsvpStore, StoreError};

/// Timestamp format shared by every row of one submission. Lexicographic
/// order on the stored string matches chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Deadline-related banner attached to an accepted submission. Shown to the
/// user, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeadlineNotice {
    /// Accepted inside the grace period after the cutoff.
    Late,
    /// Accepted inside the warning window before the cutoff; carries the
    /// formatted time remaining.
    ClosingSoon { remaining: String },
}

#[derive(Debug)]
pub enum SubmissionOutcome {
    Accepted {
        rows_written: usize,
        notice: Option<DeadlineNotice>,
    },
    /// Past cutoff with no grace left. Terminal for this attempt, nothing
    /// is written.
    DeadlineClosed,
    /// Every violation found, not just the first.
    Invalid(Vec<String>),
    /// The append failed; the user retries from a blank draft.
    StoreFailed(StoreError),
}

/// Runs the full submission sequence against a frozen draft: deadline gate,
/// field validation, row expansion, single batched append.
pub fn process_submission(
    draft: &RsvpDraft,
    menu: &MenuConfig,
    deadline: Option<&DeadlineConfig>,
    now: NaiveDateTime,
    store: &RsvpStore,
) -> SubmissionOutcome {
    let mut notice = None;
    if let Some(policy) = deadline {
        if policy.is_past_deadline(now) {
            if policy.is_within_grace_period(now) {
                notice = Some(DeadlineNotice::Late);
            } else {
                return SubmissionOutcome::DeadlineClosed;
            }
        } else if policy.is_within_warning_period(now) {
            notice = Some(DeadlineNotice::ClosingSoon {
                remaining: format_time_remaining(policy.time_until_deadline(now)),
            });
        }
    }

    let errors = validate_draft(draft, menu);
    if !errors.is_empty() {
        return SubmissionOutcome::Invalid(errors);
    }

    let submitted_at = now.format(TIMESTAMP_FORMAT).to_string();
    let rows = expand_rows(draft, &submitted_at);
    match store.append_rows(&rows) {
        Ok(()) => SubmissionOutcome::Accepted {
            rows_written: rows.len(),
            notice,
        },
        Err(err) => SubmissionOutcome::StoreFailed(err),
    }
}

/// Collects every violation in the draft. Text fields are trimmed before
/// the blank check; menu choices must match a configured option exactly.
/// Guest fields are only checked when the party is attending.
pub fn validate_draft(draft: &RsvpDraft, menu: &MenuConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if draft.contact_name.trim().is_empty() {
        errors.push("Primary contact name is required".to_string());
    }

    if draft.attending == Attendance::Yes {
        for (index, guest) in draft.guests.iter().enumerate() {
            let number = index + 1;
            if guest.name.trim().is_empty() {
                errors.push(format!("Guest {number} name is required"));
            }
            check_choice(&mut errors, number, "starter choice", &guest.starter, &menu.starters);
            check_choice(&mut errors, number, "main course choice", &guest.main, &menu.mains);
            check_choice(&mut errors, number, "dessert choice", &guest.dessert, &menu.desserts);
        }
    }

    errors
}

fn check_choice(
    errors: &mut Vec<String>,
    guest: usize,
    label: &str,
    value: &str,
    options: &[String],
) {
    let value = value.trim();
    if value.is_empty() {
        errors.push(format!("Guest {guest} {label} is required"));
    } else if !options.iter().any(|option| option == value) {
        errors.push(format!("Guest {guest} {label} is not on the menu"));
    }
}

/// Expands a valid draft into storage rows: one row per guest when
/// attending, all sharing `submitted_at` and the contact fields; a single
/// row with empty guest and menu fields for regrets.
pub fn expand_rows(draft: &RsvpDraft, submitted_at: &str) -> Vec<ResponseRow> {
    let base = ResponseRow {
        submitted_at: submitted_at.to_string(),
        contact_name: draft.contact_name.trim().to_string(),
        contact_email: draft.contact_email.trim().to_string(),
        contact_phone: draft.contact_phone.trim().to_string(),
        attending: draft.attending,
        guest_name: String::new(),
        starter_choice: String::new(),
        main_choice: String::new(),
        dessert_choice: String::new(),
        dietary_requirements: String::new(),
        comments: draft.comments.trim().to_string(),
    };

    match draft.attending {
        Attendance::No => vec![base],
        Attendance::Yes => draft
            .guests
            .iter()
            .map(|guest| ResponseRow {
                guest_name: guest.name.trim().to_string(),
                starter_choice: guest.starter.trim().to_string(),
                main_choice: guest.main.trim().to_string(),
                dessert_choice: guest.dessert.trim().to_string(),
                dietary_requirements: guest.dietary.trim().to_string(),
                ..base.clone()
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use tempfile::TempDir;

    use super::*;
    use crate::model::DraftGuest;

    fn menu() -> MenuConfig {
        MenuConfig {
            starters: vec!["Soup".to_string(), "Salad".to_string()],
            mains: vec!["Beef".to_string(), "Salmon".to_string()],
            desserts: vec!["Cake".to_string(), "Sorbet".to_string()],
        }
    }

    fn guest(name: &str, starter: &str, main: &str, dessert: &str) -> DraftGuest {
        DraftGuest {
            name: name.to_string(),
            starter: starter.to_string(),
            main: main.to_string(),
            dessert: dessert.to_string(),
            dietary: String::new(),
        }
    }

    fn attending_draft(guests: Vec<DraftGuest>) -> RsvpDraft {
        RsvpDraft {
            attending: Attendance::Yes,
            contact_name: "Jo Bloggs".to_string(),
            contact_email: "jo@example.com".to_string(),
            contact_phone: "0123 456789".to_string(),
            guests,
            comments: "See you there".to_string(),
        }
    }

    fn temp_store(dir: &TempDir) -> RsvpStore {
        RsvpStore::new(dir.path().join("responses.csv"))
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    fn error_set(errors: &[String]) -> HashSet<&str> {
        errors.iter().map(String::as_str).collect()
    }

    fn new_year_policy() -> DeadlineConfig {
        DeadlineConfig {
            cutoff: at(2024, 1, 1, 0, 0),
            grace: Duration::hours(24),
            warning: Duration::hours(48),
        }
    }

    #[test]
    fn attending_party_produces_one_row_per_guest() {
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir);
        let draft = attending_draft(vec![
            guest("Jo Bloggs", "Soup", "Beef", "Cake"),
            guest("Sam Bloggs", "Salad", "Salmon", "Sorbet"),
            guest("Kit Bloggs", "Soup", "Salmon", "Cake"),
        ]);

        let outcome = process_submission(&draft, &menu(), None, at(2024, 6, 1, 10, 0), &store);
        match outcome {
            SubmissionOutcome::Accepted { rows_written, notice } => {
                assert_eq!(rows_written, 3);
                assert_eq!(notice, None);
            }
            other => panic!("expected acceptance, got {other:?}"),
        }

        let rows = store.load_all();
        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert_eq!(row.submitted_at, rows[0].submitted_at);
            assert_eq!(row.contact_name, "Jo Bloggs");
            assert_eq!(row.contact_email, "jo@example.com");
            assert_eq!(row.contact_phone, "0123 456789");
            assert_eq!(row.attending, Attendance::Yes);
        }
        assert_eq!(rows[1].guest_name, "Sam Bloggs");
        assert_eq!(rows[1].main_choice, "Salmon");
    }

    #[test]
    fn regrets_produce_a_single_row_with_empty_guest_fields() {
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir);
        let draft = RsvpDraft {
            attending: Attendance::No,
            guests: vec![guest("ignored", "", "", "")],
            comments: "Sorry to miss it".to_string(),
            ..attending_draft(Vec::new())
        };

        let outcome = process_submission(&draft, &menu(), None, at(2024, 6, 1, 10, 0), &store);
        assert!(matches!(
            outcome,
            SubmissionOutcome::Accepted { rows_written: 1, .. }
        ));

        let rows = store.load_all();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].attending, Attendance::No);
        assert_eq!(rows[0].guest_name, "");
        assert_eq!(rows[0].starter_choice, "");
        assert_eq!(rows[0].main_choice, "");
        assert_eq!(rows[0].dessert_choice, "");
        assert_eq!(rows[0].dietary_requirements, "");
        assert_eq!(rows[0].comments, "Sorry to miss it");
    }

    #[test]
    fn closed_deadline_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir);
        let policy = new_year_policy();
        let draft = attending_draft(vec![guest("Jo Bloggs", "Soup", "Beef", "Cake")]);

        // 2024-01-03 is past both cutoff and grace.
        let outcome =
            process_submission(&draft, &menu(), Some(&policy), at(2024, 1, 3, 0, 0), &store);
        assert!(matches!(outcome, SubmissionOutcome::DeadlineClosed));
        assert!(store.load_all().is_empty());
    }

    #[test]
    fn grace_period_accepts_and_flags_late() {
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir);
        let policy = new_year_policy();
        let draft = attending_draft(vec![guest("Jo Bloggs", "Soup", "Beef", "Cake")]);

        let outcome =
            process_submission(&draft, &menu(), Some(&policy), at(2024, 1, 1, 12, 0), &store);
        match outcome {
            SubmissionOutcome::Accepted { rows_written, notice } => {
                assert_eq!(rows_written, 1);
                assert_eq!(notice, Some(DeadlineNotice::Late));
            }
            other => panic!("expected late acceptance, got {other:?}"),
        }
        assert_eq!(store.load_all().len(), 1);
    }

    #[test]
    fn warning_window_attaches_the_remaining_time() {
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir);
        let policy = new_year_policy();
        let draft = attending_draft(vec![guest("Jo Bloggs", "Soup", "Beef", "Cake")]);

        let outcome =
            process_submission(&draft, &menu(), Some(&policy), at(2023, 12, 30, 21, 0), &store);
        match outcome {
            SubmissionOutcome::Accepted { notice, .. } => {
                assert_eq!(
                    notice,
                    Some(DeadlineNotice::ClosingSoon {
                        remaining: "1 day, 3 hours".to_string()
                    })
                );
            }
            other => panic!("expected acceptance with countdown, got {other:?}"),
        }
    }

    #[test]
    fn all_violations_are_reported_together() {
        let draft = RsvpDraft {
            contact_name: "   ".to_string(),
            guests: vec![
                guest("Jo Bloggs", "Soup", "Beef", "Cake"),
                guest("Sam Bloggs", "Salad", "", "Sorbet"),
            ],
            ..attending_draft(Vec::new())
        };

        let errors = validate_draft(&draft, &menu());
        assert_eq!(
            error_set(&errors),
            HashSet::from([
                "Primary contact name is required",
                "Guest 2 main course choice is required",
            ])
        );
    }

    #[test]
    fn blank_guest_name_is_the_only_error_for_an_otherwise_valid_draft() {
        let draft = attending_draft(vec![guest("", "Soup", "Beef", "Cake")]);
        let errors = validate_draft(&draft, &menu());
        assert_eq!(errors, vec!["Guest 1 name is required".to_string()]);
    }

    #[test]
    fn unknown_menu_choice_is_rejected() {
        let draft = attending_draft(vec![guest("Jo Bloggs", "Snails", "Beef", "Cake")]);
        let errors = validate_draft(&draft, &menu());
        assert_eq!(
            errors,
            vec!["Guest 1 starter choice is not on the menu".to_string()]
        );
    }

    #[test]
    fn regrets_skip_guest_validation() {
        let draft = RsvpDraft {
            attending: Attendance::No,
            guests: vec![guest("", "", "", "")],
            ..attending_draft(Vec::new())
        };
        assert!(validate_draft(&draft, &menu()).is_empty());
    }

    #[test]
    fn no_deadline_config_means_the_form_always_accepts() {
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir);
        let draft = attending_draft(vec![guest("Jo Bloggs", "Soup", "Beef", "Cake")]);

        // A date far past any plausible cutoff.
        let outcome = process_submission(&draft, &menu(), None, at(2030, 1, 1, 0, 0), &store);
        assert!(matches!(outcome, SubmissionOutcome::Accepted { .. }));
    }

    #[test]
    fn expanded_rows_trim_surrounding_whitespace() {
        let mut draft = attending_draft(vec![guest("  Jo Bloggs ", "Soup", "Beef", "Cake")]);
        draft.contact_name = " Jo Bloggs ".to_string();
        draft.guests[0].dietary = " nut allergy ".to_string();

        let rows = expand_rows(&draft, "2024-06-01 10:00:00");
        assert_eq!(rows[0].contact_name, "Jo Bloggs");
        assert_eq!(rows[0].guest_name, "Jo Bloggs");
        assert_eq!(rows[0].dietary_requirements, "nut allergy");
    }
}
