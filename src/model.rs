use serde::{Deserialize, Serialize};

/// Whether the respondent is attending. Stored as "Yes"/"No" in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attendance {
    Yes,
    No,
}

impl Attendance {
    pub fn as_str(self) -> &'static str {
        match self {
            Attendance::Yes => "Yes",
            Attendance::No => "No",
        }
    }

    /// Parses the form value ("yes"/"no"). Anything unrecognized reads as
    /// attending, matching the form's default selection.
    pub fn from_form_value(value: &str) -> Self {
        if value.eq_ignore_ascii_case("no") {
            Attendance::No
        } else {
            Attendance::Yes
        }
    }
}

/// One persisted record: a single guest of an attending party, or the single
/// row of a not-attending reply. Field names double as the CSV column header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRow {
    #[serde(rename = "timestamp")]
    pub submitted_at: String,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub attending: Attendance,
    pub guest_name: String,
    pub starter_choice: String,
    pub main_choice: String,
    pub dessert_choice: String,
    pub dietary_requirements: String,
    pub comments: String,
}

/// One guest being entered on the form. Never persisted directly; projected
/// into `ResponseRow`s at submit time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftGuest {
    pub name: String,
    pub starter: String,
    pub main: String,
    pub dessert: String,
    pub dietary: String,
}

/// The in-progress form contents for one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsvpDraft {
    pub attending: Attendance,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub guests: Vec<DraftGuest>,
    pub comments: String,
}

impl Default for RsvpDraft {
    fn default() -> Self {
        Self {
            attending: Attendance::Yes,
            contact_name: String::new(),
            contact_email: String::new(),
            contact_phone: String::new(),
            // The guest list always starts with one empty entry.
            guests: vec![DraftGuest::default()],
            comments: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attendance_round_trips_through_storage_strings() {
        assert_eq!(Attendance::Yes.as_str(), "Yes");
        assert_eq!(Attendance::No.as_str(), "No");
        assert_eq!(Attendance::from_form_value("no"), Attendance::No);
        assert_eq!(Attendance::from_form_value("yes"), Attendance::Yes);
        assert_eq!(Attendance::from_form_value(""), Attendance::Yes);
    }

    #[test]
    fn default_draft_has_one_empty_guest() {
        let draft = RsvpDraft::default();
        assert_eq!(draft.guests.len(), 1);
        assert_eq!(draft.guests[0], DraftGuest::default());
        assert_eq!(draft.attending, Attendance::Yes);
    }
}
