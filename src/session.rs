use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use uuid::Uuid;

use crate::model::{DraftGuest, RsvpDraft};

/// Workflow position of one session's submission attempt.
///
/// `Editing -> InProgress -> Submitted` on success; `InProgress -> Editing`
/// when validation or the write fails; `Submitted -> Editing` via
/// [`FormSessionState::reset`]. No other transitions exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WorkflowState {
    #[default]
    Editing,
    /// Carries the draft frozen at the instant submit was invoked; later
    /// edits to the live form must not affect an in-flight validation.
    InProgress { frozen: RsvpDraft },
    Submitted,
}

/// Mutable form state for one user session. Owned exclusively by that
/// session and discarded with it; never shared across sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSessionState {
    pub draft: RsvpDraft,
    workflow: WorkflowState,
}

impl FormSessionState {
    pub fn workflow(&self) -> &WorkflowState {
        &self.workflow
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self.workflow, WorkflowState::InProgress { .. })
    }

    pub fn is_submitted(&self) -> bool {
        self.workflow == WorkflowState::Submitted
    }

    /// Replaces the live draft with the values captured from the form.
    /// No-op while a submission is in progress.
    pub fn update_draft(&mut self, draft: RsvpDraft) {
        if !self.is_in_progress() {
            self.draft = draft;
        }
    }

    /// Appends one empty guest entry. No-op while a submission is in
    /// progress.
    pub fn add_guest(&mut self) {
        if !self.is_in_progress() {
            self.draft.guests.push(DraftGuest::default());
        }
    }

    /// Removes the guest at `index`. No-op while in progress, when the index
    /// is out of range, or when only one guest remains: the list always
    /// keeps at least one entry.
    pub fn remove_guest(&mut self, index: usize) {
        if self.is_in_progress() {
            return;
        }
        if self.draft.guests.len() > 1 && index < self.draft.guests.len() {
            self.draft.guests.remove(index);
        }
    }

    /// Freezes the current draft and moves to `InProgress`, returning the
    /// snapshot the validator must operate on. Returns `None` (and changes
    /// nothing) unless the session is in `Editing`, which also rejects
    /// resubmits while a submission is underway.
    pub fn begin_submission(&mut self) -> Option<RsvpDraft> {
        if self.workflow != WorkflowState::Editing {
            return None;
        }
        let frozen = self.draft.clone();
        self.workflow = WorkflowState::InProgress {
            frozen: frozen.clone(),
        };
        Some(frozen)
    }

    /// `InProgress -> Submitted` after a successful write.
    pub fn complete_submission(&mut self) {
        if self.is_in_progress() {
            self.workflow = WorkflowState::Submitted;
        }
    }

    /// `InProgress -> Editing` after a failure. Validation failures keep the
    /// draft so the user can correct it; storage failures discard it and the
    /// user re-enters their data.
    pub fn abort_submission(&mut self, discard_draft: bool) {
        if self.is_in_progress() {
            self.workflow = WorkflowState::Editing;
            if discard_draft {
                self.draft = RsvpDraft::default();
            }
        }
    }

    /// Full reset: draft back to one empty guest, workflow back to Editing.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Process-level registry mapping session-id cookies to form state. This is
/// the explicit replacement for ambient per-widget session storage: handlers
/// look their session up, apply one transition, and the next render reads
/// the stored result.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, FormSessionState>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent: creates the default state only when the session is
    /// absent. Already-set fields are never overwritten, so re-renders of
    /// the same session cannot reset a half-filled form.
    pub fn initialize(&self, id: Uuid) {
        self.lock().entry(id).or_default();
    }

    /// Runs `f` against the session's state, creating the default state
    /// first if needed. The registry lock is held for the duration of `f`,
    /// so one interaction is fully processed before the next.
    pub fn with_session<T>(&self, id: Uuid, f: impl FnOnce(&mut FormSessionState) -> T) -> T {
        let mut sessions = self.lock();
        f(sessions.entry(id).or_default())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, FormSessionState>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Attendance;

    #[test]
    fn initialize_twice_preserves_existing_state() {
        let registry = SessionRegistry::new();
        let id = Uuid::new_v4();

        registry.initialize(id);
        registry.with_session(id, |state| {
            state.draft.contact_name = "Ada".to_string();
            state.add_guest();
        });

        registry.initialize(id);
        let (name, guests) =
            registry.with_session(id, |state| (state.draft.contact_name.clone(), state.draft.guests.len()));
        assert_eq!(name, "Ada");
        assert_eq!(guests, 2);
    }

    #[test]
    fn sessions_are_independent() {
        let registry = SessionRegistry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        registry.with_session(a, |state| state.draft.contact_name = "Ada".to_string());
        let other = registry.with_session(b, |state| state.draft.contact_name.clone());
        assert_eq!(other, "");
    }

    #[test]
    fn remove_guest_keeps_at_least_one_entry() {
        let mut state = FormSessionState::default();
        state.remove_guest(0);
        assert_eq!(state.draft.guests.len(), 1);

        state.add_guest();
        state.add_guest();
        state.remove_guest(1);
        assert_eq!(state.draft.guests.len(), 2);

        // Out of range: no-op.
        state.remove_guest(5);
        assert_eq!(state.draft.guests.len(), 2);
    }

    #[test]
    fn guest_list_is_frozen_while_in_progress() {
        let mut state = FormSessionState::default();
        state.add_guest();
        assert!(state.begin_submission().is_some());

        state.add_guest();
        state.remove_guest(0);
        assert_eq!(state.draft.guests.len(), 2);

        let mut edited = state.draft.clone();
        edited.contact_name = "late edit".to_string();
        state.update_draft(edited);
        assert_eq!(state.draft.contact_name, "");
    }

    #[test]
    fn begin_submission_freezes_the_draft_at_that_instant() {
        let mut state = FormSessionState::default();
        state.draft.contact_name = "Ada".to_string();
        state.draft.attending = Attendance::No;

        let frozen = state.begin_submission().expect("editing -> in progress");
        assert_eq!(frozen.contact_name, "Ada");
        assert_eq!(frozen.attending, Attendance::No);
        assert!(state.is_in_progress());

        // A second submit trigger while in progress is rejected.
        assert!(state.begin_submission().is_none());
    }

    #[test]
    fn complete_then_reset_returns_to_a_fresh_editing_state() {
        let mut state = FormSessionState::default();
        state.draft.contact_name = "Ada".to_string();
        state.begin_submission().unwrap();
        state.complete_submission();
        assert!(state.is_submitted());

        // Submitted sessions cannot begin another submission without reset.
        assert!(state.begin_submission().is_none());

        state.reset();
        assert_eq!(state, FormSessionState::default());
    }

    #[test]
    fn abort_preserves_or_discards_the_draft() {
        let mut state = FormSessionState::default();
        state.draft.contact_name = "Ada".to_string();
        state.begin_submission().unwrap();
        state.abort_submission(false);
        assert!(!state.is_in_progress());
        assert_eq!(state.draft.contact_name, "Ada");

        state.begin_submission().unwrap();
        state.abort_submission(true);
        assert_eq!(state.draft, RsvpDraft::default());
    }
}
