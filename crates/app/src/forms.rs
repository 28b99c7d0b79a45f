//! Local form state driven by the mutation layer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use folio_core::models::Profile;
use folio_core::paths::StorePath;
use serde_json::Value;

/// Prompt shown before any delete.
pub const DELETE_PROMPT: &str = "Delete this item permanently? This cannot be undone.";

/* --------------------------------------------------------------------------
Submit control
-------------------------------------------------------------------------- */

/// A submit button's enabled state, shared with the request it starts.
#[derive(Debug, Clone, Default)]
pub struct SubmitControl {
    busy: Arc<AtomicBool>,
}

impl SubmitControl {
    pub fn is_enabled(&self) -> bool {
        !self.busy.load(Ordering::SeqCst)
    }

    /// Disable the control for the life of the returned guard. Returns
    /// `None` when a request is already in flight.
    pub fn try_begin(&self) -> Option<InFlight> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| InFlight {
                busy: Arc::clone(&self.busy),
            })
    }
}

/// Re-enables its [`SubmitControl`] when dropped, whatever the outcome.
#[derive(Debug)]
pub struct InFlight {
    busy: Arc<AtomicBool>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

/* --------------------------------------------------------------------------
Forms
-------------------------------------------------------------------------- */

/// Fields of a create form plus its submit control.
///
/// Public forms enter a confirmation state after a successful submission;
/// admin forms are simply cleared.
#[derive(Debug, Default)]
pub struct Form<T> {
    pub fields: T,
    submitted: bool,
    control: SubmitControl,
}

impl<T: Default> Form<T> {
    pub fn new(fields: T) -> Self {
        Self {
            fields,
            submitted: false,
            control: SubmitControl::default(),
        }
    }

    /// True after a successful public submission, until [`reopen`](Self::reopen).
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn control(&self) -> &SubmitControl {
        &self.control
    }

    /// Leave the confirmation state to submit again.
    pub fn reopen(&mut self) {
        self.submitted = false;
    }

    pub(crate) fn finish(&mut self, confirm: bool) {
        self.fields = T::default();
        self.submitted = confirm;
    }
}

/// Working copy of the profile, saved wholesale.
#[derive(Debug, Clone, Default)]
pub struct ProfileDraft {
    draft: Profile,
    dirty: bool,
}

impl ProfileDraft {
    /// Start a draft from the published profile, or an empty one.
    pub fn from_profile(profile: Option<&Profile>) -> Self {
        Self {
            draft: profile.cloned().unwrap_or_default(),
            dirty: false,
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.draft
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Apply an edit to the draft. Nothing is written until saved.
    pub fn edit(&mut self, apply: impl FnOnce(&mut Profile)) {
        apply(&mut self.draft);
        self.dirty = true;
    }

    /// Replace the headlines from the comma-separated editor value.
    pub fn set_headlines(&mut self, csv: &str) {
        self.edit(|p| p.set_headlines_csv(csv));
    }

    /// Discard local edits in favour of a newly published profile.
    pub fn rebase(&mut self, profile: &Profile) {
        self.draft = profile.clone();
        self.dirty = false;
    }

    pub(crate) fn mark_saved(&mut self) {
        self.dirty = false;
    }
}

/* --------------------------------------------------------------------------
Inline editing
-------------------------------------------------------------------------- */

/// An editable field bound to an existing entity.
///
/// Holds the value the field had when it was rendered; a blur only writes
/// when the current value differs from it.
#[derive(Debug, Clone)]
pub struct InlineField {
    path: StorePath,
    field: String,
    initial: Value,
    current: Value,
}

/// Outcome of committing an inline field on blur.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineEdit {
    /// The value matched its load-time default; no request was made.
    Unchanged,
    Saved,
    /// The write failed and the field was restored to `restored`.
    RolledBack { restored: Value },
}

impl InlineField {
    pub fn new(path: StorePath, field: impl Into<String>, initial: Value) -> Self {
        Self {
            path,
            field: field.into(),
            current: initial.clone(),
            initial,
        }
    }

    pub fn path(&self) -> &StorePath {
        &self.path
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> &Value {
        &self.current
    }

    /// Record a keystroke-level change.
    pub fn set(&mut self, value: impl Into<Value>) {
        self.current = value.into();
    }

    pub fn is_changed(&self) -> bool {
        self.current != self.initial
    }

    pub(crate) fn accept(&mut self) {
        self.initial = self.current.clone();
    }

    pub(crate) fn roll_back(&mut self) -> Value {
        self.current = self.initial.clone();
        self.current.clone()
    }
}

/* --------------------------------------------------------------------------
Confirmation
-------------------------------------------------------------------------- */

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}
