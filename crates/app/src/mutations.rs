//! The mutation layer.
//!
//! Every mutation is a single store request. On success the relevant form
//! state is reset and a success notice is emitted; on failure a generic
//! failure notice is emitted and the error is returned. Nothing is retried.
//! Invalid form input is rejected locally and never reaches the store.

use std::path::Path;
use std::sync::Arc;

use folio_core::assets;
use folio_core::models::feedback::VISIBLE_FIELD;
use folio_core::models::inquiry::COMPLETED_FIELD;
use folio_core::models::{
    Dated, Feedback, HireSubmission, Inquiry, NewClientWork, NewFeedback, NewInquiry, NewPost,
    NewReview, NewService, NewSkill, PendingFeedback, Service,
};
use folio_core::paths::{self, StorePath};
use folio_store::DocumentStore;
use serde::Serialize;
use serde_json::{Map, Value};
use validator::Validate;

use crate::error::MutationError;
use crate::forms::{Confirm, Form, InlineEdit, InlineField, ProfileDraft, DELETE_PROMPT};
use crate::notice::{Notifier, FAILURE_MESSAGE};

/// Whether a successful submission enters the confirmation state.
#[derive(Clone, Copy)]
enum Audience {
    Public,
    Admin,
}

/// Writes to the document store on behalf of forms and console actions.
#[derive(Clone)]
pub struct Mutations {
    store: Arc<dyn DocumentStore>,
    notices: Notifier,
}

impl Mutations {
    pub fn new(store: Arc<dyn DocumentStore>, notices: Notifier) -> Self {
        Self { store, notices }
    }

    // ---- admin creates ----

    pub async fn create_skill(&self, form: &mut Form<NewSkill>) -> Result<String, MutationError> {
        let path = paths::top_level(paths::SKILLS);
        self.create(&path, form, Clone::clone, Audience::Admin, "Skill added.")
            .await
    }

    pub async fn create_post(&self, form: &mut Form<NewPost>) -> Result<String, MutationError> {
        let path = paths::top_level(paths::POSTS);
        self.create(
            &path,
            form,
            |fields| Dated::now(fields.clone()),
            Audience::Admin,
            "Post published.",
        )
        .await
    }

    pub async fn create_service(
        &self,
        form: &mut Form<NewService>,
    ) -> Result<String, MutationError> {
        let path = paths::top_level(paths::SERVICES);
        self.create(&path, form, Clone::clone, Audience::Admin, "Service added.")
            .await
    }

    pub async fn create_work(
        &self,
        form: &mut Form<NewClientWork>,
    ) -> Result<String, MutationError> {
        let path = paths::top_level(paths::WORKS);
        self.create(&path, form, Clone::clone, Audience::Admin, "Client work added.")
            .await
    }

    /// Add a review under `services/{service_id}/reviews`.
    pub async fn add_review(
        &self,
        service_id: &str,
        form: &mut Form<NewReview>,
    ) -> Result<String, MutationError> {
        let path = paths::service_reviews(service_id)?;
        self.create(
            &path,
            form,
            |fields| Dated::now(fields.clone()),
            Audience::Admin,
            "Review added to service.",
        )
        .await
    }

    // ---- public submissions ----

    /// Submit a testimonial. It is stored hidden until approved.
    pub async fn submit_feedback(
        &self,
        form: &mut Form<NewFeedback>,
    ) -> Result<String, MutationError> {
        let path = paths::top_level(paths::FEEDBACK);
        self.create(
            &path,
            form,
            |fields| Dated::now(PendingFeedback::from(fields.clone())),
            Audience::Public,
            "Thank you! Your feedback will appear once reviewed.",
        )
        .await
    }

    pub async fn submit_contact(
        &self,
        form: &mut Form<NewInquiry>,
    ) -> Result<String, MutationError> {
        let path = paths::top_level(paths::CONTACTS);
        self.create(
            &path,
            form,
            |fields| Dated::now(fields.clone()),
            Audience::Public,
            "Message sent.",
        )
        .await
    }

    /// Submit a hire request for `service`, copying its id and title.
    pub async fn submit_hire_request(
        &self,
        service: &Service,
        form: &mut Form<NewInquiry>,
    ) -> Result<String, MutationError> {
        let path = paths::top_level(paths::HIRE_REQUESTS);
        self.create(
            &path,
            form,
            |fields| {
                Dated::now(HireSubmission {
                    service_id: service.id.clone(),
                    service_title: service.title.clone(),
                    inquiry: fields.clone(),
                })
            },
            Audience::Public,
            "Hire request sent. I will get back to you soon.",
        )
        .await
    }

    // ---- updates ----

    /// Update exactly one field of the entity at `path`.
    pub async fn update_field(
        &self,
        path: &StorePath,
        field: &str,
        value: Value,
    ) -> Result<(), MutationError> {
        let mut fields = Map::new();
        fields.insert(field.to_string(), value);

        match self.store.update(path, fields).await {
            Ok(()) => {
                tracing::debug!(path = %path, field, "Field updated");
                self.notices.success(format!("{field} updated."));
                Ok(())
            }
            Err(e) => Err(self.failed(path, e.into())),
        }
    }

    /// Commit an inline field on blur.
    ///
    /// Unchanged values make no request. A failed write restores the
    /// load-time value; the failure notice has already been emitted.
    pub async fn commit_inline(&self, field: &mut InlineField) -> InlineEdit {
        if !field.is_changed() {
            return InlineEdit::Unchanged;
        }

        let path = field.path().clone();
        let name = field.field().to_string();
        match self.update_field(&path, &name, field.value().clone()).await {
            Ok(()) => {
                field.accept();
                InlineEdit::Saved
            }
            Err(_) => InlineEdit::RolledBack {
                restored: field.roll_back(),
            },
        }
    }

    /// Flip a testimonial's public visibility. Returns the new value.
    pub async fn toggle_feedback_visibility(
        &self,
        feedback: &Feedback,
    ) -> Result<bool, MutationError> {
        let path = paths::entity(paths::FEEDBACK, &feedback.id)?;
        let visible = !feedback.is_visible;
        self.toggle(&path, VISIBLE_FIELD, visible).await?;
        self.notices.success(if visible {
            "Feedback is now visible."
        } else {
            "Feedback is now hidden."
        });
        Ok(visible)
    }

    /// Flip an inquiry's completion flag. Returns the new value.
    pub async fn toggle_inquiry_completion(
        &self,
        inquiry: &Inquiry,
    ) -> Result<bool, MutationError> {
        let path = inquiry.path()?;
        let completed = !inquiry.is_completed();
        self.toggle(&path, COMPLETED_FIELD, completed).await?;
        self.notices.success(if completed {
            "Marked as completed."
        } else {
            "Marked as open."
        });
        Ok(completed)
    }

    /// Overwrite the profile with the whole draft.
    pub async fn save_profile(&self, draft: &mut ProfileDraft) -> Result<(), MutationError> {
        let path = paths::top_level(paths::PROFILE);
        let value = serde_json::to_value(draft.profile())?;

        match self.store.set(&path, value).await {
            Ok(()) => {
                draft.mark_saved();
                self.notices.success("Profile saved.");
                Ok(())
            }
            Err(e) => Err(self.failed(&path, e.into())),
        }
    }

    // ---- deletes ----

    /// Remove the entity at `path` once the user confirms.
    ///
    /// Returns `false` without making a request when confirmation is
    /// declined. Removing a path that does not exist succeeds.
    pub async fn delete(
        &self,
        path: &StorePath,
        confirm: &dyn Confirm,
    ) -> Result<bool, MutationError> {
        if !confirm.confirm(DELETE_PROMPT) {
            return Ok(false);
        }

        match self.store.remove(path).await {
            Ok(()) => {
                tracing::info!(path = %path, "Item deleted");
                self.notices.success("Item deleted.");
                Ok(true)
            }
            Err(e) => Err(self.failed(path, e.into())),
        }
    }

    // ---- assets ----

    /// Encode a local image as a data URL, ready for an `image` or
    /// `profilePic` field of a create form or draft.
    pub async fn attach_image(&self, file: impl AsRef<Path>) -> Result<String, MutationError> {
        match assets::encode_image_file(file.as_ref()).await {
            Ok(url) => Ok(url),
            Err(e) => {
                tracing::warn!(file = %file.as_ref().display(), error = %e, "Image rejected");
                self.notices.failure("That file could not be used as an image.");
                Err(e.into())
            }
        }
    }

    /// Encode a local image and write it straight to `field` of the entity
    /// at `path`.
    pub async fn attach_image_to(
        &self,
        path: &StorePath,
        field: &str,
        file: impl AsRef<Path>,
    ) -> Result<(), MutationError> {
        let url = self.attach_image(file).await?;
        self.update_field(path, field, Value::String(url)).await
    }

    // ---- private helpers ----

    async fn create<T, P>(
        &self,
        path: &StorePath,
        form: &mut Form<T>,
        build: impl FnOnce(&T) -> P,
        audience: Audience,
        success: &str,
    ) -> Result<String, MutationError>
    where
        T: Validate + Default,
        P: Serialize,
    {
        form.fields.validate()?;
        let _in_flight = form.control().try_begin().ok_or(MutationError::InFlight)?;
        let payload = serde_json::to_value(build(&form.fields))?;

        match self.store.push(path, payload).await {
            Ok(key) => {
                tracing::debug!(path = %path, %key, "Entity created");
                form.finish(matches!(audience, Audience::Public));
                self.notices.success(success);
                Ok(key)
            }
            Err(e) => Err(self.failed(path, e.into())),
        }
    }

    async fn toggle(&self, path: &StorePath, field: &str, value: bool) -> Result<(), MutationError> {
        let mut fields = Map::new();
        fields.insert(field.to_string(), Value::Bool(value));
        self.store
            .update(path, fields)
            .await
            .map_err(|e| self.failed(path, e.into()))
    }

    fn failed(&self, path: &StorePath, error: MutationError) -> MutationError {
        tracing::error!(path = %path, error = %error, "Mutation failed");
        self.notices.failure(FAILURE_MESSAGE);
        error
    }
}
