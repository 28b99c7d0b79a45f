//! The portfolio application core.
//!
//! Wires the document store, identity provider, synchronization layer and
//! visitor tracker together behind [`App`], and exposes the mutation layer
//! the public pages and the admin console write through.

pub mod app;
pub mod config;
pub mod error;
pub mod forms;
pub mod mutations;
pub mod notice;

pub use app::App;
pub use config::AppConfig;
pub use error::{MutationError, StartupError};
pub use forms::{Confirm, Form, InlineEdit, InlineField, ProfileDraft, SubmitControl};
pub use mutations::Mutations;
pub use notice::{Notice, NoticeLevel, Notifier};
