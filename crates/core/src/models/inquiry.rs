//! Hire requests, contact messages and the merged admin inbox.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::lenient;
use crate::paths::{self, StorePath};
use crate::types::{parse_iso, Timestamp};

/// Display title of contact messages in the inbox.
pub const GENERAL_INQUIRY: &str = "General Inquiry";

/// Field flipped by the completion toggle.
pub const COMPLETED_FIELD: &str = "isCompleted";

/// Created by the public hire form on a service page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HireRequest {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub service_id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub service_title: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub message: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_completed: bool,
}

/// Created by the public contact form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub message: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_completed: bool,
}

/// Fields shared by the hire and contact forms.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewInquiry {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

/// Hire request payload: the inquiry plus the service it references.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HireSubmission {
    pub service_id: String,
    pub service_title: String,
    #[serde(flatten)]
    pub inquiry: NewInquiry,
}

/* --------------------------------------------------------------------------
Inbox
-------------------------------------------------------------------------- */

/// Discriminant of an [`Inquiry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InquiryKind {
    Hire,
    Contact,
}

impl InquiryKind {
    /// Collection the inquiry lives in.
    pub fn collection(self) -> &'static str {
        match self {
            InquiryKind::Hire => paths::HIRE_REQUESTS,
            InquiryKind::Contact => paths::CONTACTS,
        }
    }
}

/// An inbox entry: either a hire request or a contact message.
#[derive(Debug, Clone, PartialEq)]
pub enum Inquiry {
    Hire(HireRequest),
    Contact(ContactMessage),
}

impl Inquiry {
    pub fn kind(&self) -> InquiryKind {
        match self {
            Inquiry::Hire(_) => InquiryKind::Hire,
            Inquiry::Contact(_) => InquiryKind::Contact,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Inquiry::Hire(h) => &h.id,
            Inquiry::Contact(c) => &c.id,
        }
    }

    /// Service title for hire requests, `General Inquiry` for contacts.
    pub fn title(&self) -> &str {
        match self {
            Inquiry::Hire(h) => &h.service_title,
            Inquiry::Contact(_) => GENERAL_INQUIRY,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Inquiry::Hire(h) => &h.name,
            Inquiry::Contact(c) => &c.name,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Inquiry::Hire(h) => &h.email,
            Inquiry::Contact(c) => &c.email,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Inquiry::Hire(h) => &h.message,
            Inquiry::Contact(c) => &c.message,
        }
    }

    pub fn date(&self) -> &str {
        match self {
            Inquiry::Hire(h) => &h.date,
            Inquiry::Contact(c) => &c.date,
        }
    }

    pub fn received_at(&self) -> Option<Timestamp> {
        parse_iso(self.date())
    }

    pub fn is_completed(&self) -> bool {
        match self {
            Inquiry::Hire(h) => h.is_completed,
            Inquiry::Contact(c) => c.is_completed,
        }
    }

    /// Store path of the underlying record.
    pub fn path(&self) -> Result<StorePath, CoreError> {
        paths::entity(self.kind().collection(), self.id())
    }
}

/// Merge hire requests and contact messages, newest first. Entries with an
/// unparseable date sort last.
pub fn inbox(hire_requests: &[HireRequest], contacts: &[ContactMessage]) -> Vec<Inquiry> {
    let mut merged: Vec<Inquiry> = hire_requests
        .iter()
        .cloned()
        .map(Inquiry::Hire)
        .chain(contacts.iter().cloned().map(Inquiry::Contact))
        .collect();

    merged.sort_by(|a, b| match (a.received_at(), b.received_at()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    merged
}

/// Number of inbox entries marked completed.
pub fn completed_count(inbox: &[Inquiry]) -> usize {
    inbox.iter().filter(|i| i.is_completed()).count()
}
