//! Domain DTOs for the Plunk API.
//!
//! # Design
//! Request types serialize straight to the wire. Response types here are the
//! *normalized* shapes handed to callers: timestamps are `DateTime<Utc>` and
//! contact `data` is a parsed mapping. The raw wire shapes live in the
//! private `wire` module and are converted by `normalize`.
//!
//! Contact-bearing types are generic over the `data` payload so callers can
//! pick a typed struct; the default is an untyped JSON object.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attachment::AttachmentFile;

/// Untyped contact metadata.
pub type ContactData = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CampaignStyle {
    Plunk,
    Html,
}

/// Server-controlled campaign lifecycle. Observed, never driven, by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CampaignStatus {
    Draft,
    Sending,
    Delivered,
}

/// Delivery outcome of an email sent to a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EmailStatus {
    Opened,
    Bounced,
    Complaint,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Identifies a contact either by id or by email address.
///
/// Serializes as `{"id": ...}` or `{"email": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactRef {
    Id(String),
    Email(String),
}

impl ContactRef {
    pub fn id(id: impl Into<String>) -> Self {
        ContactRef::Id(id.into())
    }

    pub fn email(email: impl Into<String>) -> Self {
        ContactRef::Email(email.into())
    }
}

/// Payload for `POST /v1/track`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackEvent<D = ContactData> {
    pub event: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<D>,
}

impl<D> TrackEvent<D> {
    pub fn new(event: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            email: email.into(),
            subscribed: None,
            data: None,
        }
    }

    pub fn subscribed(mut self, subscribed: bool) -> Self {
        self.subscribed = Some(subscribed);
        self
    }

    pub fn data(mut self, data: D) -> Self {
        self.data = Some(data);
        self
    }
}

/// Payload for `POST /v1/send`.
///
/// Attachments are kept as raw bytes here and base64-encoded when the
/// request is built.
#[derive(Debug, Clone, Default)]
pub struct SendEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub subscribed: Option<bool>,
    pub name: Option<String>,
    pub from: Option<String>,
    pub reply: Option<String>,
    pub headers: Option<BTreeMap<String, String>>,
    pub attachments: Vec<AttachmentFile>,
}

impl SendEmail {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn subscribed(mut self, subscribed: bool) -> Self {
        self.subscribed = Some(subscribed);
        self
    }

    /// Sender display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = Some(reply.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn attachment(mut self, file: AttachmentFile) -> Self {
        self.attachments.push(file);
        self
    }
}

/// Optional knobs for `send_campaign`. Unset fields go out as
/// `live: false` and `delay: 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendCampaignOptions {
    pub live: Option<bool>,
    /// Minutes to wait before sending.
    pub delay: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCampaign {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
    pub style: CampaignStyle,
}

/// Fields replaced by `update_campaign`. The id travels separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCampaign {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<CampaignStyle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContact<D = ContactData> {
    pub email: String,
    pub subscribed: bool,
    pub data: D,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateContact<D = ContactData> {
    #[serde(flatten)]
    pub contact: ContactRef,
    pub subscribed: bool,
    pub data: D,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackEventResponse {
    pub success: bool,
    /// Id of the contact the event was recorded against.
    pub contact: String,
    /// Id of the event.
    pub event: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSummary {
    pub id: String,
    pub email: String,
}

/// One recipient of a sent email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRecipient {
    pub email: String,
    pub contact: ContactSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendEmailResponse {
    pub success: bool,
    pub emails: Vec<EmailRecipient>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub recipients: Vec<String>,
    pub style: CampaignStyle,
    pub status: CampaignStatus,
    pub delivered: Option<DateTime<Utc>>,
    pub project_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact<D = ContactData> {
    pub id: String,
    pub email: String,
    pub subscribed: bool,
    pub data: D,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of create, update and delete contact calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactResponse<D = ContactData> {
    pub success: bool,
    #[serde(flatten)]
    pub contact: Contact<D>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactCount {
    pub count: u64,
}

/// Result of subscribe and unsubscribe calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    pub success: bool,
    pub contact: String,
    pub subscribed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    pub template_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    pub id: String,
    pub contact_id: String,
    pub event_id: String,
    pub action_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub event: Event,
    pub action: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactEmail {
    pub id: String,
    pub message_id: String,
    pub subject: String,
    pub status: EmailStatus,
    pub project_id: String,
    pub action_id: Option<String>,
    pub campaign_id: Option<String>,
    pub contact_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A contact with its project, triggers and email history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails<D = ContactData> {
    #[serde(flatten)]
    pub contact: Contact<D>,
    pub project_id: String,
    pub triggers: Vec<Trigger>,
    pub emails: Vec<ContactEmail>,
}

/// Body of a response whose shape the API does not pin down.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}
