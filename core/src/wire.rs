//! Raw JSON shapes exactly as the API sends and receives them.
//!
//! Timestamps are still strings and contact `data` is still an embedded
//! JSON string; `normalize` turns these into the public types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::attachment::Attachment;
use crate::types::{CampaignStatus, CampaignStyle, EmailRecipient, EmailStatus};

// ---------------------------------------------------------------------------
// Outbound bodies that differ from the public request types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct SendEmailBody<'a> {
    pub to: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<&'a BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SendCampaignBody<'a> {
    pub id: &'a str,
    pub live: bool,
    pub delay: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct CampaignIdBody<'a> {
    pub id: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateCampaignBody<'a> {
    pub id: &'a str,
    #[serde(flatten)]
    pub fields: &'a crate::types::UpdateCampaign,
}

// ---------------------------------------------------------------------------
// Inbound payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct TrackEventResponse {
    pub success: bool,
    pub contact: String,
    pub event: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SendEmailResponse {
    pub success: bool,
    pub emails: Vec<EmailRecipient>,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Campaign {
    pub id: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub recipients: Vec<String>,
    pub style: CampaignStyle,
    pub status: CampaignStatus,
    #[serde(default)]
    pub delivered: Option<String>,
    pub project_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Contact {
    pub id: String,
    pub email: String,
    pub subscribed: bool,
    #[serde(default)]
    pub data: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContactResponse {
    pub success: bool,
    #[serde(flatten)]
    pub contact: Contact,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Event {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub template_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Trigger {
    pub id: String,
    pub contact_id: String,
    pub event_id: String,
    #[serde(default)]
    pub action_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub event: Event,
    #[serde(default)]
    pub action: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContactEmail {
    pub id: String,
    pub message_id: String,
    pub subject: String,
    pub status: EmailStatus,
    pub project_id: String,
    #[serde(default)]
    pub action_id: Option<String>,
    #[serde(default)]
    pub campaign_id: Option<String>,
    pub contact_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContactDetails {
    #[serde(flatten)]
    pub contact: Contact,
    pub project_id: String,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    #[serde(default)]
    pub emails: Vec<ContactEmail>,
}
