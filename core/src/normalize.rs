//! Conversion from raw wire payloads into caller-facing types.
//!
//! Every wire shape implements [`Normalize`] for its public counterpart.
//! Any field that fails to parse aborts the whole conversion, so callers
//! never see a half-normalized object.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::types::{
    Campaign, Contact, ContactDetails, ContactEmail, ContactResponse, Event, SendEmailResponse,
    TrackEventResponse, Trigger,
};
use crate::wire;

pub(crate) trait Normalize<T> {
    fn normalize(self) -> Result<T, ApiError>;
}

impl<W, T> Normalize<Vec<T>> for Vec<W>
where
    W: Normalize<T>,
{
    fn normalize(self) -> Result<Vec<T>, ApiError> {
        self.into_iter().map(Normalize::normalize).collect()
    }
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC) and a
/// bare `YYYY-MM-DD` (UTC midnight).
pub fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, ApiError> {
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Some(naive) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(naive.and_utc());
    }
    Err(ApiError::TimestampError {
        field,
        value: value.to_string(),
    })
}

fn parse_optional_timestamp(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, ApiError> {
    value.map(|v| parse_timestamp(field, v)).transpose()
}

/// Decode the JSON string a contact's `data` arrives as.
///
/// A missing or null `data` is read as an empty object.
pub fn parse_data<D: DeserializeOwned>(raw: Option<&str>) -> Result<D, ApiError> {
    serde_json::from_str(raw.unwrap_or("{}")).map_err(|e| ApiError::DataError(e.to_string()))
}

impl Normalize<TrackEventResponse> for wire::TrackEventResponse {
    fn normalize(self) -> Result<TrackEventResponse, ApiError> {
        Ok(TrackEventResponse {
            timestamp: parse_timestamp("timestamp", &self.timestamp)?,
            success: self.success,
            contact: self.contact,
            event: self.event,
        })
    }
}

impl Normalize<SendEmailResponse> for wire::SendEmailResponse {
    fn normalize(self) -> Result<SendEmailResponse, ApiError> {
        Ok(SendEmailResponse {
            timestamp: parse_timestamp("timestamp", &self.timestamp)?,
            success: self.success,
            emails: self.emails,
        })
    }
}

impl Normalize<Campaign> for wire::Campaign {
    fn normalize(self) -> Result<Campaign, ApiError> {
        Ok(Campaign {
            created_at: parse_timestamp("createdAt", &self.created_at)?,
            updated_at: parse_timestamp("updatedAt", &self.updated_at)?,
            delivered: parse_optional_timestamp("delivered", self.delivered.as_deref())?,
            id: self.id,
            subject: self.subject,
            body: self.body,
            recipients: self.recipients,
            style: self.style,
            status: self.status,
            project_id: self.project_id,
        })
    }
}

impl<D: DeserializeOwned> Normalize<Contact<D>> for wire::Contact {
    fn normalize(self) -> Result<Contact<D>, ApiError> {
        Ok(Contact {
            created_at: parse_timestamp("createdAt", &self.created_at)?,
            updated_at: parse_timestamp("updatedAt", &self.updated_at)?,
            data: parse_data(self.data.as_deref())?,
            id: self.id,
            email: self.email,
            subscribed: self.subscribed,
        })
    }
}

impl<D: DeserializeOwned> Normalize<ContactResponse<D>> for wire::ContactResponse {
    fn normalize(self) -> Result<ContactResponse<D>, ApiError> {
        Ok(ContactResponse {
            success: self.success,
            contact: self.contact.normalize()?,
        })
    }
}

impl Normalize<Event> for wire::Event {
    fn normalize(self) -> Result<Event, ApiError> {
        Ok(Event {
            created_at: parse_timestamp("event.createdAt", &self.created_at)?,
            updated_at: parse_timestamp("event.updatedAt", &self.updated_at)?,
            id: self.id,
            name: self.name,
            template_id: self.template_id,
        })
    }
}

impl Normalize<Trigger> for wire::Trigger {
    fn normalize(self) -> Result<Trigger, ApiError> {
        Ok(Trigger {
            created_at: parse_timestamp("trigger.createdAt", &self.created_at)?,
            updated_at: parse_timestamp("trigger.updatedAt", &self.updated_at)?,
            event: self.event.normalize()?,
            id: self.id,
            contact_id: self.contact_id,
            event_id: self.event_id,
            action_id: self.action_id,
            action: self.action,
        })
    }
}

impl Normalize<ContactEmail> for wire::ContactEmail {
    fn normalize(self) -> Result<ContactEmail, ApiError> {
        Ok(ContactEmail {
            created_at: parse_timestamp("email.createdAt", &self.created_at)?,
            updated_at: parse_timestamp("email.updatedAt", &self.updated_at)?,
            id: self.id,
            message_id: self.message_id,
            subject: self.subject,
            status: self.status,
            project_id: self.project_id,
            action_id: self.action_id,
            campaign_id: self.campaign_id,
            contact_id: self.contact_id,
        })
    }
}

impl<D: DeserializeOwned> Normalize<ContactDetails<D>> for wire::ContactDetails {
    fn normalize(self) -> Result<ContactDetails<D>, ApiError> {
        Ok(ContactDetails {
            contact: self.contact.normalize()?,
            project_id: self.project_id,
            triggers: self.triggers.normalize()?,
            emails: self.emails.normalize()?,
        })
    }
}
