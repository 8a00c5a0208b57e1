//! Typed client for the Plunk email and marketing-automation API.
//!
//! # Overview
//! Two layers share one set of types:
//! - `PlunkClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO pattern).
//! - `HttpPlunkClient` wraps it with reqwest and exposes one async method
//!   per endpoint.
//!
//! # Design
//! - Clients are stateless apart from an immutable `ClientConfig`.
//! - Responses are normalized before they reach the caller: timestamps
//!   become `DateTime<Utc>` and contact `data` strings become mappings.
//!   Any field that fails to normalize fails the whole call.
//! - Errors are a single `ApiError`; transport, status and parse failures
//!   are separate variants.

pub mod attachment;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod normalize;
pub mod transport;
pub mod types;
mod wire;

pub use attachment::{Attachment, AttachmentFile};
pub use client::PlunkClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::HttpPlunkClient;
pub use types::{
    Campaign, CampaignStatus, CampaignStyle, Contact, ContactCount, ContactData, ContactDetails,
    ContactEmail, ContactRef, ContactResponse, ContactSummary, CreateCampaign, CreateContact,
    EmailRecipient, EmailStatus, Event, ResponseBody, SendCampaignOptions, SendEmail,
    SendEmailResponse, SubscriptionResponse, TrackEvent, TrackEventResponse, Trigger,
    UpdateCampaign, UpdateContact,
};
