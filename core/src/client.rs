//! Stateless HTTP request builder and response parser for the Plunk API.
//!
//! # Design
//! `PlunkClient` holds only its `ClientConfig` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Whoever sits in between performs the HTTP round-trip;
//! `HttpPlunkClient` does this with reqwest, but any transport works.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::attachment;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::normalize::Normalize;
use crate::types::{
    Campaign, ContactCount, ContactDetails, ContactRef, ContactResponse, CreateCampaign,
    CreateContact, Contact, ResponseBody, SendCampaignOptions, SendEmail, SendEmailResponse,
    SubscriptionResponse, TrackEvent, TrackEventResponse, UpdateCampaign, UpdateContact,
};
use crate::wire;

/// Synchronous, stateless client for the Plunk API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct PlunkClient {
    config: ClientConfig,
}

impl PlunkClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::from_config(ClientConfig::new(base_url, api_key))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // -- events & transactional email ---------------------------------------

    pub fn build_track_event<D: Serialize>(
        &self,
        input: &TrackEvent<D>,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/v1/track", input)
    }

    pub fn parse_track_event(&self, response: HttpResponse) -> Result<TrackEventResponse, ApiError> {
        parse_json::<wire::TrackEventResponse>(&response)?.normalize()
    }

    /// Attachments are base64-encoded here, in the order given.
    pub fn build_send_email(&self, input: &SendEmail) -> Result<HttpRequest, ApiError> {
        let body = wire::SendEmailBody {
            to: &input.to,
            subject: &input.subject,
            body: &input.body,
            subscribed: input.subscribed,
            name: input.name.as_deref(),
            from: input.from.as_deref(),
            reply: input.reply.as_deref(),
            headers: input.headers.as_ref(),
            attachments: attachment::encode_all(&input.attachments),
        };
        self.json_request(HttpMethod::Post, "/v1/send", &body)
    }

    pub fn parse_send_email(&self, response: HttpResponse) -> Result<SendEmailResponse, ApiError> {
        parse_json::<wire::SendEmailResponse>(&response)?.normalize()
    }

    // -- campaigns ----------------------------------------------------------

    pub fn build_send_campaign(
        &self,
        id: &str,
        options: SendCampaignOptions,
    ) -> Result<HttpRequest, ApiError> {
        let body = wire::SendCampaignBody {
            id,
            live: options.live.unwrap_or(false),
            delay: options.delay.unwrap_or(0),
        };
        self.json_request(HttpMethod::Post, "/v1/campaigns/send", &body)
    }

    /// The API does not document this response, so it is returned as-is:
    /// JSON when the server says so, text otherwise.
    pub fn parse_send_campaign(&self, response: HttpResponse) -> Result<ResponseBody, ApiError> {
        check_status(&response)?;
        if response.is_json() && !response.body.trim().is_empty() {
            let value = serde_json::from_str(&response.body)
                .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
            Ok(ResponseBody::Json(value))
        } else {
            Ok(ResponseBody::Text(response.body))
        }
    }

    pub fn build_create_campaign(&self, input: &CreateCampaign) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/v1/campaigns", input)
    }

    pub fn parse_create_campaign(&self, response: HttpResponse) -> Result<Campaign, ApiError> {
        parse_json::<wire::Campaign>(&response)?.normalize()
    }

    pub fn build_update_campaign(
        &self,
        id: &str,
        input: &UpdateCampaign,
    ) -> Result<HttpRequest, ApiError> {
        let body = wire::UpdateCampaignBody { id, fields: input };
        self.json_request(HttpMethod::Put, "/v1/campaigns", &body)
    }

    pub fn parse_update_campaign(&self, response: HttpResponse) -> Result<Campaign, ApiError> {
        parse_json::<wire::Campaign>(&response)?.normalize()
    }

    /// The id goes in both the path and the body.
    pub fn build_delete_campaign(&self, id: &str) -> Result<HttpRequest, ApiError> {
        self.json_request(
            HttpMethod::Delete,
            &format!("/v1/campaigns/{id}"),
            &wire::CampaignIdBody { id },
        )
    }

    pub fn parse_delete_campaign(&self, response: HttpResponse) -> Result<Campaign, ApiError> {
        parse_json::<wire::Campaign>(&response)?.normalize()
    }

    // -- contacts -----------------------------------------------------------

    pub fn build_get_contact_by_id(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/v1/contacts/{id}"))
    }

    pub fn parse_get_contact_by_id<D: DeserializeOwned>(
        &self,
        response: HttpResponse,
    ) -> Result<ContactDetails<D>, ApiError> {
        parse_json::<wire::ContactDetails>(&response)?.normalize()
    }

    pub fn build_get_all_contacts(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/v1/contacts")
    }

    pub fn parse_get_all_contacts<D: DeserializeOwned>(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Contact<D>>, ApiError> {
        parse_json::<Vec<wire::Contact>>(&response)?.normalize()
    }

    pub fn build_get_number_of_contacts(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/v1/contacts/count")
    }

    pub fn parse_get_number_of_contacts(
        &self,
        response: HttpResponse,
    ) -> Result<ContactCount, ApiError> {
        parse_json(&response)
    }

    pub fn build_create_contact<D: Serialize>(
        &self,
        input: &CreateContact<D>,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/v1/contacts", input)
    }

    pub fn parse_create_contact<D: DeserializeOwned>(
        &self,
        response: HttpResponse,
    ) -> Result<ContactResponse<D>, ApiError> {
        parse_json::<wire::ContactResponse>(&response)?.normalize()
    }

    pub fn build_subscribe_contact(&self, contact: &ContactRef) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/v1/contacts/subscribe", contact)
    }

    pub fn parse_subscribe_contact(
        &self,
        response: HttpResponse,
    ) -> Result<SubscriptionResponse, ApiError> {
        parse_json(&response)
    }

    pub fn build_unsubscribe_contact(&self, contact: &ContactRef) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/v1/contacts/unsubscribe", contact)
    }

    pub fn parse_unsubscribe_contact(
        &self,
        response: HttpResponse,
    ) -> Result<SubscriptionResponse, ApiError> {
        parse_json(&response)
    }

    pub fn build_update_contact<D: Serialize>(
        &self,
        input: &UpdateContact<D>,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, "/v1/contacts", input)
    }

    pub fn parse_update_contact<D: DeserializeOwned>(
        &self,
        response: HttpResponse,
    ) -> Result<ContactResponse<D>, ApiError> {
        parse_json::<wire::ContactResponse>(&response)?.normalize()
    }

    pub fn build_delete_contact(&self, id: &str) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Delete, "/v1/contacts", &ContactRef::id(id))
    }

    pub fn parse_delete_contact<D: DeserializeOwned>(
        &self,
        response: HttpResponse,
    ) -> Result<ContactResponse<D>, ApiError> {
        parse_json::<wire::ContactResponse>(&response)?.normalize()
    }

    // -- helpers ------------------------------------------------------------

    fn request(&self, method: HttpMethod, endpoint: &str) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{endpoint}", self.config.base_url()),
            headers: vec![("authorization".to_string(), self.config.bearer())],
            body: None,
        }
    }

    fn json_request<T: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(body).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut request = self.request(method, endpoint);
        request
            .headers
            .push(("content-type".to_string(), "application/json".to_string()));
        request.body = Some(body);
        Ok(request)
    }
}

/// Map any status outside 200-299 to `HttpError`. The body is left alone.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::HttpError {
        status: response.status,
        status_text: response.status_text(),
    })
}

/// Check the status, then decode the body as JSON. A response that declares
/// a non-JSON content type is rejected; a missing content type is tolerated.
fn parse_json<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    check_status(response)?;
    if let Some(content_type) = response.content_type() {
        if !response.is_json() {
            return Err(ApiError::DeserializationError(format!(
                "expected a JSON response, got content type {content_type:?}"
            )));
        }
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}
