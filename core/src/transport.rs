//! Async Plunk client backed by reqwest.
//!
//! `HttpPlunkClient` pairs a [`PlunkClient`] with a `reqwest::Client`: every
//! method builds the request, sends it once, and parses the response. There
//! are no retries and no client-side timeouts; pass a preconfigured
//! `reqwest::Client` through [`HttpPlunkClient::with_client`] to add them.
//!
//! ```no_run
//! use plunk_core::{CreateContact, HttpPlunkClient};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), plunk_core::ApiError> {
//! let client = HttpPlunkClient::new("https://api.useplunk.com", "sk_...");
//! let created = client
//!     .create_contact(&CreateContact {
//!         email: "ada@example.com".to_string(),
//!         subscribed: true,
//!         data: json!({"plan": "pro"}),
//!     })
//!     .await?;
//! println!("created {}", created.contact.id);
//! # Ok(())
//! # }
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::client::PlunkClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    Campaign, Contact, ContactCount, ContactDetails, ContactRef, ContactResponse, CreateCampaign,
    CreateContact, ResponseBody, SendCampaignOptions, SendEmail, SendEmailResponse,
    SubscriptionResponse, TrackEvent, TrackEventResponse, UpdateCampaign, UpdateContact,
};

/// Async client that performs real HTTP calls against the Plunk API.
#[derive(Debug, Clone)]
pub struct HttpPlunkClient {
    http: reqwest::Client,
    core: PlunkClient,
}

impl HttpPlunkClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::from_config(ClientConfig::new(base_url, api_key))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Use a caller-built `reqwest::Client` (timeouts, proxies, TLS roots).
    pub fn with_client(http: reqwest::Client, config: ClientConfig) -> Self {
        Self {
            http,
            core: PlunkClient::from_config(config),
        }
    }

    /// Configure from `PLUNK_API_KEY` and `PLUNK_BASE_URL`.
    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self::from_config(ClientConfig::from_env()?))
    }

    /// The sans-IO client used to build and parse requests.
    pub fn core(&self) -> &PlunkClient {
        &self.core
    }

    /// Send one request and collect the full response. Non-2xx statuses are
    /// returned as data; only transport failures are errors here.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let HttpRequest {
            method,
            path,
            headers,
            body,
        } = request;

        debug!(%method, url = %path, "sending plunk request");

        let mut builder = self.http.request(reqwest_method(method), &path);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;

        let response = HttpResponse {
            status: status.as_u16(),
            headers,
            body,
        };
        if response.is_success() {
            debug!(
                %method,
                url = %path,
                status = response.status,
                content_type = response.content_type().unwrap_or_default(),
                "plunk request succeeded"
            );
        } else {
            warn!(%method, url = %path, status = response.status, "plunk request failed");
        }
        Ok(response)
    }

    pub async fn track_event<D: Serialize>(
        &self,
        input: &TrackEvent<D>,
    ) -> Result<TrackEventResponse, ApiError> {
        let request = self.core.build_track_event(input)?;
        self.core.parse_track_event(self.execute(request).await?)
    }

    pub async fn send_email(&self, input: &SendEmail) -> Result<SendEmailResponse, ApiError> {
        let request = self.core.build_send_email(input)?;
        self.core.parse_send_email(self.execute(request).await?)
    }

    pub async fn send_campaign(
        &self,
        id: &str,
        options: SendCampaignOptions,
    ) -> Result<ResponseBody, ApiError> {
        let request = self.core.build_send_campaign(id, options)?;
        self.core.parse_send_campaign(self.execute(request).await?)
    }

    pub async fn create_campaign(&self, input: &CreateCampaign) -> Result<Campaign, ApiError> {
        let request = self.core.build_create_campaign(input)?;
        self.core.parse_create_campaign(self.execute(request).await?)
    }

    pub async fn update_campaign(
        &self,
        id: &str,
        input: &UpdateCampaign,
    ) -> Result<Campaign, ApiError> {
        let request = self.core.build_update_campaign(id, input)?;
        self.core.parse_update_campaign(self.execute(request).await?)
    }

    pub async fn delete_campaign(&self, id: &str) -> Result<Campaign, ApiError> {
        let request = self.core.build_delete_campaign(id)?;
        self.core.parse_delete_campaign(self.execute(request).await?)
    }

    pub async fn get_contact_by_id<D: DeserializeOwned>(
        &self,
        id: &str,
    ) -> Result<ContactDetails<D>, ApiError> {
        let request = self.core.build_get_contact_by_id(id);
        self.core.parse_get_contact_by_id(self.execute(request).await?)
    }

    pub async fn get_all_contacts<D: DeserializeOwned>(&self) -> Result<Vec<Contact<D>>, ApiError> {
        let request = self.core.build_get_all_contacts();
        self.core.parse_get_all_contacts(self.execute(request).await?)
    }

    pub async fn get_number_of_contacts(&self) -> Result<ContactCount, ApiError> {
        let request = self.core.build_get_number_of_contacts();
        self.core
            .parse_get_number_of_contacts(self.execute(request).await?)
    }

    pub async fn create_contact<D>(
        &self,
        input: &CreateContact<D>,
    ) -> Result<ContactResponse<D>, ApiError>
    where
        D: Serialize + DeserializeOwned,
    {
        let request = self.core.build_create_contact(input)?;
        self.core.parse_create_contact(self.execute(request).await?)
    }

    pub async fn subscribe_contact(
        &self,
        contact: &ContactRef,
    ) -> Result<SubscriptionResponse, ApiError> {
        let request = self.core.build_subscribe_contact(contact)?;
        self.core.parse_subscribe_contact(self.execute(request).await?)
    }

    pub async fn unsubscribe_contact(
        &self,
        contact: &ContactRef,
    ) -> Result<SubscriptionResponse, ApiError> {
        let request = self.core.build_unsubscribe_contact(contact)?;
        self.core
            .parse_unsubscribe_contact(self.execute(request).await?)
    }

    pub async fn update_contact<D>(
        &self,
        input: &UpdateContact<D>,
    ) -> Result<ContactResponse<D>, ApiError>
    where
        D: Serialize + DeserializeOwned,
    {
        let request = self.core.build_update_contact(input)?;
        self.core.parse_update_contact(self.execute(request).await?)
    }

    pub async fn delete_contact<D: DeserializeOwned>(
        &self,
        id: &str,
    ) -> Result<ContactResponse<D>, ApiError> {
        let request = self.core.build_delete_contact(id)?;
        self.core.parse_delete_contact(self.execute(request).await?)
    }
}

fn reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}
