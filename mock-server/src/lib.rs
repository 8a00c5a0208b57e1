use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
    Json, Router,
};
use base64::prelude::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Key accepted by `app` when the binary is started without `PLUNK_API_KEY`.
pub const DEFAULT_API_KEY: &str = "sk_test_mock";

pub const PROJECT_ID: &str = "00000000-0000-0000-0000-0000000000aa";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CampaignStyle {
    Plunk,
    Html,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CampaignStatus {
    Draft,
    Sending,
    Delivered,
}

/// A contact as the API returns it: `data` is a JSON-encoded string.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub email: String,
    pub subscribed: bool,
    pub data: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: Uuid,
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
    pub status: CampaignStatus,
    pub delivered: Option<DateTime<Utc>>,
    pub style: CampaignStyle,
    pub project_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub template_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub event_id: Uuid,
    pub action_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub event: Event,
    pub action: Option<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContactDetails {
    #[serde(flatten)]
    contact: Contact,
    project_id: &'static str,
    triggers: Vec<Trigger>,
    emails: Vec<Value>,
}

#[derive(Serialize)]
struct ContactEnvelope {
    success: bool,
    #[serde(flatten)]
    contact: Contact,
}

#[derive(Deserialize)]
pub struct TrackEvent {
    pub event: String,
    pub email: String,
    pub subscribed: Option<bool>,
    pub data: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub content: String,
    #[serde(rename = "contentType")]
    pub content_type: String,
}

#[derive(Deserialize)]
pub struct SendEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub subscribed: Option<bool>,
    pub name: Option<String>,
    pub from: Option<String>,
    pub reply: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Deserialize)]
pub struct SendCampaign {
    pub id: Uuid,
    #[serde(default)]
    pub live: bool,
    #[serde(default)]
    pub delay: u32,
}

#[derive(Deserialize)]
pub struct CreateCampaign {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
    pub style: CampaignStyle,
}

#[derive(Deserialize)]
pub struct UpdateCampaign {
    pub id: Uuid,
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
    pub style: Option<CampaignStyle>,
}

#[derive(Deserialize)]
pub struct CreateContact {
    pub email: String,
    pub subscribed: bool,
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// `{id}` or `{email}` selector used by subscription and update routes.
#[derive(Deserialize)]
pub struct ContactLookup {
    pub id: Option<Uuid>,
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateContact {
    pub id: Option<Uuid>,
    pub email: Option<String>,
    pub subscribed: bool,
    #[serde(default)]
    pub data: Map<String, Value>,
}

#[derive(Deserialize)]
pub struct DeleteContact {
    pub id: Uuid,
}

#[derive(Default)]
pub struct Store {
    contacts: HashMap<Uuid, Contact>,
    campaigns: HashMap<Uuid, Campaign>,
    events: HashMap<String, Event>,
    triggers: Vec<Trigger>,
}

impl Store {
    fn find_contact(&self, id: Option<Uuid>, email: Option<&str>) -> Option<Uuid> {
        match (id, email) {
            (Some(id), _) => self.contacts.contains_key(&id).then_some(id),
            (None, Some(email)) => self
                .contacts
                .values()
                .find(|c| c.email == email)
                .map(|c| c.id),
            (None, None) => None,
        }
    }

    /// Find the contact with `email`, creating it if needed.
    fn upsert_contact(&mut self, email: &str, subscribed: bool) -> &mut Contact {
        let id = self
            .find_contact(None, Some(email))
            .unwrap_or_else(Uuid::new_v4);
        self.contacts.entry(id).or_insert_with(|| {
            let now = Utc::now();
            Contact {
                id,
                email: email.to_string(),
                subscribed,
                data: "{}".to_string(),
                created_at: now,
                updated_at: now,
            }
        })
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    api_key: Arc<str>,
    db: Db,
}

pub fn app(api_key: &str) -> Router {
    let state = AppState {
        api_key: Arc::from(api_key),
        db: Db::default(),
    };
    Router::new()
        .route("/v1/track", post(track_event))
        .route("/v1/send", post(send_email))
        .route("/v1/campaigns", post(create_campaign).put(update_campaign))
        .route("/v1/campaigns/send", post(send_campaign))
        .route("/v1/campaigns/{id}", delete(delete_campaign))
        .route(
            "/v1/contacts",
            get(list_contacts)
                .post(create_contact)
                .put(update_contact)
                .delete(delete_contact),
        )
        .route("/v1/contacts/count", get(count_contacts))
        .route("/v1/contacts/subscribe", post(subscribe_contact))
        .route("/v1/contacts/unsubscribe", post(unsubscribe_contact))
        .route("/v1/contacts/{id}", get(get_contact))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .with_state(state)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let expected = format!("Bearer {}", state.api_key);
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !authorized {
        tracing::warn!(path = %request.uri().path(), "rejected request without valid bearer token");
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(request).await)
}

fn merge_data(existing: &str, extra: Map<String, Value>) -> String {
    let mut data: Map<String, Value> = serde_json::from_str(existing).unwrap_or_default();
    data.extend(extra);
    Value::Object(data).to_string()
}

async fn track_event(
    State(state): State<AppState>,
    Json(input): Json<TrackEvent>,
) -> Json<Value> {
    let mut store = state.db.write().await;
    let now = Utc::now();

    let contact = store.upsert_contact(&input.email, input.subscribed.unwrap_or(true));
    if let Some(data) = input.data {
        contact.data = merge_data(&contact.data, data);
        contact.updated_at = now;
    }
    let contact_id = contact.id;

    let event = store
        .events
        .entry(input.event.clone())
        .or_insert_with(|| Event {
            id: Uuid::new_v4(),
            name: input.event.clone(),
            template_id: None,
            created_at: now,
            updated_at: now,
        })
        .clone();
    store.triggers.push(Trigger {
        id: Uuid::new_v4(),
        contact_id,
        event_id: event.id,
        action_id: None,
        created_at: now,
        updated_at: now,
        event: event.clone(),
        action: None,
    });
    tracing::debug!(event = %event.name, %contact_id, "tracked event");

    Json(json!({
        "success": true,
        "contact": contact_id,
        "event": event.id,
        "timestamp": now,
    }))
}

async fn send_email(
    State(state): State<AppState>,
    Json(input): Json<SendEmail>,
) -> Result<Json<Value>, StatusCode> {
    for attachment in &input.attachments {
        if attachment.filename.is_empty() || BASE64_STANDARD.decode(&attachment.content).is_err() {
            return Err(StatusCode::BAD_REQUEST);
        }
    }
    let mut store = state.db.write().await;
    let contact = store.upsert_contact(&input.to, input.subscribed.unwrap_or(false));
    tracing::debug!(
        to = %input.to,
        subject = %input.subject,
        attachments = input.attachments.len(),
        "accepted email"
    );
    Ok(Json(json!({
        "success": true,
        "emails": [{
            "email": contact.email,
            "contact": {"id": contact.id, "email": contact.email},
        }],
        "timestamp": Utc::now(),
    })))
}

async fn send_campaign(
    State(state): State<AppState>,
    Json(input): Json<SendCampaign>,
) -> Result<Json<Value>, StatusCode> {
    let mut store = state.db.write().await;
    let campaign = store
        .campaigns
        .get_mut(&input.id)
        .ok_or(StatusCode::NOT_FOUND)?;
    if input.live {
        campaign.status = CampaignStatus::Sending;
        campaign.updated_at = Utc::now();
    }
    tracing::debug!(id = %input.id, live = input.live, delay = input.delay, "campaign send requested");
    Ok(Json(json!({"success": true})))
}

async fn create_campaign(
    State(state): State<AppState>,
    Json(input): Json<CreateCampaign>,
) -> Json<Campaign> {
    let now = Utc::now();
    let campaign = Campaign {
        id: Uuid::new_v4(),
        subject: input.subject,
        body: input.body,
        recipients: input.recipients,
        status: CampaignStatus::Draft,
        delivered: None,
        style: input.style,
        project_id: PROJECT_ID.to_string(),
        created_at: now,
        updated_at: now,
    };
    state
        .db
        .write()
        .await
        .campaigns
        .insert(campaign.id, campaign.clone());
    Json(campaign)
}

async fn update_campaign(
    State(state): State<AppState>,
    Json(input): Json<UpdateCampaign>,
) -> Result<Json<Campaign>, StatusCode> {
    let mut store = state.db.write().await;
    let campaign = store
        .campaigns
        .get_mut(&input.id)
        .ok_or(StatusCode::NOT_FOUND)?;
    campaign.subject = input.subject;
    campaign.body = input.body;
    campaign.recipients = input.recipients;
    if let Some(style) = input.style {
        campaign.style = style;
    }
    campaign.updated_at = Utc::now();
    Ok(Json(campaign.clone()))
}

async fn delete_campaign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Campaign>, StatusCode> {
    let mut store = state.db.write().await;
    store
        .campaigns
        .remove(&id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn list_contacts(State(state): State<AppState>) -> Json<Vec<Contact>> {
    let store = state.db.read().await;
    let mut contacts: Vec<Contact> = store.contacts.values().cloned().collect();
    contacts.sort_by(|a, b| (a.created_at, &a.email).cmp(&(b.created_at, &b.email)));
    Json(contacts)
}

async fn count_contacts(State(state): State<AppState>) -> Json<Value> {
    let store = state.db.read().await;
    Json(json!({"count": store.contacts.len()}))
}

async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, StatusCode> {
    let store = state.db.read().await;
    let contact = store.contacts.get(&id).cloned().ok_or(StatusCode::NOT_FOUND)?;
    let triggers = store
        .triggers
        .iter()
        .filter(|t| t.contact_id == id)
        .cloned()
        .collect();
    let details = ContactDetails {
        contact,
        project_id: PROJECT_ID,
        triggers,
        emails: Vec::new(),
    };
    serde_json::to_value(details)
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn create_contact(
    State(state): State<AppState>,
    Json(input): Json<CreateContact>,
) -> Result<Json<Value>, StatusCode> {
    let mut store = state.db.write().await;
    if store.find_contact(None, Some(&input.email)).is_some() {
        return Err(StatusCode::CONFLICT);
    }
    let now = Utc::now();
    let contact = Contact {
        id: Uuid::new_v4(),
        email: input.email,
        subscribed: input.subscribed,
        data: Value::Object(input.data).to_string(),
        created_at: now,
        updated_at: now,
    };
    store.contacts.insert(contact.id, contact.clone());
    envelope(contact)
}

async fn set_subscription(
    state: AppState,
    lookup: ContactLookup,
    subscribed: bool,
) -> Result<Json<Value>, StatusCode> {
    if lookup.id.is_none() && lookup.email.is_none() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut store = state.db.write().await;
    let id = store
        .find_contact(lookup.id, lookup.email.as_deref())
        .ok_or(StatusCode::NOT_FOUND)?;
    let contact = store.contacts.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    contact.subscribed = subscribed;
    contact.updated_at = Utc::now();
    Ok(Json(json!({
        "success": true,
        "contact": contact.id,
        "subscribed": contact.subscribed,
    })))
}

async fn subscribe_contact(
    State(state): State<AppState>,
    Json(lookup): Json<ContactLookup>,
) -> Result<Json<Value>, StatusCode> {
    set_subscription(state, lookup, true).await
}

async fn unsubscribe_contact(
    State(state): State<AppState>,
    Json(lookup): Json<ContactLookup>,
) -> Result<Json<Value>, StatusCode> {
    set_subscription(state, lookup, false).await
}

async fn update_contact(
    State(state): State<AppState>,
    Json(input): Json<UpdateContact>,
) -> Result<Json<Value>, StatusCode> {
    if input.id.is_none() && input.email.is_none() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut store = state.db.write().await;
    let id = store
        .find_contact(input.id, input.email.as_deref())
        .ok_or(StatusCode::NOT_FOUND)?;
    let contact = store.contacts.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    contact.subscribed = input.subscribed;
    contact.data = Value::Object(input.data).to_string();
    contact.updated_at = Utc::now();
    envelope(contact.clone())
}

async fn delete_contact(
    State(state): State<AppState>,
    Json(input): Json<DeleteContact>,
) -> Result<Json<Value>, StatusCode> {
    let mut store = state.db.write().await;
    let contact = store.contacts.remove(&input.id).ok_or(StatusCode::NOT_FOUND)?;
    store.triggers.retain(|t| t.contact_id != input.id);
    envelope(contact)
}

fn envelope(contact: Contact) -> Result<Json<Value>, StatusCode> {
    serde_json::to_value(ContactEnvelope {
        success: true,
        contact,
    })
    .map(Json)
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
