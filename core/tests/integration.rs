//! Full lifecycle test against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every sans-IO
//! client operation over real HTTP using ureq. This is the host-does-IO
//! path: the test owns the transport, `PlunkClient` only builds and parses.

use plunk_core::{
    ApiError, AttachmentFile, CampaignStatus, CampaignStyle, ContactDetails, ContactRef,
    CreateCampaign, CreateContact, HttpMethod, HttpRequest, HttpResponse, PlunkClient,
    ResponseBody, SendCampaignOptions, SendEmail, TrackEvent, UpdateCampaign, UpdateContact,
};
use serde::{Deserialize, Serialize};

const API_KEY: &str = "sk_integration";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Profile {
    plan: String,
    source: String,
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// client handle status interpretation.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let HttpRequest {
        method,
        path,
        headers,
        body,
    } = req;
    let body = body.unwrap_or_default();

    let mut response = match method {
        HttpMethod::Get => with_headers(agent.get(&path), &headers).call(),
        HttpMethod::Post => with_headers(agent.post(&path), &headers).send(body.as_bytes()),
        HttpMethod::Put => with_headers(agent.put(&path), &headers).send(body.as_bytes()),
        HttpMethod::Delete => {
            with_headers(agent.delete(&path).force_send_body(), &headers).send(body.as_bytes())
        }
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
        .collect();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers,
        body,
    }
}

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, API_KEY).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

#[test]
fn contact_and_campaign_lifecycle() {
    // Step 1: start mock server on a random port.
    let base_url = start_server();
    let client = PlunkClient::new(&base_url, API_KEY);

    // Step 2: list and count, both empty.
    let req = client.build_get_all_contacts();
    let contacts = client
        .parse_get_all_contacts::<Profile>(execute(req))
        .unwrap();
    assert!(contacts.is_empty(), "expected empty list");
    let req = client.build_get_number_of_contacts();
    assert_eq!(client.parse_get_number_of_contacts(execute(req)).unwrap().count, 0);

    // Step 3: create a contact with typed data.
    let profile = Profile {
        plan: "pro".to_string(),
        source: "integration".to_string(),
    };
    let req = client
        .build_create_contact(&CreateContact {
            email: "ada@example.com".to_string(),
            subscribed: false,
            data: profile.clone(),
        })
        .unwrap();
    let created = client.parse_create_contact::<Profile>(execute(req)).unwrap();
    assert!(created.success);
    assert_eq!(created.contact.data, profile);
    let id = created.contact.id.clone();

    // Step 4: get by id returns the same data.
    let req = client.build_get_contact_by_id(&id);
    let fetched: ContactDetails<Profile> = client.parse_get_contact_by_id(execute(req)).unwrap();
    assert_eq!(fetched.contact.data, profile);
    assert_eq!(fetched.contact.created_at, created.contact.created_at);
    assert!(fetched.triggers.is_empty());

    // Step 5: track an event; it shows up as a trigger.
    let req = client
        .build_track_event(&TrackEvent::<Profile>::new("upgraded", "ada@example.com"))
        .unwrap();
    let tracked = client.parse_track_event(execute(req)).unwrap();
    assert!(tracked.success);
    assert_eq!(tracked.contact, id);
    let req = client.build_get_contact_by_id(&id);
    let fetched: ContactDetails<Profile> = client.parse_get_contact_by_id(execute(req)).unwrap();
    assert_eq!(fetched.triggers.len(), 1);
    assert_eq!(fetched.triggers[0].event.name, "upgraded");
    assert_eq!(fetched.triggers[0].event_id, tracked.event);

    // Step 6: subscribe by email, unsubscribe by id.
    let req = client
        .build_subscribe_contact(&ContactRef::email("ada@example.com"))
        .unwrap();
    let sub = client.parse_subscribe_contact(execute(req)).unwrap();
    assert!(sub.subscribed);
    let req = client.build_unsubscribe_contact(&ContactRef::id(&id)).unwrap();
    let sub = client.parse_unsubscribe_contact(execute(req)).unwrap();
    assert!(!sub.subscribed);
    assert_eq!(sub.contact, id);

    // Step 7: update by email.
    let new_profile = Profile {
        plan: "team".to_string(),
        source: "integration".to_string(),
    };
    let req = client
        .build_update_contact(&UpdateContact {
            contact: ContactRef::email("ada@example.com"),
            subscribed: true,
            data: new_profile.clone(),
        })
        .unwrap();
    let updated = client.parse_update_contact::<Profile>(execute(req)).unwrap();
    assert_eq!(updated.contact.data, new_profile);
    assert!(updated.contact.subscribed);

    // Step 8: send an email with attachments.
    let email = SendEmail::new("ada@example.com", "Receipt", "<p>Thanks</p>")
        .attachment(AttachmentFile::new("a.txt", "text/plain", b"first".to_vec()))
        .attachment(AttachmentFile::new("b.bin", "application/octet-stream", vec![0, 1, 2, 255]));
    let req = client.build_send_email(&email).unwrap();
    let sent = client.parse_send_email(execute(req)).unwrap();
    assert!(sent.success);
    assert_eq!(sent.emails.len(), 1);
    assert_eq!(sent.emails[0].contact.id, id);

    // Step 9: campaign create, update, send, delete.
    let req = client
        .build_create_campaign(&CreateCampaign {
            subject: "Launch".to_string(),
            body: "Hello".to_string(),
            recipients: vec!["ada@example.com".to_string()],
            style: CampaignStyle::Html,
        })
        .unwrap();
    let campaign = client.parse_create_campaign(execute(req)).unwrap();
    assert_eq!(campaign.status, CampaignStatus::Draft);
    assert_eq!(campaign.recipients, vec!["ada@example.com".to_string()]);

    let req = client
        .build_update_campaign(
            &campaign.id,
            &UpdateCampaign {
                subject: "Launch!".to_string(),
                body: "Hello again".to_string(),
                recipients: vec!["ada@example.com".to_string()],
                style: Some(CampaignStyle::Plunk),
            },
        )
        .unwrap();
    let campaign = client.parse_update_campaign(execute(req)).unwrap();
    assert_eq!(campaign.subject, "Launch!");
    assert_eq!(campaign.style, CampaignStyle::Plunk);

    let req = client
        .build_send_campaign(&campaign.id, SendCampaignOptions::default())
        .unwrap();
    let sent = client.parse_send_campaign(execute(req)).unwrap();
    assert!(matches!(sent, ResponseBody::Json(_)));

    let req = client.build_delete_campaign(&campaign.id).unwrap();
    let deleted = client.parse_delete_campaign(execute(req)).unwrap();
    assert_eq!(deleted.id, campaign.id);
    assert_eq!(deleted.status, CampaignStatus::Draft);

    // Step 10: delete the contact; later lookups are 404.
    let req = client.build_delete_contact(&id).unwrap();
    let deleted = client.parse_delete_contact::<Profile>(execute(req)).unwrap();
    assert_eq!(deleted.contact.id, id);

    let req = client.build_get_contact_by_id(&id);
    let err = client
        .parse_get_contact_by_id::<Profile>(execute(req))
        .unwrap_err();
    assert!(matches!(err, ApiError::HttpError { status: 404, .. }));

    let req = client.build_delete_campaign(&campaign.id).unwrap();
    let err = client.parse_delete_campaign(execute(req)).unwrap_err();
    assert_eq!(err.status(), Some(404));

    // Step 11: list is empty again.
    let req = client.build_get_all_contacts();
    let contacts = client
        .parse_get_all_contacts::<Profile>(execute(req))
        .unwrap();
    assert!(contacts.is_empty(), "expected empty list after delete");
}

#[test]
fn wrong_api_key_is_rejected() {
    let base_url = start_server();
    let client = PlunkClient::new(&base_url, "sk_wrong");

    let req = client.build_get_number_of_contacts();
    let err = client.parse_get_number_of_contacts(execute(req)).unwrap_err();
    match err {
        ApiError::HttpError {
            status,
            status_text,
        } => {
            assert_eq!(status, 401);
            assert_eq!(status_text, "Unauthorized");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
