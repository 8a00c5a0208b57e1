//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and either an expected parse result or an expected error kind. Comparing
//! parsed JSON (not raw strings) avoids false negatives from field-ordering
//! differences.

use std::fmt::Debug;

use plunk_core::{
    ApiError, AttachmentFile, Campaign, Contact, ContactCount, ContactDetails, ContactRef,
    ContactResponse, CreateCampaign, CreateContact, HttpMethod, HttpRequest, HttpResponse,
    PlunkClient, ResponseBody, SendCampaignOptions, SendEmail, SendEmailResponse,
    SubscriptionResponse, TrackEvent, TrackEventResponse, UpdateCampaign, UpdateContact,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";
const API_KEY: &str = "sk_vectors";

fn client() -> PlunkClient {
    PlunkClient::new(BASE_URL, API_KEY)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn input_id(case: &Value) -> &str {
    case["input_id"].as_str().unwrap()
}

fn input<T: DeserializeOwned>(case: &Value) -> T {
    serde_json::from_value(case["input"].clone()).unwrap()
}

/// String bodies are passed through verbatim; anything else is JSON-encoded.
fn response_from(sim: &Value) -> HttpResponse {
    let mut headers = Vec::new();
    if let Some(content_type) = sim["content_type"].as_str() {
        headers.push(("Content-Type".to_string(), content_type.to_string()));
    }
    let body = match &sim["body"] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers,
        body,
    }
}

fn check_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(
        req.method,
        parse_method(expected["method"].as_str().unwrap()),
        "{name}: method"
    );
    assert_eq!(
        req.path,
        format!("{BASE_URL}{}", expected["path"].as_str().unwrap()),
        "{name}: path"
    );
    assert_eq!(
        req.header("authorization"),
        Some(format!("Bearer {API_KEY}").as_str()),
        "{name}: authorization"
    );

    match expected.get("body") {
        Some(expected_body) => {
            let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&body, expected_body, "{name}: body");
            assert_eq!(
                req.header("content-type"),
                Some("application/json"),
                "{name}: content-type"
            );
        }
        None => assert!(req.body.is_none(), "{name}: unexpected body"),
    }
}

fn error_kind(err: &ApiError) -> &'static str {
    match err {
        ApiError::TransportError(_) => "TransportError",
        ApiError::HttpError { .. } => "HttpError",
        ApiError::TimestampError { .. } => "TimestampError",
        ApiError::DataError(_) => "DataError",
        ApiError::DeserializationError(_) => "DeserializationError",
        ApiError::SerializationError(_) => "SerializationError",
        ApiError::ConfigError(_) => "ConfigError",
        ApiError::AttachmentError { .. } => "AttachmentError",
    }
}

fn check_error<T: Debug>(name: &str, result: Result<T, ApiError>, case: &Value) {
    let expected_kind = case["expected_error"].as_str().unwrap();
    let err = match result {
        Ok(value) => panic!("{name}: expected {expected_kind}, got {value:?}"),
        Err(err) => err,
    };
    assert_eq!(error_kind(&err), expected_kind, "{name}: error kind ({err})");
    if let Some(status) = case["expected_status"].as_u64() {
        assert_eq!(err.status(), Some(status as u16), "{name}: status");
    }
}

fn check_outcome<T>(name: &str, result: Result<T, ApiError>, case: &Value)
where
    T: DeserializeOwned + PartialEq + Debug,
{
    if case.get("expected_error").is_some() {
        return check_error(name, result, case);
    }
    let expected: T = serde_json::from_value(case["expected_result"].clone()).unwrap();
    let actual = result.unwrap_or_else(|e| panic!("{name}: unexpected error {e:?}"));
    assert_eq!(actual, expected, "{name}: parsed result");
}

/// `ResponseBody` has no serde form; vectors spell it `{"json": ..}` or `{"text": ..}`.
fn check_body_outcome(name: &str, result: Result<ResponseBody, ApiError>, case: &Value) {
    if case.get("expected_error").is_some() {
        return check_error(name, result, case);
    }
    let expected = &case["expected_result"];
    let expected = match (expected.get("json"), expected["text"].as_str()) {
        (Some(json), _) => ResponseBody::Json(json.clone()),
        (None, Some(text)) => ResponseBody::Text(text.to_string()),
        _ => panic!("{name}: bad expected_result {expected}"),
    };
    let actual = result.unwrap_or_else(|e| panic!("{name}: unexpected error {e:?}"));
    assert_eq!(actual, expected, "{name}: parsed result");
}

fn attachments(case: &Value) -> Vec<AttachmentFile> {
    case["input"]["attachments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| {
            AttachmentFile::new(
                a["filename"].as_str().unwrap(),
                a["content_type"].as_str().unwrap(),
                a["text"].as_str().unwrap().as_bytes().to_vec(),
            )
        })
        .collect()
}

fn run_case(c: &PlunkClient, case: &Value) {
    let name = case["name"].as_str().unwrap();
    let expected_req = &case["expected_request"];
    let response = response_from(&case["simulated_response"]);

    match case["operation"].as_str().unwrap() {
        "track_event" => {
            let event: TrackEvent = input(case);
            let req = c.build_track_event(&event).unwrap();
            check_request(name, &req, expected_req);
            check_outcome::<TrackEventResponse>(name, c.parse_track_event(response), case);
        }
        "send_email" => {
            let raw = &case["input"];
            let mut email = SendEmail::new(
                raw["to"].as_str().unwrap(),
                raw["subject"].as_str().unwrap(),
                raw["body"].as_str().unwrap(),
            );
            email.attachments = attachments(case);
            let req = c.build_send_email(&email).unwrap();
            check_request(name, &req, expected_req);
            check_outcome::<SendEmailResponse>(name, c.parse_send_email(response), case);
        }
        "send_campaign" => {
            let options = SendCampaignOptions {
                live: case["input"]["live"].as_bool(),
                delay: case["input"]["delay"].as_u64().map(|d| d as u32),
            };
            let req = c.build_send_campaign(input_id(case), options).unwrap();
            check_request(name, &req, expected_req);
            check_body_outcome(name, c.parse_send_campaign(response), case);
        }
        "create_campaign" => {
            let campaign: CreateCampaign = input(case);
            let req = c.build_create_campaign(&campaign).unwrap();
            check_request(name, &req, expected_req);
            check_outcome::<Campaign>(name, c.parse_create_campaign(response), case);
        }
        "update_campaign" => {
            let campaign: UpdateCampaign = input(case);
            let req = c.build_update_campaign(input_id(case), &campaign).unwrap();
            check_request(name, &req, expected_req);
            check_outcome::<Campaign>(name, c.parse_update_campaign(response), case);
        }
        "delete_campaign" => {
            let req = c.build_delete_campaign(input_id(case)).unwrap();
            check_request(name, &req, expected_req);
            check_outcome::<Campaign>(name, c.parse_delete_campaign(response), case);
        }
        "get_contact_by_id" => {
            let req = c.build_get_contact_by_id(input_id(case));
            check_request(name, &req, expected_req);
            check_outcome::<ContactDetails>(name, c.parse_get_contact_by_id(response), case);
        }
        "get_all_contacts" => {
            let req = c.build_get_all_contacts();
            check_request(name, &req, expected_req);
            check_outcome::<Vec<Contact>>(name, c.parse_get_all_contacts(response), case);
        }
        "get_number_of_contacts" => {
            let req = c.build_get_number_of_contacts();
            check_request(name, &req, expected_req);
            check_outcome::<ContactCount>(name, c.parse_get_number_of_contacts(response), case);
        }
        "create_contact" => {
            let contact: CreateContact = input(case);
            let req = c.build_create_contact(&contact).unwrap();
            check_request(name, &req, expected_req);
            check_outcome::<ContactResponse>(name, c.parse_create_contact(response), case);
        }
        "subscribe_contact" => {
            let contact: ContactRef = input(case);
            let req = c.build_subscribe_contact(&contact).unwrap();
            check_request(name, &req, expected_req);
            check_outcome::<SubscriptionResponse>(name, c.parse_subscribe_contact(response), case);
        }
        "unsubscribe_contact" => {
            let contact: ContactRef = input(case);
            let req = c.build_unsubscribe_contact(&contact).unwrap();
            check_request(name, &req, expected_req);
            check_outcome::<SubscriptionResponse>(
                name,
                c.parse_unsubscribe_contact(response),
                case,
            );
        }
        "update_contact" => {
            let raw = &case["input"];
            let update = UpdateContact {
                contact: serde_json::from_value(raw["contact"].clone()).unwrap(),
                subscribed: raw["subscribed"].as_bool().unwrap(),
                data: raw["data"].as_object().cloned().unwrap(),
            };
            let req = c.build_update_contact(&update).unwrap();
            check_request(name, &req, expected_req);
            check_outcome::<ContactResponse>(name, c.parse_update_contact(response), case);
        }
        "delete_contact" => {
            let req = c.build_delete_contact(input_id(case)).unwrap();
            check_request(name, &req, expected_req);
            check_outcome::<ContactResponse>(name, c.parse_delete_contact(response), case);
        }
        other => panic!("{name}: unknown operation {other}"),
    }
}

fn run_file(raw: &str) -> usize {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let c = client();
    let cases = vectors["cases"].as_array().unwrap();
    for case in cases {
        run_case(&c, case);
    }
    cases.len()
}

#[test]
fn contact_test_vectors() {
    let count = run_file(include_str!("../../test-vectors/contacts.json"));
    assert!(count > 0);
}

#[test]
fn campaign_test_vectors() {
    let count = run_file(include_str!("../../test-vectors/campaigns.json"));
    assert!(count > 0);
}

#[test]
fn event_and_email_test_vectors() {
    let count = run_file(include_str!("../../test-vectors/events.json"));
    assert!(count > 0);
}
