//! Narrow interfaces to the collaborators the core relies on but does not
//! implement: HTTP transport, session, translation, notifications and the
//! drag-and-drop host.
//!
//! ## Learning: Traits at the Seams
//!
//! The core never talks to the network or the screen directly. Hosts hand
//! in trait objects, and tests hand in small fakes.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::draft::{CategoryRef, InstructorRef};
use crate::validation::ValidationError;

/// A reorder gesture reported by the drag-and-drop host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragMove {
    pub source_index: usize,
    pub destination_index: usize,
}

impl DragMove {
    pub fn new(source_index: usize, destination_index: usize) -> Self {
        Self {
            source_index,
            destination_index,
        }
    }
}

/// HTTP verb of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Static description of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestConfig {
    pub method: Method,
    pub path: &'static str,
}

impl RequestConfig {
    pub const CATEGORIES: RequestConfig = RequestConfig {
        method: Method::Get,
        path: "categories",
    };

    pub const INSTRUCTORS: RequestConfig = RequestConfig {
        method: Method::Get,
        path: "instructors",
    };

    pub const ENRICHMENT: RequestConfig = RequestConfig {
        method: Method::Post,
        path: "enrichment",
    };
}

/// What the transport hands back.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub response: Value,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP transport. Authentication, retries and timeouts belong to the
/// implementation.
pub trait HttpClient {
    fn request(
        &self,
        config: &RequestConfig,
        params: Option<&Value>,
        body: Option<&Value>,
    ) -> anyhow::Result<HttpResponse>;
}

/// Authenticated session. Both values are opaque to the core.
pub trait SessionProvider {
    fn token(&self) -> Option<&str>;
    fn user(&self) -> Option<&Value>;
}

/// Resolves translation keys to localized text.
pub trait Translator {
    fn translate(&self, key: &str) -> Option<String>;
}

/// Toasts and similar user-facing notifications.
pub trait Notifier {
    fn success(&self, message: &str);
    fn failure(&self, title: &str, details: &[String]);
}

/// Shows every issue of a validation error through the notifier.
///
/// Issue messages are looked up by their code's key and fall back to the
/// built-in English message.
pub fn notify_validation(notifier: &dyn Notifier, translator: &dyn Translator, err: &ValidationError) {
    let title = translator
        .translate("validation.title")
        .unwrap_or_else(|| "Please fix the following".to_string());

    let details: Vec<String> = err
        .issues()
        .iter()
        .map(|issue| {
            let message = translator
                .translate(issue.code.key())
                .unwrap_or_else(|| issue.message.clone());
            format!("{}: {}", issue.path, message)
        })
        .collect();

    notifier.failure(&title, &details);
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    id: Value,
    name: String,
}

impl CatalogEntry {
    fn id_string(&self) -> String {
        match &self.id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Categories and instructors offered by the wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub categories: Vec<CategoryRef>,
    pub instructors: Vec<InstructorRef>,
}

impl Catalog {
    /// Fetches both lists.
    pub fn load(client: &dyn HttpClient) -> anyhow::Result<Self> {
        let categories = fetch_entries(client, &RequestConfig::CATEGORIES)?
            .into_iter()
            .map(|entry| CategoryRef::new(entry.id_string(), entry.name))
            .collect();
        let instructors = fetch_entries(client, &RequestConfig::INSTRUCTORS)?
            .into_iter()
            .map(|entry| InstructorRef::new(entry.id_string(), entry.name))
            .collect();

        tracing::debug!("Loaded catalog");
        Ok(Self {
            categories,
            instructors,
        })
    }

    pub fn category(&self, id: &str) -> Option<&CategoryRef> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn instructor(&self, id: &str) -> Option<&InstructorRef> {
        self.instructors.iter().find(|i| i.id == id)
    }
}

fn fetch_entries(client: &dyn HttpClient, config: &RequestConfig) -> anyhow::Result<Vec<CatalogEntry>> {
    let response = client
        .request(config, None, None)
        .with_context(|| format!("failed to request {}", config.path))?;

    if !response.is_success() {
        anyhow::bail!("{} returned status {}", config.path, response.status);
    }

    // Lists come either bare or wrapped in `data`
    let list = response
        .response
        .get("data")
        .cloned()
        .unwrap_or(response.response);

    serde_json::from_value(list).with_context(|| format!("malformed {} payload", config.path))
}

/// Asks the enrichment service to draft text for `prompt`.
///
/// The result is meant to be fed back through `Action::SetDescription`.
pub fn request_enrichment(client: &dyn HttpClient, prompt: &str) -> anyhow::Result<String> {
    let body = json!({ "prompt": prompt });
    let response = client
        .request(&RequestConfig::ENRICHMENT, None, Some(&body))
        .context("failed to request enrichment")?;

    if !response.is_success() {
        anyhow::bail!("enrichment returned status {}", response.status);
    }

    response
        .response
        .get("text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .context("enrichment response has no text")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::IssueCode;
    use std::cell::RefCell;

    struct FakeClient;

    impl HttpClient for FakeClient {
        fn request(
            &self,
            config: &RequestConfig,
            _params: Option<&Value>,
            body: Option<&Value>,
        ) -> anyhow::Result<HttpResponse> {
            let response = match config.path {
                "categories" => json!({ "data": [{ "id": 1, "name": "Languages" }] }),
                "instructors" => json!([{ "id": "ada", "name": "Ada" }]),
                "enrichment" => {
                    let prompt = body.and_then(|b| b["prompt"].as_str()).unwrap_or_default();
                    json!({ "text": format!("About {prompt}") })
                }
                _ => return Ok(HttpResponse { status: 404, response: Value::Null }),
            };
            Ok(HttpResponse {
                status: 200,
                response,
            })
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        failures: RefCell<Vec<(String, Vec<String>)>>,
    }

    impl Notifier for RecordingNotifier {
        fn success(&self, _message: &str) {}

        fn failure(&self, title: &str, details: &[String]) {
            self.failures
                .borrow_mut()
                .push((title.to_string(), details.to_vec()));
        }
    }

    struct SpanishTranslator;

    impl Translator for SpanishTranslator {
        fn translate(&self, key: &str) -> Option<String> {
            match key {
                "validation.too_big" => Some("valor demasiado grande".to_string()),
                _ => None,
            }
        }
    }

    #[test]
    fn test_catalog_load() {
        let catalog = Catalog::load(&FakeClient).unwrap();
        assert_eq!(catalog.category("1").unwrap().name, "Languages");
        assert_eq!(catalog.instructor("ada").unwrap().name, "Ada");
    }

    #[test]
    fn test_enrichment_text() {
        let text = request_enrichment(&FakeClient, "French").unwrap();
        assert_eq!(text, "About French");
    }

    #[test]
    fn test_notify_validation_translates_known_keys() {
        let notifier = RecordingNotifier::default();
        let err = ValidationError::single("correct", IssueCode::TooBig, "must be less than 1");

        notify_validation(&notifier, &SpanishTranslator, &err);

        let failures = notifier.failures.borrow();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "Please fix the following");
        assert_eq!(failures[0].1, vec!["correct: valor demasiado grande".to_string()]);
    }

    #[test]
    fn test_drag_move_wire_shape() {
        let drag: DragMove =
            serde_json::from_str(r#"{"sourceIndex":1,"destinationIndex":0}"#).unwrap();
        assert_eq!(drag, DragMove::new(1, 0));
    }
}
