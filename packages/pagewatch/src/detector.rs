//! Run-over-run change detection.
//!
//! The comparison is delegated to a semantic classifier rather than a
//! textual diff: the upstream extraction step may paraphrase or
//! reformat text between runs, so string equality would flag a change
//! on every run. The detector owns the policy around the classifier's
//! verdict and validates its shape at the boundary.

use crate::error::{Result, WatchError};
use crate::types::{ChangeRecord, ExtractionResult, Verdict, NEW_ENTRY_TITLE, UPDATED_TITLE};
use async_trait::async_trait;
use openai_client::{OpenAIClient, StructuredRequest};
use serde_json::Value;
use tracing::debug;

/// Trait for change classification clients (to allow mocking).
///
/// Returns the raw structured response; the detector validates it.
#[async_trait]
pub trait ChangeClassifier: Send + Sync {
    async fn classify(&self, previous: &str, current: &str, topic: &str) -> Result<Value>;
}

/// Compare the current extraction against the previous snapshot entry
/// for the same URL.
///
/// - No previous entry: always a change, fixed "new entry" title, the
///   classifier is not consulted.
/// - Previous entry: the classifier's verdict decides. A verdict that
///   does not validate is a service failure, never "unchanged".
pub async fn detect(
    previous: Option<&ExtractionResult>,
    current: &ExtractionResult,
    classifier: &dyn ChangeClassifier,
) -> Result<Option<ChangeRecord>> {
    let Some(previous) = previous else {
        debug!(url = %current.url, "No previous snapshot entry, classifying as new");
        return Ok(Some(ChangeRecord {
            url: current.url.clone(),
            topic: current.topic.clone(),
            title: NEW_ENTRY_TITLE.to_string(),
        }));
    };

    let raw = classifier
        .classify(&previous.text, &current.text, &current.topic)
        .await?;
    let verdict = parse_verdict(&raw)?;

    debug!(
        url = %current.url,
        changed = verdict.changed,
        "Classifier verdict"
    );

    if !verdict.changed {
        return Ok(None);
    }

    let title = verdict
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| UPDATED_TITLE.to_string());

    Ok(Some(ChangeRecord {
        url: current.url.clone(),
        topic: current.topic.clone(),
        title,
    }))
}

/// Validate a raw classifier response against the verdict shape.
///
/// `changed` must be a boolean or a boolean-like string; `title` must
/// be a string when present (null counts as absent). Anything else is
/// a malformed verdict.
pub fn parse_verdict(raw: &Value) -> Result<Verdict> {
    let obj = raw
        .as_object()
        .ok_or_else(|| WatchError::MalformedVerdict(format!("expected object, got {raw}")))?;

    let changed = match obj.get("changed") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => match s.to_ascii_lowercase().as_str() {
            "true" => true,
            "false" => false,
            other => {
                return Err(WatchError::MalformedVerdict(format!(
                    "changed flag is not boolean-like: {other:?}"
                )))
            }
        },
        Some(other) => {
            return Err(WatchError::MalformedVerdict(format!(
                "changed flag is not boolean-like: {other}"
            )))
        }
        None => {
            return Err(WatchError::MalformedVerdict(
                "missing changed flag".to_string(),
            ))
        }
    };

    let title = match obj.get("title") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            return Err(WatchError::MalformedVerdict(format!(
                "title is not a string: {other}"
            )))
        }
    };

    Ok(Verdict { changed, title })
}

/// Production classifier backed by the OpenAI structured-output API.
pub struct OpenAiClassifier {
    client: OpenAIClient,
    model: String,
}

impl OpenAiClassifier {
    pub fn new(client: OpenAIClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    fn verdict_schema() -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "changed": { "type": "boolean" },
                "title": { "type": "string" }
            },
            "required": ["changed", "title"],
            "additionalProperties": false
        })
    }
}

#[async_trait]
impl ChangeClassifier for OpenAiClassifier {
    async fn classify(&self, previous: &str, current: &str, topic: &str) -> Result<Value> {
        let system = format!(
            "You compare two versions of extracted text about {topic}. \
             Decide whether the current version contains materially new or \
             changed information compared to the previous one. Paraphrasing \
             and reformatting alone is not a change. Respond with a short \
             title summarizing the change when there is one."
        );
        let user = format!("Previous version:\n{previous}\n\nCurrent version:\n{current}");

        let request = StructuredRequest::new(&self.model, system, user, Self::verdict_schema());
        let response = self.client.structured_output(request).await?;

        serde_json::from_str(openai_client::strip_code_blocks(&response))
            .map_err(|e| WatchError::MalformedVerdict(format!("verdict is not JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct StubClassifier {
        response: Value,
    }

    #[async_trait]
    impl ChangeClassifier for StubClassifier {
        async fn classify(&self, _previous: &str, _current: &str, _topic: &str) -> Result<Value> {
            Ok(self.response.clone())
        }
    }

    /// Classifier that fails the test if it is ever consulted.
    struct PanicClassifier;

    #[async_trait]
    impl ChangeClassifier for PanicClassifier {
        async fn classify(&self, _previous: &str, _current: &str, _topic: &str) -> Result<Value> {
            panic!("classifier must not be consulted for new URLs");
        }
    }

    fn extraction(text: &str) -> ExtractionResult {
        ExtractionResult::new("https://a.test", "trains", text)
    }

    #[tokio::test]
    async fn test_new_url_always_emits_new_entry() {
        let record = detect(None, &extraction("anything"), &PanicClassifier)
            .await
            .unwrap()
            .expect("new URL must produce a change record");

        assert_eq!(record.url, "https://a.test");
        assert_eq!(record.topic, "trains");
        assert_eq!(record.title, NEW_ENTRY_TITLE);
    }

    #[tokio::test]
    async fn test_unchanged_verdict_emits_nothing() {
        let classifier = StubClassifier {
            response: json!({"changed": false, "title": "ignored"}),
        };
        let record = detect(Some(&extraction("old")), &extraction("new"), &classifier)
            .await
            .unwrap();
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn test_changed_verdict_uses_supplied_title() {
        let classifier = StubClassifier {
            response: json!({"changed": true, "title": "summer schedule added"}),
        };
        let record = detect(Some(&extraction("old")), &extraction("new"), &classifier)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.title, "summer schedule added");
    }

    #[tokio::test]
    async fn test_changed_verdict_without_title_falls_back() {
        for response in [
            json!({"changed": true}),
            json!({"changed": true, "title": null}),
            json!({"changed": true, "title": "   "}),
        ] {
            let classifier = StubClassifier { response };
            let record = detect(Some(&extraction("old")), &extraction("new"), &classifier)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(record.title, UPDATED_TITLE);
        }
    }

    #[tokio::test]
    async fn test_boolean_like_strings_accepted() {
        let classifier = StubClassifier {
            response: json!({"changed": "true", "title": "new dates"}),
        };
        let record = detect(Some(&extraction("old")), &extraction("new"), &classifier)
            .await
            .unwrap();
        assert!(record.is_some());

        let classifier = StubClassifier {
            response: json!({"changed": "False"}),
        };
        let record = detect(Some(&extraction("old")), &extraction("new"), &classifier)
            .await
            .unwrap();
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn test_malformed_verdicts_are_errors_not_unchanged() {
        for response in [
            json!("not an object"),
            json!({"changed": "maybe"}),
            json!({"changed": 1}),
            json!({"title": "missing flag"}),
            json!({"changed": true, "title": 42}),
        ] {
            let classifier = StubClassifier { response };
            let result = detect(Some(&extraction("old")), &extraction("new"), &classifier).await;
            assert!(
                matches!(result, Err(WatchError::MalformedVerdict(_))),
                "expected malformed verdict error"
            );
        }
    }

    #[tokio::test]
    async fn test_detection_is_idempotent() {
        let previous = extraction("old");
        let current = extraction("new");
        let classifier = StubClassifier {
            response: json!({"changed": true, "title": "dates moved"}),
        };

        let first = detect(Some(&previous), &current, &classifier).await.unwrap();
        let second = detect(Some(&previous), &current, &classifier).await.unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_verdict_schema_shape() {
        let schema = OpenAiClassifier::verdict_schema();
        assert_eq!(schema["properties"]["changed"]["type"], "boolean");
        assert_eq!(schema["additionalProperties"], false);
    }
}
