//! Canonical text form of an exercise node.
//!
//! The text mode of the Playground edits this JSON shape:
//!
//! ```text
//! {
//!   "question": "Capital of France?",
//!   "correct": 0,
//!   "answers": [
//!     { "id": "a", "value": "Paris" }
//!   ]
//! }
//! ```
//!
//! ## Learning: Derive for Output, Hand-check for Input
//!
//! Output goes through `#[derive(Serialize)]` on a borrowed view, so field
//! order is fixed by the struct definition. Input is checked by walking a
//! `serde_json::Value` by hand: `#[derive(Deserialize)]` would stop at the
//! first bad field, and we want every problem reported.

use coursekit_exercise::{AnswerItem, ExerciseNode, NodePatch};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::validation::{IssueCode, Issues, ValidationError};

#[derive(Serialize)]
struct CanonicalExercise<'a> {
    question: &'a str,
    correct: Option<usize>,
    answers: Vec<CanonicalAnswer<'a>>,
}

#[derive(Serialize)]
struct CanonicalAnswer<'a> {
    id: &'a str,
    value: &'a str,
}

/// Converts nodes to and from their text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Serializer {
    indent: usize,
}

impl Serializer {
    /// Creates a serializer indenting with `indent` spaces.
    pub fn new(indent: usize) -> Self {
        Self { indent }
    }

    /// Renders `{question, correct, answers}` as pretty-printed JSON.
    ///
    /// Output depends only on those three fields.
    pub fn to_text(&self, node: &ExerciseNode) -> Result<String, serde_json::Error> {
        let view = CanonicalExercise {
            question: node.question(),
            correct: node.correct(),
            answers: node
                .answers()
                .iter()
                .map(|item| CanonicalAnswer {
                    id: &item.id,
                    value: &item.value,
                })
                .collect(),
        };

        let indent = " ".repeat(self.indent);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        view.serialize(&mut ser)?;

        String::from_utf8(buf).map_err(<serde_json::Error as serde::ser::Error>::custom)
    }

    /// Parses and validates text, returning the patch to apply.
    ///
    /// Nothing is returned unless every constraint holds.
    pub fn from_text(&self, text: &str) -> Result<NodePatch, ValidationError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| ValidationError::single("$", IssueCode::Parse, e.to_string()))?;

        let Some(object) = value.as_object() else {
            return Err(ValidationError::single(
                "$",
                IssueCode::InvalidType,
                "expected an object",
            ));
        };

        let mut issues = Issues::new();
        let question = read_question(object, &mut issues);
        let correct = read_correct(object, &mut issues);
        let answers = read_answers(object, &mut issues);

        // The bound uses the raw array length so it is checked even when
        // individual entries are malformed
        let answer_count = object.get("answers").and_then(Value::as_array).map(Vec::len);
        if let (Some(correct), Some(len)) = (correct, answer_count) {
            if correct >= len {
                issues.push(
                    "correct",
                    IssueCode::TooBig,
                    format!("must be less than the number of answers ({len})"),
                );
            }
        }

        issues.finish()?;

        // finish() succeeded, so every reader produced a value
        match (question, correct, answers) {
            (Some(question), Some(correct), Some(answers)) => Ok(NodePatch::new()
                .question(question)
                .answers(answers)
                .correct(Some(correct))),
            _ => Err(ValidationError::single(
                "$",
                IssueCode::Parse,
                "incomplete exercise",
            )),
        }
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new(2)
    }
}

/// Renders a node with the default serializer.
pub fn to_text(node: &ExerciseNode) -> Result<String, serde_json::Error> {
    Serializer::default().to_text(node)
}

/// Parses text with the default serializer.
pub fn from_text(text: &str) -> Result<NodePatch, ValidationError> {
    Serializer::default().from_text(text)
}

fn read_question(object: &Map<String, Value>, issues: &mut Issues) -> Option<String> {
    match object.get("question") {
        Some(Value::String(question)) => Some(question.clone()),
        None | Some(Value::Null) => {
            issues.push("question", IssueCode::Required, "is required");
            None
        }
        Some(_) => {
            issues.push("question", IssueCode::InvalidType, "expected a string");
            None
        }
    }
}

fn read_correct(object: &Map<String, Value>, issues: &mut Issues) -> Option<usize> {
    match object.get("correct") {
        Some(Value::Number(n)) => {
            let index = n.as_u64().and_then(|k| usize::try_from(k).ok());
            if index.is_none() {
                issues.push(
                    "correct",
                    IssueCode::InvalidType,
                    "expected a non-negative integer",
                );
            }
            index
        }
        None | Some(Value::Null) => {
            issues.push("correct", IssueCode::Required, "is required");
            None
        }
        Some(_) => {
            issues.push("correct", IssueCode::InvalidType, "expected a number");
            None
        }
    }
}

fn read_answers(object: &Map<String, Value>, issues: &mut Issues) -> Option<Vec<AnswerItem>> {
    let entries = match object.get("answers") {
        Some(Value::Array(entries)) => entries,
        None | Some(Value::Null) => {
            issues.push("answers", IssueCode::Required, "is required");
            return None;
        }
        Some(_) => {
            issues.push("answers", IssueCode::InvalidType, "expected an array");
            return None;
        }
    };

    let mut items = Vec::with_capacity(entries.len());
    let mut seen = HashSet::new();
    let mut valid = true;

    for (i, entry) in entries.iter().enumerate() {
        let Some(fields) = entry.as_object() else {
            issues.push(
                format!("answers.{i}"),
                IssueCode::InvalidType,
                "expected an object",
            );
            valid = false;
            continue;
        };

        // `uuid` is accepted for answers exported by older editors
        let id = match fields.get("id").or_else(|| fields.get("uuid")) {
            Some(Value::String(id)) => Some(id.clone()),
            None | Some(Value::Null) => {
                issues.push(format!("answers.{i}.id"), IssueCode::Required, "is required");
                None
            }
            Some(_) => {
                issues.push(
                    format!("answers.{i}.id"),
                    IssueCode::InvalidType,
                    "expected a string",
                );
                None
            }
        };

        let value = match fields.get("value") {
            Some(Value::String(value)) => Some(value.clone()),
            None | Some(Value::Null) => {
                issues.push(
                    format!("answers.{i}.value"),
                    IssueCode::Required,
                    "is required",
                );
                None
            }
            Some(_) => {
                issues.push(
                    format!("answers.{i}.value"),
                    IssueCode::InvalidType,
                    "expected a string",
                );
                None
            }
        };

        match (id, value) {
            (Some(id), Some(value)) => {
                if !seen.insert(id.clone()) {
                    issues.push(
                        format!("answers.{i}.id"),
                        IssueCode::Duplicate,
                        format!("duplicate answer id '{id}'"),
                    );
                    valid = false;
                }
                items.push(AnswerItem::with_id(id, value));
            }
            _ => valid = false,
        }
    }

    valid.then_some(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursekit_exercise::{ExerciseCollection, ExerciseKind};
    use proptest::prelude::*;

    fn sample_node(question: &str, answers: Vec<AnswerItem>, correct: Option<usize>) -> ExerciseNode {
        let mut collection = ExerciseCollection::new();
        let id = collection.add_node(ExerciseKind::SimpleSelection);
        collection
            .update_node(
                id,
                NodePatch::new()
                    .question(question)
                    .answers(answers)
                    .correct(correct),
            )
            .unwrap()
            .clone()
    }

    #[test]
    fn test_to_text_is_canonical() {
        let node = sample_node(
            "Capital of France?",
            vec![AnswerItem::with_id("a", "Paris")],
            Some(0),
        );
        let text = to_text(&node).unwrap();
        assert_eq!(
            text,
            "{\n  \"question\": \"Capital of France?\",\n  \"correct\": 0,\n  \"answers\": [\n    {\n      \"id\": \"a\",\n      \"value\": \"Paris\"\n    }\n  ]\n}"
        );
        assert_eq!(to_text(&node).unwrap(), text);
    }

    #[test]
    fn test_custom_indent() {
        let node = sample_node("q", vec![], None);
        let text = Serializer::new(4).to_text(&node).unwrap();
        assert!(text.contains("\n    \"question\""));
        assert!(text.contains("\"correct\": null"));
    }

    #[test]
    fn test_correct_out_of_range_is_reported() {
        let err = from_text(
            r#"{"question":"Capital of France?","correct":5,"answers":[{"id":"a","value":"Paris"}]}"#,
        )
        .unwrap_err();
        assert!(err.mentions("correct"));
        assert_eq!(err.issues()[0].code, IssueCode::TooBig);
    }

    #[test]
    fn test_every_violation_is_listed() {
        let err = from_text(r#"{"question":3,"answers":[{"id":"a"},{"value":7}]}"#).unwrap_err();
        let paths: Vec<&str> = err.issues().iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "question",
                "correct",
                "answers.0.value",
                "answers.1.id",
                "answers.1.value"
            ]
        );
    }

    #[test]
    fn test_parse_failure() {
        let err = from_text("{ not json").unwrap_err();
        assert!(err.mentions("$"));
        assert_eq!(err.issues()[0].code, IssueCode::Parse);

        let err = from_text("[]").unwrap_err();
        assert_eq!(err.issues()[0].code, IssueCode::InvalidType);
    }

    #[test]
    fn test_negative_and_fractional_correct() {
        for text in [
            r#"{"question":"q","correct":-1,"answers":[]}"#,
            r#"{"question":"q","correct":0.5,"answers":[]}"#,
        ] {
            let err = from_text(text).unwrap_err();
            assert!(err.mentions("correct"));
            assert_eq!(err.issues()[0].code, IssueCode::InvalidType);
        }
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = from_text(
            r#"{"question":"q","correct":0,"answers":[{"id":"a","value":"x"},{"id":"a","value":"y"}]}"#,
        )
        .unwrap_err();
        assert!(err.mentions("answers.1.id"));
        assert_eq!(err.issues()[0].code, IssueCode::Duplicate);
    }

    #[test]
    fn test_uuid_alias_accepted() {
        let patch = from_text(r#"{"question":"q","correct":0,"answers":[{"uuid":"a","value":"x"}]}"#)
            .unwrap();
        assert_eq!(patch.answers.unwrap()[0].id, "a");
    }

    fn answers_strategy() -> impl Strategy<Value = (Vec<AnswerItem>, usize)> {
        proptest::collection::vec(".*", 1..6).prop_flat_map(|values| {
            let len = values.len();
            let items: Vec<AnswerItem> = values
                .into_iter()
                .enumerate()
                .map(|(i, value)| AnswerItem::with_id(format!("answer-{i}"), value))
                .collect();
            (Just(items), 0..len)
        })
    }

    proptest! {
        #[test]
        fn text_round_trip(question in ".*", (answers, correct) in answers_strategy()) {
            let node = sample_node(&question, answers, Some(correct));
            let text = to_text(&node).unwrap();
            let patch = from_text(&text).unwrap();

            prop_assert_eq!(patch.question.as_deref(), Some(node.question()));
            prop_assert_eq!(patch.correct, Some(node.correct()));
            prop_assert_eq!(patch.answers.as_deref(), Some(node.answers().items()));
        }
    }
}
