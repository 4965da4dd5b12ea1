//! The structural JSON Schema for a `SubmissionSnapshot`.

use serde_json::{json, Value};

/// JSON Schema (draft 2020-12) every serialized snapshot must satisfy.
pub fn snapshot_schema() -> Value {
    let statement = json!({
        "type": "object",
        "required": ["rule_id", "text", "provenance"],
        "properties": {
            "rule_id": { "type": "string", "minLength": 1 },
            "text": { "type": "string", "minLength": 1 },
            "provenance": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "required": ["source"],
                    "properties": {
                        "source": { "enum": ["answer", "flag"] }
                    }
                }
            }
        }
    });

    let section = json!({ "type": "array", "items": statement });

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "SubmissionSnapshot",
        "type": "object",
        "required": [
            "session_id", "patient_id", "history", "answers", "flags",
            "summary", "started_at", "completed_at", "submitted_at"
        ],
        "properties": {
            "session_id": { "type": "string", "format": "uuid" },
            "patient_id": { "type": "string", "minLength": 1 },
            "history": {
                "type": "array",
                "minItems": 1,
                "uniqueItems": true,
                "items": { "type": "string", "minLength": 1 }
            },
            "answers": {
                "type": "object",
                "minProperties": 1,
                "additionalProperties": {
                    "type": "object",
                    "required": ["question_id", "value", "recorded_at", "revision"],
                    "properties": {
                        "revision": { "type": "integer", "minimum": 1 }
                    }
                }
            },
            "flags": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["rule_id", "label", "severity", "priority", "triggered_by"],
                    "properties": {
                        "rule_id": { "type": "string", "minLength": 1 },
                        "label": { "type": "string", "minLength": 1 },
                        "severity": { "enum": ["informational", "warning", "critical"] },
                        "priority": { "type": "integer", "minimum": 0 },
                        "triggered_by": { "type": "array", "minItems": 1, "items": { "type": "string" } }
                    }
                }
            },
            "summary": {
                "type": "object",
                "required": ["introduction", "situation", "background", "assessment", "recommendation"],
                "properties": {
                    "introduction": section,
                    "situation": section,
                    "background": section,
                    "assessment": section,
                    "recommendation": section
                }
            },
            "started_at": { "type": "string" },
            "completed_at": { "type": "string" },
            "submitted_at": { "type": "string" }
        }
    })
}
