use crate::error::CostError;
use crate::models::UsageBatch;
use serde_json::Value;

/// Input/output carrier for an estimation call. The variant doubles as the
/// shape detection step: callers hand over either serialized JSON text or an
/// already-structured object, and get the same variant back.
#[derive(Debug, Clone)]
pub enum Payload {
    Text(String),
    Object(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    Text,
    Object,
}

impl From<String> for Payload {
    fn from(raw: String) -> Self {
        Payload::Text(raw)
    }
}

impl From<&str> for Payload {
    fn from(raw: &str) -> Self {
        Payload::Text(raw.to_string())
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Object(value)
    }
}

impl Payload {
    pub fn shape(&self) -> PayloadShape {
        match self {
            Payload::Text(_) => PayloadShape::Text,
            Payload::Object(_) => PayloadShape::Object,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(raw) => Some(raw),
            Payload::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&Value> {
        match self {
            Payload::Text(_) => None,
            Payload::Object(value) => Some(value),
        }
    }
}

pub fn parse(payload: &Payload) -> Result<(UsageBatch, PayloadShape), CostError> {
    match payload {
        Payload::Text(raw) => {
            let batch = serde_json::from_str(raw).map_err(|e| {
                CostError::PayloadFormat(format!("payload is not a well-formed usage batch: {e}"))
            })?;
            Ok((batch, PayloadShape::Text))
        }
        Payload::Object(value) => {
            let batch = serde_json::from_value(value.clone()).map_err(|e| {
                CostError::PayloadFormat(format!("payload is not a well-formed usage batch: {e}"))
            })?;
            Ok((batch, PayloadShape::Object))
        }
    }
}

pub fn render(batch: &UsageBatch, shape: PayloadShape) -> Result<Payload, CostError> {
    match shape {
        PayloadShape::Text => {
            let raw = serde_json::to_string(batch)
                .map_err(|e| CostError::PayloadFormat(format!("cannot serialize batch: {e}")))?;
            Ok(Payload::Text(raw))
        }
        PayloadShape::Object => {
            let value = serde_json::to_value(batch)
                .map_err(|e| CostError::PayloadFormat(format!("cannot serialize batch: {e}")))?;
            Ok(Payload::Object(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_detects_text_and_object_shapes() {
        let text = Payload::from(r#"{"ai_usage": []}"#);
        let (_, shape) = parse(&text).expect("text payload parses");
        assert_eq!(shape, PayloadShape::Text);

        let object = Payload::from(json!({ "ai_usage": [] }));
        let (_, shape) = parse(&object).expect("object payload parses");
        assert_eq!(shape, PayloadShape::Object);
    }

    #[test]
    fn parse_rejects_malformed_text() {
        let err = parse(&Payload::from("{not json")).expect_err("expected parse failure");
        assert!(matches!(err, CostError::PayloadFormat(_)));
    }

    #[test]
    fn parse_rejects_missing_or_non_sequence_batch_key() {
        let err = parse(&Payload::from(json!({ "usage": [] }))).expect_err("missing key");
        assert!(matches!(err, CostError::PayloadFormat(_)));

        let err = parse(&Payload::from(json!({ "ai_usage": {"model": "x"} })))
            .expect_err("non-sequence batch");
        assert!(matches!(err, CostError::PayloadFormat(_)));
    }

    #[test]
    fn render_returns_the_shape_it_was_asked_for() {
        let (batch, _) = parse(&Payload::from(json!({ "ai_usage": [], "run_id": 7 })))
            .expect("batch parses");

        let text = render(&batch, PayloadShape::Text).expect("render text");
        assert!(text.as_text().is_some());

        let object = render(&batch, PayloadShape::Object).expect("render object");
        assert_eq!(object.as_object().expect("object")["run_id"], json!(7));
    }
}
