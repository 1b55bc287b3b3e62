use serde::{Deserialize, Serialize};

/// A single inbound question from a chat user or API caller.
///
/// On the wire the text travels as `message`, matching the `/api/ask` body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    pub user_id: i64,

    #[serde(rename = "message")]
    pub text: String,

    #[serde(default)]
    pub provider_id: Option<i64>,
}

impl Question {
    pub fn new(user_id: i64, text: impl Into<String>, provider_id: Option<i64>) -> Self {
        Self {
            user_id,
            text: text.into(),
            provider_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_null_and_missing_provider() {
        let q: Question =
            serde_json::from_str(r#"{"user_id": 7, "message": "hi", "provider_id": null}"#)
                .unwrap();
        assert_eq!(q, Question::new(7, "hi", None));

        let q: Question = serde_json::from_str(r#"{"user_id": 7, "message": "hi"}"#).unwrap();
        assert_eq!(q.provider_id, None);

        let q: Question =
            serde_json::from_str(r#"{"user_id": 7, "message": "hi", "provider_id": 42}"#)
                .unwrap();
        assert_eq!(q.provider_id, Some(42));
    }
}
