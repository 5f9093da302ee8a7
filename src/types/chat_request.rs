use serde::{Deserialize, Serialize};

/// Reply text substituted when the service answers without one.
pub const EMPTY_REPLY_TEXT: &str = "The tutor sent an empty response.";

/// Body of `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    /// The text the user submitted.
    pub content: String,

    /// Label identifying the caller to the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ChatRequest {
    /// Creates a new request with no user label.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            user_id: None,
        }
    }

    /// Creates a new request carrying the given user label.
    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }
}

/// Body returned by `POST /chat`.
///
/// Every field is optional so that unexpected shapes still parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    /// The tutor's full reply.
    #[serde(default)]
    pub full_response: Option<String>,
}

/// The tutor's answer to one chat request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    /// Reply text.
    pub content: String,

    /// True when the service sent no usable reply and [`EMPTY_REPLY_TEXT`]
    /// was substituted.
    pub placeholder: bool,
}

impl AssistantReply {
    /// A reply carrying text from the service.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            placeholder: false,
        }
    }

    /// The stand-in reply used when the service sent nothing usable.
    pub fn empty() -> Self {
        Self {
            content: EMPTY_REPLY_TEXT.to_string(),
            placeholder: true,
        }
    }
}

impl From<ChatResponse> for AssistantReply {
    fn from(response: ChatResponse) -> Self {
        match response.full_response {
            Some(content) => AssistantReply::new(content),
            None => AssistantReply::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_without_user_id() {
        let request = ChatRequest::new("2+2");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, json!({"content": "2+2"}));
    }

    #[test]
    fn request_with_user_id() {
        let request = ChatRequest::new("hi").with_user_id(Some("student".to_string()));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, json!({"content": "hi", "user_id": "student"}));
    }

    #[test]
    fn response_tolerates_other_shapes() {
        let response: ChatResponse =
            serde_json::from_value(json!({"answer": "4", "extra": [1, 2]})).unwrap();
        assert_eq!(AssistantReply::from(response), AssistantReply::empty());

        let response: ChatResponse =
            serde_json::from_value(json!({"full_response": null})).unwrap();
        assert!(AssistantReply::from(response).placeholder);
    }

    #[test]
    fn response_with_reply() {
        let response: ChatResponse =
            serde_json::from_value(json!({"full_response": "4"})).unwrap();
        assert_eq!(AssistantReply::from(response), AssistantReply::new("4"));
    }
}
