use serde::{Deserialize, Deserializer};
use std::fmt;

pub const SESSION_NAME_PREFIX: &str = "Chat Session about ";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub i64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who produced a message. The server sends `"USER"` for the human side; every
/// other value is rendered as the assistant.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MessageAction {
    User,
    #[default]
    Ai,
}

impl MessageAction {
    pub fn from_wire(value: &str) -> Self {
        if value == "USER" { Self::User } else { Self::Ai }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Ai => "AI",
        }
    }
}

impl<'de> Deserialize<'de> for MessageAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value
            .as_deref()
            .map(Self::from_wire)
            .unwrap_or_default())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct Message {
    pub id: i64,
    #[serde(default)]
    pub action: MessageAction,
    #[serde(default)]
    pub content: String,
    pub timestamp: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    pub messages: Vec<Message>,
}

/// One page of the `chat_sessions` endpoint.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct SessionsPage {
    pub chat_sessions: Vec<Session>,
    pub pages: u32,
}

/// A session as shown in the list: display name, age label and avatar are
/// computed once when the page arrives.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListedSession {
    pub id: SessionId,
    pub name: String,
    pub messages: Vec<Message>,
    pub latest_message_age: String,
    pub image: String,
}

pub fn display_session_name(name: &str) -> String {
    name.replacen(SESSION_NAME_PREFIX, "", 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_drops_prefix() {
        assert_eq!(display_session_name("Chat Session about Refunds"), "Refunds");
        assert_eq!(display_session_name("Refunds"), "Refunds");
    }

    #[test]
    fn unknown_actions_are_treated_as_ai() {
        let json = r#"[
            {"id": 1, "action": "USER", "content": "hi", "timestamp": "2024-01-01T10:00:00Z"},
            {"id": 2, "action": "BOT", "content": "hello", "timestamp": "2024-01-01T10:01:00Z"},
            {"id": 3, "timestamp": "2024-01-01T10:02:00Z"}
        ]"#;
        let messages: Vec<Message> = serde_json::from_str(json).expect("parse");
        assert_eq!(messages[0].action, MessageAction::User);
        assert_eq!(messages[1].action, MessageAction::Ai);
        assert_eq!(messages[2].action, MessageAction::Ai);
        assert_eq!(messages[2].content, "");
    }

    #[test]
    fn sessions_page_requires_pages_field() {
        let missing = r#"{"chat_sessions": []}"#;
        assert!(serde_json::from_str::<SessionsPage>(missing).is_err());

        let ok = r#"{"chat_sessions": [{"id": 0, "name": "x", "messages": []}], "pages": 2}"#;
        let page: SessionsPage = serde_json::from_str(ok).expect("parse");
        assert_eq!(page.pages, 2);
        assert_eq!(page.chat_sessions[0].id, SessionId(0));
    }
}
