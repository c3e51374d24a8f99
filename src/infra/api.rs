use crate::domain::{Session, SessionId, SessionsPage};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Page size used by the session list.
pub const LIST_PAGE_SIZE: u32 = 9;
/// Page size used when looking a single session up by id.
pub const DETAIL_LOOKUP_PAGE_SIZE: u32 = 500;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum FetchSessionsError {
    #[error("failed to reach sessions endpoint: {0}")]
    Network(String),

    #[error("sessions endpoint returned HTTP {0}")]
    Status(u16),

    #[error("malformed sessions response: {0}")]
    Malformed(String),
}

/// Read access to the remote `chat_sessions` collection.
pub trait SessionsApi: Send + Sync {
    fn fetch_page(&self, page: u32, per_page: u32) -> Result<SessionsPage, FetchSessionsError>;

    /// Sessions of one page without the page count. Only `chat_sessions` has
    /// to be present.
    fn fetch_sessions(&self, page: u32, per_page: u32) -> Result<Vec<Session>, FetchSessionsError> {
        self.fetch_page(page, per_page).map(|page| page.chat_sessions)
    }

    /// The endpoint has no by-id route, so the default scans the first
    /// [`DETAIL_LOOKUP_PAGE_SIZE`] sessions. Backends with a real lookup should
    /// override this.
    fn find_session(&self, id: SessionId) -> Result<Option<Session>, FetchSessionsError> {
        let sessions = self.fetch_sessions(1, DETAIL_LOOKUP_PAGE_SIZE)?;
        Ok(sessions.into_iter().find(|session| session.id == id))
    }
}

#[derive(Deserialize)]
struct SessionBatch {
    chat_sessions: Vec<Session>,
}

#[derive(Clone, Debug)]
pub struct HttpSessionsApi {
    agent: ureq::Agent,
    endpoint: String,
}

impl HttpSessionsApi {
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            agent: make_agent(timeout),
            endpoint: endpoint.into(),
        }
    }
}

impl HttpSessionsApi {
    fn get_body(&self, page: u32, per_page: u32) -> Result<String, FetchSessionsError> {
        tracing::debug!(endpoint = %self.endpoint, page, per_page, "fetching chat sessions");

        let mut response = self
            .agent
            .get(&self.endpoint)
            .query("page", page.to_string())
            .query("per_page", per_page.to_string())
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json")
            .call()
            .map_err(map_call_error)?;

        response
            .body_mut()
            .read_to_string()
            .map_err(|error| FetchSessionsError::Network(error.to_string()))
    }
}

impl SessionsApi for HttpSessionsApi {
    fn fetch_page(&self, page: u32, per_page: u32) -> Result<SessionsPage, FetchSessionsError> {
        parse_sessions_page(&self.get_body(page, per_page)?)
    }

    fn fetch_sessions(&self, page: u32, per_page: u32) -> Result<Vec<Session>, FetchSessionsError> {
        parse_session_batch(&self.get_body(page, per_page)?)
    }
}

pub fn parse_sessions_page(body: &str) -> Result<SessionsPage, FetchSessionsError> {
    serde_json::from_str::<SessionsPage>(body)
        .map_err(|error| FetchSessionsError::Malformed(error.to_string()))
}

fn parse_session_batch(body: &str) -> Result<Vec<Session>, FetchSessionsError> {
    serde_json::from_str::<SessionBatch>(body)
        .map(|batch| batch.chat_sessions)
        .map_err(|error| FetchSessionsError::Malformed(error.to_string()))
}

fn map_call_error(error: ureq::Error) -> FetchSessionsError {
    match error {
        ureq::Error::StatusCode(code) => FetchSessionsError::Status(code),
        other => FetchSessionsError::Network(other.to_string()),
    }
}

fn make_agent(timeout: Option<Duration>) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(timeout)
        .build();
    config.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingApi {
        page: SessionsPage,
        calls: Mutex<Vec<(u32, u32)>>,
    }

    impl SessionsApi for RecordingApi {
        fn fetch_page(&self, page: u32, per_page: u32) -> Result<SessionsPage, FetchSessionsError> {
            self.calls.lock().expect("lock").push((page, per_page));
            Ok(self.page.clone())
        }
    }

    fn sample_page() -> SessionsPage {
        parse_sessions_page(
            r#"{
                "chat_sessions": [
                    {"id": 4, "name": "Chat Session about Billing", "messages": []},
                    {"id": 5, "name": "Chat Session about Refunds", "messages": [
                        {"id": 1, "action": "USER", "content": "hi", "timestamp": "2024-01-01T10:00:00Z"}
                    ]}
                ],
                "pages": 1
            }"#,
        )
        .expect("parse")
    }

    #[test]
    fn find_session_scans_first_large_page() {
        let api = RecordingApi {
            page: sample_page(),
            calls: Mutex::new(Vec::new()),
        };

        let found = api.find_session(SessionId(5)).expect("lookup");
        let session = found.expect("found");
        assert_eq!(session.name, "Chat Session about Refunds");
        assert_eq!(session.messages.len(), 1);
        assert_eq!(
            *api.calls.lock().expect("lock"),
            vec![(1, DETAIL_LOOKUP_PAGE_SIZE)]
        );
    }

    #[test]
    fn find_session_reports_missing_id() {
        let api = RecordingApi {
            page: sample_page(),
            calls: Mutex::new(Vec::new()),
        };
        assert_eq!(api.find_session(SessionId(99)).expect("lookup"), None);
    }

    #[test]
    fn malformed_bodies_are_classified() {
        let missing_sessions = parse_sessions_page(r#"{"pages": 3}"#);
        assert!(matches!(missing_sessions, Err(FetchSessionsError::Malformed(_))));

        let not_array = parse_sessions_page(r#"{"chat_sessions": {}, "pages": 3}"#);
        assert!(matches!(not_array, Err(FetchSessionsError::Malformed(_))));

        let not_json = parse_sessions_page("<html>");
        assert!(matches!(not_json, Err(FetchSessionsError::Malformed(_))));
    }

    #[test]
    fn lookup_batch_does_not_need_page_count() {
        let sessions = parse_session_batch(
            r#"{"chat_sessions": [{"id": 5, "name": "Chat Session about Refunds", "messages": []}]}"#,
        )
        .expect("parse");
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, SessionId(5));

        assert!(matches!(
            parse_sessions_page(r#"{"chat_sessions": []}"#),
            Err(FetchSessionsError::Malformed(_))
        ));
        assert!(matches!(
            parse_session_batch(r#"{"pages": 1}"#),
            Err(FetchSessionsError::Malformed(_))
        ));
    }

    #[test]
    fn status_errors_keep_the_code() {
        assert_eq!(
            map_call_error(ureq::Error::StatusCode(503)),
            FetchSessionsError::Status(503)
        );
    }
}
