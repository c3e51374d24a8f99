use crate::domain::{Session, SessionId, display_session_name};
use crate::infra::FetchSessionsError;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum DetailError {
    #[error("Session not found")]
    NotFound,

    #[error("Error fetching chat sessions")]
    Fetch,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DetailStatus {
    /// Nothing selected; the pane shows a placeholder.
    Idle,
    Loading,
    Loaded(Session),
    Failed(DetailError),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionDetailState {
    pub target: Option<SessionId>,
    pub status: DetailStatus,
    pub scroll: u16,
}

impl Default for SessionDetailState {
    fn default() -> Self {
        Self {
            target: None,
            status: DetailStatus::Idle,
            scroll: 0,
        }
    }
}

impl SessionDetailState {
    /// Points the pane at `target`. Returns the id to look up when a fetch is
    /// needed; re-selecting the session already shown does not refetch.
    pub fn show(&mut self, target: Option<SessionId>) -> Option<SessionId> {
        if target == self.target && target.is_some() {
            return None;
        }

        self.target = target;
        self.scroll = 0;
        match target {
            None => {
                self.status = DetailStatus::Idle;
                None
            }
            Some(id) => {
                self.status = DetailStatus::Loading;
                Some(id)
            }
        }
    }

    /// Results for a session that is no longer targeted are dropped.
    pub fn apply_result(
        &mut self,
        id: SessionId,
        result: Result<Option<Session>, FetchSessionsError>,
    ) {
        if self.target != Some(id) {
            tracing::debug!(%id, "dropping stale session lookup");
            return;
        }

        self.status = match result {
            Ok(Some(session)) => DetailStatus::Loaded(session),
            Ok(None) => {
                tracing::info!(%id, "session not found in lookup page");
                DetailStatus::Failed(DetailError::NotFound)
            }
            Err(error) => {
                tracing::warn!(%id, %error, "failed to fetch session");
                DetailStatus::Failed(DetailError::Fetch)
            }
        };
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, DetailStatus::Loading)
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.status {
            DetailStatus::Loaded(session) => Some(session),
            _ => None,
        }
    }

    /// Name for the header; the stored session keeps the server's name.
    pub fn display_name(&self) -> Option<String> {
        self.session()
            .map(|session| display_session_name(&session.name))
    }

    pub fn scroll_by(&mut self, delta: i32) {
        let next = i32::from(self.scroll).saturating_add(delta).max(0);
        self.scroll = u16::try_from(next).unwrap_or(u16::MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Message, MessageAction};

    fn refunds() -> Session {
        Session {
            id: SessionId(7),
            name: "Chat Session about Refunds".to_string(),
            messages: vec![Message {
                id: 1,
                action: MessageAction::Ai,
                content: "How can I help?".to_string(),
                timestamp: "2024-01-01T10:00:00Z".to_string(),
            }],
        }
    }

    #[test]
    fn none_target_is_a_placeholder_without_fetch() {
        let mut detail = SessionDetailState::default();
        assert_eq!(detail.show(None), None);
        assert_eq!(detail.status, DetailStatus::Idle);
    }

    #[test]
    fn found_session_keeps_raw_name_and_strips_for_display() {
        let mut detail = SessionDetailState::default();
        assert_eq!(detail.show(Some(SessionId(7))), Some(SessionId(7)));
        assert!(detail.is_loading());

        detail.apply_result(SessionId(7), Ok(Some(refunds())));
        assert!(!detail.is_loading());
        assert_eq!(
            detail.session().map(|s| s.name.as_str()),
            Some("Chat Session about Refunds")
        );
        assert_eq!(detail.display_name().as_deref(), Some("Refunds"));
    }

    #[test]
    fn missing_session_clears_previous_and_reports_not_found() {
        let mut detail = SessionDetailState::default();
        detail.show(Some(SessionId(7)));
        detail.apply_result(SessionId(7), Ok(Some(refunds())));

        detail.show(Some(SessionId(8)));
        detail.apply_result(SessionId(8), Ok(None));
        assert_eq!(detail.session(), None);
        assert_eq!(detail.status, DetailStatus::Failed(DetailError::NotFound));
        assert_eq!(DetailError::NotFound.to_string(), "Session not found");
    }

    #[test]
    fn transport_failure_surfaces_generic_error() {
        let mut detail = SessionDetailState::default();
        detail.show(Some(SessionId(3)));
        detail.apply_result(
            SessionId(3),
            Err(FetchSessionsError::Malformed("missing field".to_string())),
        );
        assert_eq!(detail.status, DetailStatus::Failed(DetailError::Fetch));
    }

    #[test]
    fn stale_results_are_ignored() {
        let mut detail = SessionDetailState::default();
        detail.show(Some(SessionId(1)));
        detail.show(Some(SessionId(2)));
        detail.apply_result(SessionId(1), Ok(Some(refunds())));
        assert!(detail.is_loading());
    }

    #[test]
    fn reselecting_same_session_keeps_loaded_messages() {
        let mut detail = SessionDetailState::default();
        detail.show(Some(SessionId(7)));
        detail.apply_result(SessionId(7), Ok(Some(refunds())));

        assert_eq!(detail.show(Some(SessionId(7))), None);
        assert!(detail.session().is_some());
    }
}
