use super::search_input::SearchInput;
use crate::domain::{
    ListedSession, SessionId, SessionsPage, display_session_name, filter_session_indices,
    latest_message_age,
};
use crate::infra::{AvatarPool, FetchSessionsError, LIST_PAGE_SIZE};
use rand_core::RngCore;
use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

/// Paged, searchable list of sessions. `sessions` only grows; `displayed`
/// holds indices into it for the current search.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionListState {
    pub sessions: Vec<ListedSession>,
    pub displayed: Vec<usize>,
    pub current_page: u32,
    /// 0 until the first page arrives.
    pub total_pages: u32,
    pub is_loading: bool,
    pub search: SearchInput,
    /// Last submitted query; `displayed` reflects this, not the live input.
    pub query: String,
    pub cursor: usize,
    pub offset: usize,
}

impl Default for SessionListState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionListState {
    pub fn new() -> Self {
        Self {
            sessions: Vec::new(),
            displayed: Vec::new(),
            current_page: 1,
            total_pages: 0,
            is_loading: false,
            search: SearchInput::new(),
            query: String::new(),
            cursor: 0,
            offset: 0,
        }
    }

    /// Starts a fetch of `page` unless one is already running or the page is
    /// past the known end.
    pub fn load_page(&mut self, page: u32) -> Option<PageRequest> {
        if self.is_loading || (self.total_pages > 0 && page > self.total_pages) {
            return None;
        }
        self.is_loading = true;
        Some(PageRequest {
            page,
            per_page: LIST_PAGE_SIZE,
        })
    }

    /// True while `page` is the request in flight for this list.
    pub fn is_awaiting(&self, page: u32) -> bool {
        self.is_loading && page == self.current_page
    }

    pub fn apply_page<R: RngCore + ?Sized>(
        &mut self,
        page: u32,
        result: Result<SessionsPage, FetchSessionsError>,
        avatars: &AvatarPool,
        rng: &mut R,
        now: OffsetDateTime,
    ) {
        self.is_loading = false;
        let data = match result {
            Ok(data) => data,
            Err(error) => {
                tracing::warn!(page, %error, "failed to load chat sessions page");
                return;
            }
        };

        tracing::info!(
            page,
            count = data.chat_sessions.len(),
            total_pages = data.pages,
            "loaded chat sessions page"
        );

        for session in data.chat_sessions {
            let listed = ListedSession {
                id: session.id,
                name: display_session_name(&session.name),
                latest_message_age: latest_message_age(&session.messages, now),
                image: avatars.pick(rng),
                messages: session.messages,
            };
            self.displayed.push(self.sessions.len());
            self.sessions.push(listed);
        }
        self.total_pages = data.pages;
    }

    pub fn search(&mut self, query: &str) {
        self.query = query.to_string();
        self.displayed = filter_session_indices(&self.sessions, query);
        self.cursor = self.cursor.min(self.displayed.len().saturating_sub(1));
        self.offset = self.offset.min(self.cursor);
    }

    pub fn submit_search(&mut self) {
        let query = self.search.text().to_string();
        self.search(&query);
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
        self.search("");
    }

    pub fn displayed_sessions(&self) -> impl Iterator<Item = &ListedSession> + '_ {
        self.displayed
            .iter()
            .filter_map(|index| self.sessions.get(*index))
    }

    pub fn selected(&self) -> Option<&ListedSession> {
        self.displayed
            .get(self.cursor)
            .and_then(|index| self.sessions.get(*index))
    }

    /// `(id, image)` for the row under the cursor.
    pub fn pick(&self) -> Option<(SessionId, String)> {
        self.selected()
            .map(|session| (session.id, session.image.clone()))
    }

    pub fn pick_row(&mut self, row: usize) -> Option<(SessionId, String)> {
        if row >= self.displayed.len() {
            return None;
        }
        self.cursor = row;
        self.pick()
    }

    /// Content height in rows.
    pub fn scroll_height(&self) -> usize {
        self.displayed.len()
    }

    pub fn move_cursor(&mut self, delta: isize, visible: usize) {
        if self.displayed.is_empty() {
            self.cursor = 0;
            return;
        }
        let last = self.displayed.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
        self.keep_cursor_visible(visible);
    }

    pub fn move_to_end(&mut self, visible: usize) {
        self.cursor = self.displayed.len().saturating_sub(1);
        self.keep_cursor_visible(visible);
    }

    pub fn scroll_by(&mut self, delta: isize, visible: usize) {
        let max_offset = self.scroll_height().saturating_sub(visible);
        self.offset = self.offset.saturating_add_signed(delta).min(max_offset);
        if visible > 0 && !self.displayed.is_empty() {
            let bottom = self.offset + visible - 1;
            self.cursor = self.cursor.clamp(self.offset, bottom.min(self.displayed.len() - 1));
        }
    }

    pub fn clamp_offset(&mut self, visible: usize) {
        let max_offset = self.scroll_height().saturating_sub(visible);
        self.offset = self.offset.min(max_offset);
        self.keep_cursor_visible(visible);
    }

    /// Prefetch check run after every scroll input: once the viewport bottom
    /// passes half of the content, the next page is requested.
    pub fn on_scroll(&mut self, visible: usize) -> Option<PageRequest> {
        let reached_midpoint = 2 * (self.offset + visible) >= self.scroll_height();
        if reached_midpoint && !self.is_loading && self.current_page < self.total_pages {
            self.current_page += 1;
            return self.load_page(self.current_page);
        }
        None
    }

    fn keep_cursor_visible(&mut self, visible: usize) {
        if visible == 0 {
            return;
        }
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + visible {
            self.offset = self.cursor + 1 - visible;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Message, MessageAction, Session};
    use crate::infra::SequenceRng;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-06-01 10:30:00 UTC);

    fn session(id: i64, name: &str) -> Session {
        Session {
            id: SessionId(id),
            name: name.to_string(),
            messages: vec![Message {
                id: id * 10,
                action: MessageAction::User,
                content: "hello".to_string(),
                timestamp: "2024-01-01T10:00:00Z".to_string(),
            }],
        }
    }

    fn page_of(ids: std::ops::Range<i64>, pages: u32) -> SessionsPage {
        SessionsPage {
            chat_sessions: ids
                .map(|id| session(id, &format!("Chat Session about Topic {id}")))
                .collect(),
            pages,
        }
    }

    fn load(
        list: &mut SessionListState,
        page: u32,
        result: Result<SessionsPage, FetchSessionsError>,
    ) {
        let avatars = AvatarPool::from_assets_base("");
        let mut rng = SequenceRng::new(vec![0, 1, 2, 3]);
        list.apply_page(page, result, &avatars, &mut rng, NOW);
    }

    #[test]
    fn pages_accumulate_until_total_then_stop() {
        let mut list = SessionListState::new();

        for (page, range) in [(1u32, 0..9), (2, 9..18), (3, 18..22)] {
            let request = list.load_page(page).expect("request");
            assert_eq!(request, PageRequest { page, per_page: 9 });
            load(&mut list, page, Ok(page_of(range, 3)));
        }
        assert_eq!(list.sessions.len(), 22);
        assert_eq!(list.displayed.len(), 22);

        let before = list.clone();
        assert_eq!(list.load_page(4), None);
        assert_eq!(list, before);
    }

    #[test]
    fn only_the_page_in_flight_is_awaited() {
        let mut list = SessionListState::new();
        assert!(!list.is_awaiting(1));
        list.load_page(1);
        assert!(list.is_awaiting(1));
        assert!(!list.is_awaiting(2));

        load(&mut list, 1, Ok(page_of(0..9, 3)));
        assert!(!list.is_awaiting(1));
    }

    #[test]
    fn load_is_skipped_while_in_flight() {
        let mut list = SessionListState::new();
        assert!(list.load_page(1).is_some());
        assert_eq!(list.load_page(1), None);
    }

    #[test]
    fn failed_fetch_leaves_collection_untouched() {
        let mut list = SessionListState::new();
        list.load_page(1);
        load(&mut list, 1, Ok(page_of(0..3, 2)));
        let sessions = list.sessions.clone();

        list.load_page(2);
        load(
            &mut list,
            2,
            Err(FetchSessionsError::Network("connection refused".to_string())),
        );
        assert!(!list.is_loading);
        assert_eq!(list.sessions, sessions);
        assert_eq!(list.total_pages, 2);
    }

    #[test]
    fn duplicates_across_pages_are_kept() {
        let mut list = SessionListState::new();
        list.load_page(1);
        load(&mut list, 1, Ok(page_of(0..2, 2)));
        list.load_page(2);
        load(&mut list, 2, Ok(page_of(1..3, 2)));
        let ids: Vec<i64> = list.sessions.iter().map(|s| s.id.0).collect();
        assert_eq!(ids, vec![0, 1, 1, 2]);
    }

    #[test]
    fn fetched_sessions_are_enriched() {
        let mut list = SessionListState::new();
        list.load_page(1);
        load(
            &mut list,
            1,
            Ok(SessionsPage {
                chat_sessions: vec![session(1, "Chat Session about Refunds")],
                pages: 1,
            }),
        );

        let listed = &list.sessions[0];
        assert_eq!(listed.name, "Refunds");
        assert_eq!(listed.latest_message_age, "30m Ago");
        assert_eq!(listed.image, "/Images/Profile1.png");
        assert_eq!(listed.messages.len(), 1);
    }

    #[test]
    fn search_filters_and_blank_restores() {
        let mut list = SessionListState::new();
        list.load_page(1);
        load(
            &mut list,
            1,
            Ok(SessionsPage {
                chat_sessions: vec![
                    session(1, "Chat Session about Refunds"),
                    session(2, "Chat Session about Refund policy"),
                    session(3, "sessionname"),
                    session(4, "Billing"),
                ],
                pages: 1,
            }),
        );

        list.search("ref");
        let first: Vec<usize> = list.displayed.clone();
        assert_eq!(first, vec![0, 1]);
        list.search("ref");
        assert_eq!(list.displayed, first);

        list.search("s");
        assert!(list.displayed.is_empty());

        list.search("");
        assert_eq!(list.displayed, vec![0, 1, 2, 3]);
    }

    #[test]
    fn new_pages_append_to_displayed_even_when_filtered() {
        let mut list = SessionListState::new();
        list.load_page(1);
        load(&mut list, 1, Ok(page_of(0..3, 2)));
        list.search("nothing matches this");
        assert!(list.displayed.is_empty());

        list.load_page(2);
        load(&mut list, 2, Ok(page_of(3..5, 2)));
        assert_eq!(list.displayed, vec![3, 4]);
    }

    #[test]
    fn scroll_past_midpoint_requests_next_page() {
        let mut list = SessionListState::new();
        list.load_page(1);
        load(&mut list, 1, Ok(page_of(0..9, 3)));

        // 9 rows, 3 visible: bottom at row 3 is below the midpoint.
        assert_eq!(list.on_scroll(3), None);
        assert_eq!(list.current_page, 1);

        list.scroll_by(2, 3);
        let request = list.on_scroll(3).expect("prefetch");
        assert_eq!(request.page, 2);
        assert_eq!(list.current_page, 2);
        assert!(list.is_loading);

        // In flight: no further advance.
        list.scroll_by(3, 3);
        assert_eq!(list.on_scroll(3), None);
        assert_eq!(list.current_page, 2);
    }

    #[test]
    fn no_prefetch_on_last_page() {
        let mut list = SessionListState::new();
        list.load_page(1);
        load(&mut list, 1, Ok(page_of(0..9, 1)));
        list.move_to_end(3);
        assert_eq!(list.on_scroll(3), None);
        assert_eq!(list.current_page, 1);
    }

    #[test]
    fn cursor_moves_keep_row_visible() {
        let mut list = SessionListState::new();
        list.load_page(1);
        load(&mut list, 1, Ok(page_of(0..9, 1)));

        list.move_cursor(5, 3);
        assert_eq!(list.cursor, 5);
        assert_eq!(list.offset, 3);

        list.move_cursor(-5, 3);
        assert_eq!(list.cursor, 0);
        assert_eq!(list.offset, 0);

        assert_eq!(list.pick_row(20), None);
        assert_eq!(
            list.pick_row(2),
            Some((SessionId(2), "/Images/Profile3.png".to_string()))
        );
    }
}
