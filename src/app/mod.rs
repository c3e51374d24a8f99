mod mouse;
mod navigator;
mod screen;
mod search_input;
mod session_detail;
mod session_list;

use crate::domain::{
    LayoutMode, PaneSet, Session, SessionId, SessionsPage, columns_to_px, layout_for_width,
    visible_panes,
};
use crate::infra::{AvatarPool, FetchSessionsError};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use rand_core::RngCore;
use ratatui::layout::Rect;
use thiserror::Error;
use time::{OffsetDateTime, UtcOffset};

pub use navigator::Navigator;
pub use screen::{DetailAreas, ListAreas, ScreenLayout, screen_layout};
pub use session_detail::{DetailStatus, SessionDetailState};
pub use session_list::{PageRequest, SessionListState};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Focus {
    List,
    Search,
    Detail,
}

/// All UI state. Owned by the runtime, changed only through [`update`].
#[derive(Clone, Debug)]
pub struct AppModel {
    pub navigator: Navigator,
    pub list: SessionListState,
    pub detail: SessionDetailState,
    pub focus: Focus,
    pub terminal_size: (u16, u16),
    pub cell_width_px: u16,
    pub local_offset: UtcOffset,
    pub help_open: bool,
}

impl AppModel {
    pub fn new(cell_width_px: u16, local_offset: UtcOffset) -> Self {
        Self {
            navigator: Navigator::default(),
            list: SessionListState::new(),
            detail: SessionDetailState::default(),
            focus: Focus::List,
            terminal_size: (0, 0),
            cell_width_px,
            local_offset,
            help_open: false,
        }
    }

    pub fn with_terminal_size(mut self, width: u16, height: u16) -> Self {
        self.terminal_size = (width, height);
        self
    }

    pub fn viewport_width_px(&self) -> u32 {
        columns_to_px(self.terminal_size.0, self.cell_width_px)
    }

    pub fn layout_mode(&self) -> LayoutMode {
        layout_for_width(self.viewport_width_px())
    }

    pub fn is_mobile(&self) -> bool {
        self.layout_mode().is_mobile()
    }

    pub fn panes(&self) -> PaneSet {
        visible_panes(self.layout_mode(), self.navigator.has_selection())
    }

    pub fn screen(&self) -> ScreenLayout {
        let (width, height) = self.terminal_size;
        screen_layout(Rect::new(0, 0, width, height), self.panes(), self.is_mobile())
    }

    pub fn list_visible_rows(&self) -> usize {
        self.screen()
            .list
            .map_or(0, |areas| usize::from(areas.rows.height))
    }

    /// Focus after accounting for panes that are not mounted.
    pub fn effective_focus(&self) -> Focus {
        match (self.panes(), self.focus) {
            (PaneSet::DetailOnly, _) => Focus::Detail,
            (PaneSet::ListOnly, Focus::Detail) => Focus::List,
            (_, focus) => focus,
        }
    }
}

/// Collaborators `update` needs but the model does not own.
pub struct UpdateEnv<'a> {
    pub avatars: &'a AvatarPool,
    pub rng: &'a mut dyn RngCore,
    pub now: OffsetDateTime,
}

#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Paste(String),
    Mouse(MouseEvent),
    Resize {
        width: u16,
        height: u16,
    },
    PageLoaded {
        page: u32,
        result: Result<SessionsPage, FetchSessionsError>,
    },
    SessionLoaded {
        id: SessionId,
        result: Result<Option<Session>, FetchSessionsError>,
    },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AppCommand {
    None,
    Quit,
    FetchPage(PageRequest),
    FetchDetail { id: SessionId },
}

impl AppCommand {
    fn from_page_request(request: Option<PageRequest>) -> Self {
        request.map_or(Self::None, Self::FetchPage)
    }
}

/// First command after mount: the first page of sessions.
pub fn init(model: AppModel) -> (AppModel, AppCommand) {
    let mut model = model;
    let command = AppCommand::from_page_request(model.list.load_page(1));
    (model, command)
}

pub fn update(model: AppModel, event: AppEvent, env: &mut UpdateEnv<'_>) -> (AppModel, AppCommand) {
    match event {
        AppEvent::Key(key) => update_on_key(model, key),
        AppEvent::Paste(text) => update_on_paste(model, text),
        AppEvent::Mouse(mouse) => mouse::update_on_mouse(model, mouse),
        AppEvent::Resize { width, height } => update_on_resize(model, width, height),
        AppEvent::PageLoaded { page, result } => {
            let mut model = model;
            if !model.list.is_awaiting(page) {
                tracing::debug!(page, "dropping page for a list that was remounted");
                return (model, AppCommand::None);
            }
            model
                .list
                .apply_page(page, result, env.avatars, &mut *env.rng, env.now);
            let visible = model.list_visible_rows();
            model.list.clamp_offset(visible);
            (model, AppCommand::None)
        }
        AppEvent::SessionLoaded { id, result } => {
            let mut model = model;
            model.detail.apply_result(id, result);
            (model, AppCommand::None)
        }
    }
}

pub(crate) fn select_session(model: &mut AppModel, id: SessionId, image: String) -> AppCommand {
    tracing::debug!(%id, "session selected");
    model.navigator.select_session(id, image);
    if model.is_mobile() {
        model.focus = Focus::Detail;
    }
    model
        .detail
        .show(Some(id))
        .map_or(AppCommand::None, |id| AppCommand::FetchDetail { id })
}

pub(crate) fn navigate_back(model: &mut AppModel) -> AppCommand {
    let panes_before = model.panes();
    model.navigator.back();
    model.detail.show(None);
    model.focus = Focus::List;
    remount_list_if_shown(model, panes_before)
}

/// A list pane that was hidden starts over when it comes back: the fetched
/// pages and the search are dropped and page 1 is requested again.
fn remount_list_if_shown(model: &mut AppModel, panes_before: PaneSet) -> AppCommand {
    if panes_before.has_list() || !model.panes().has_list() {
        return AppCommand::None;
    }
    tracing::debug!("session list remounted");
    model.list = SessionListState::new();
    AppCommand::from_page_request(model.list.load_page(1))
}

fn update_on_resize(model: AppModel, width: u16, height: u16) -> (AppModel, AppCommand) {
    let panes_before = model.panes();
    let mut model = model.with_terminal_size(width, height);
    let command = remount_list_if_shown(&mut model, panes_before);
    let visible = model.list_visible_rows();
    model.list.clamp_offset(visible);
    model.focus = model.effective_focus();
    (model, command)
}

fn update_on_key(model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    let mut model = model;

    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
    {
        return (model, AppCommand::Quit);
    }

    if model.help_open {
        if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Enter) {
            model.help_open = false;
        }
        return (model, AppCommand::None);
    }
    if key.code == KeyCode::F(1) {
        model.help_open = true;
        return (model, AppCommand::None);
    }

    match model.effective_focus() {
        Focus::List => update_list(model, key),
        Focus::Search => update_search(model, key),
        Focus::Detail => update_detail(model, key),
    }
}

fn update_list(model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    let mut model = model;
    let visible = model.list_visible_rows();
    let page_step = page_step_for_rows(visible);
    let two_pane = !model.is_mobile();

    match key.code {
        KeyCode::Up => model.list.move_cursor(-1, visible),
        KeyCode::Down => model.list.move_cursor(1, visible),
        KeyCode::PageUp => model.list.move_cursor(-page_step, visible),
        KeyCode::PageDown => model.list.move_cursor(page_step, visible),
        KeyCode::Home => model.list.move_cursor(isize::MIN, visible),
        KeyCode::End => model.list.move_to_end(visible),
        KeyCode::Enter => {
            let Some((id, image)) = model.list.pick() else {
                return (model, AppCommand::None);
            };
            let command = select_session(&mut model, id, image);
            return (model, command);
        }
        KeyCode::Tab if two_pane => {
            model.focus = Focus::Detail;
            return (model, AppCommand::None);
        }
        KeyCode::Esc => {
            if !model.list.search.text().is_empty() {
                model.list.clear_search();
            }
            return (model, AppCommand::None);
        }
        KeyCode::Char('/') => {
            model.focus = Focus::Search;
            return (model, AppCommand::None);
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            model.focus = Focus::Search;
            model.list.search.move_end();
            model.list.search.insert_char(ch);
            return (model, AppCommand::None);
        }
        KeyCode::Backspace => {
            model.focus = Focus::Search;
            model.list.search.move_end();
            model.list.search.backspace();
            return (model, AppCommand::None);
        }
        _ => return (model, AppCommand::None),
    }

    let command = AppCommand::from_page_request(model.list.on_scroll(visible));
    (model, command)
}

fn update_search(model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    let mut model = model;
    let search = &mut model.list.search;
    match key.code {
        KeyCode::Enter => {
            model.list.submit_search();
            model.focus = Focus::List;
        }
        KeyCode::Esc | KeyCode::Down | KeyCode::Tab => model.focus = Focus::List,
        KeyCode::Backspace => search.backspace(),
        KeyCode::Delete => search.delete_forward(),
        KeyCode::Left => search.move_left(),
        KeyCode::Right => search.move_right(),
        KeyCode::Home => search.move_home(),
        KeyCode::End => search.move_end(),
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            search.insert_char(ch);
        }
        _ => {}
    }
    (model, AppCommand::None)
}

fn update_detail(model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    let mut model = model;
    let page_step = detail_page_step(&model);

    match key.code {
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Left => {
            if model.is_mobile() {
                let command = navigate_back(&mut model);
                return (model, command);
            }
            model.focus = Focus::List;
        }
        KeyCode::Tab => {
            if !model.is_mobile() {
                model.focus = Focus::List;
            }
        }
        KeyCode::Up => model.detail.scroll_by(-1),
        KeyCode::Down => model.detail.scroll_by(1),
        KeyCode::PageUp => model.detail.scroll_by(-page_step),
        KeyCode::PageDown => model.detail.scroll_by(page_step),
        KeyCode::Home => model.detail.scroll = 0,
        _ => {}
    }
    (model, AppCommand::None)
}

fn update_on_paste(model: AppModel, text: String) -> (AppModel, AppCommand) {
    let mut model = model;
    if model.effective_focus() == Focus::Detail {
        return (model, AppCommand::None);
    }
    model.focus = Focus::Search;
    model.list.search.insert_str(&text);
    (model, AppCommand::None)
}

fn page_step_for_rows(rows: usize) -> isize {
    isize::try_from(rows.saturating_sub(1).max(1)).unwrap_or(1)
}

fn detail_page_step(model: &AppModel) -> i32 {
    let height = model
        .screen()
        .detail
        .map_or(1, |areas| areas.body.height.saturating_sub(1).max(1));
    i32::from(height)
}
