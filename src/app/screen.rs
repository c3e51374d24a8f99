use crate::domain::PaneSet;
use ratatui::layout::{Constraint, Direction, Layout, Margin, Rect};

const BACK_CONTROL_WIDTH: u16 = 3;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ListAreas {
    pub block: Rect,
    pub title: Rect,
    pub search: Rect,
    pub rows: Rect,
    pub status: Rect,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DetailAreas {
    pub block: Rect,
    pub header: Rect,
    pub back: Option<Rect>,
    pub body: Rect,
}

/// Where each pane lands for a given terminal area. Rendering and mouse
/// hit-testing both read this so they never disagree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ScreenLayout {
    pub list: Option<ListAreas>,
    pub detail: Option<DetailAreas>,
    pub footer: Rect,
}

pub fn screen_layout(area: Rect, panes: PaneSet, back_control: bool) -> ScreenLayout {
    let [content, footer] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .areas(area);

    let (list_area, detail_area) = match panes {
        PaneSet::ListOnly => (Some(content), None),
        PaneSet::DetailOnly => (None, Some(content)),
        PaneSet::ListAndDetail => {
            let [list, detail] = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(36), Constraint::Min(0)])
                .areas(content);
            (Some(list), Some(detail))
        }
    };

    ScreenLayout {
        list: list_area.map(list_areas),
        detail: detail_area.map(|block| detail_areas(block, back_control)),
        footer,
    }
}

fn list_areas(block: Rect) -> ListAreas {
    let inner = block.inner(Margin {
        vertical: 1,
        horizontal: 1,
    });
    let [title, search, rows, status] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(inner);
    ListAreas {
        block,
        title,
        search,
        rows,
        status,
    }
}

fn detail_areas(block: Rect, back_control: bool) -> DetailAreas {
    let inner = block.inner(Margin {
        vertical: 1,
        horizontal: 1,
    });
    let [header, _divider, body] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .areas(inner);
    let back = back_control.then(|| Rect {
        width: header.width.min(BACK_CONTROL_WIDTH),
        ..header
    });
    DetailAreas {
        block,
        header,
        back,
        body,
    }
}
