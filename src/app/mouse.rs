use super::{AppCommand, AppModel, Focus, navigate_back, select_session};
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

const SCROLL_STEP: usize = 3;

pub(super) fn update_on_mouse(model: AppModel, mouse: MouseEvent) -> (AppModel, AppCommand) {
    let mut model = model;
    if model.terminal_size.0 == 0 || model.terminal_size.1 == 0 || model.help_open {
        return (model, AppCommand::None);
    }

    let at = Position::new(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::ScrollUp => apply_scroll(model, at, ScrollDirection::Up),
        MouseEventKind::ScrollDown => apply_scroll(model, at, ScrollDirection::Down),
        MouseEventKind::Down(MouseButton::Left) => apply_left_click(model, at),
        _ => {
            model.focus = model.effective_focus();
            (model, AppCommand::None)
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum ScrollDirection {
    Up,
    Down,
}

fn apply_scroll(mut model: AppModel, at: Position, direction: ScrollDirection) -> (AppModel, AppCommand) {
    let screen = model.screen();

    if let Some(list) = screen.list.filter(|list| list.block.contains(at)) {
        let visible = usize::from(list.rows.height);
        let delta = match direction {
            ScrollDirection::Up => -(SCROLL_STEP as isize),
            ScrollDirection::Down => SCROLL_STEP as isize,
        };
        model.list.scroll_by(delta, visible);
        let command = model
            .list
            .on_scroll(visible)
            .map_or(AppCommand::None, AppCommand::FetchPage);
        return (model, command);
    }

    if screen.detail.is_some_and(|detail| detail.block.contains(at)) {
        let step = SCROLL_STEP as i32;
        match direction {
            ScrollDirection::Up => model.detail.scroll_by(-step),
            ScrollDirection::Down => model.detail.scroll_by(step),
        }
    }

    (model, AppCommand::None)
}

fn apply_left_click(mut model: AppModel, at: Position) -> (AppModel, AppCommand) {
    let screen = model.screen();

    if let Some(detail) = screen.detail {
        if detail.back.is_some_and(|back| back.contains(at)) {
            let command = navigate_back(&mut model);
            return (model, command);
        }
        if detail.block.contains(at) {
            model.focus = Focus::Detail;
            return (model, AppCommand::None);
        }
    }

    let Some(list) = screen.list else {
        return (model, AppCommand::None);
    };

    if list.search.contains(at) {
        model.focus = Focus::Search;
        model.list.search.move_end();
        return (model, AppCommand::None);
    }

    if let Some(row) = row_at(list.rows, at) {
        model.focus = Focus::List;
        let Some((id, image)) = model.list.pick_row(model.list.offset + row) else {
            return (model, AppCommand::None);
        };
        let command = select_session(&mut model, id, image);
        return (model, command);
    }

    if list.block.contains(at) {
        model.focus = Focus::List;
    }
    (model, AppCommand::None)
}

fn row_at(rows: Rect, at: Position) -> Option<usize> {
    rows.contains(at).then(|| usize::from(at.y - rows.y))
}
