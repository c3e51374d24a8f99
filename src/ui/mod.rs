mod theme;

use crate::app::{AppModel, DetailAreas, DetailStatus, Focus, ListAreas, screen_layout};
use crate::domain::{ListedSession, Message, MessageAction, Session, format_clock_12h};
use crate::infra::AvatarPool;
use ratatui::prelude::*;
use ratatui::widgets::*;
use unicode_width::UnicodeWidthStr;

const NO_SELECTION_TITLE: &str = "Your conversations are waiting";
const NO_SELECTION_HINT: &str = "Select a chat to dive back into your discussions";

pub fn render(frame: &mut Frame, model: &AppModel, avatars: &AvatarPool) {
    let full_area = frame.area();
    if full_area.width == 0 || full_area.height == 0 {
        return;
    }

    let screen = screen_layout(full_area, model.panes(), model.is_mobile());
    let focus = model.effective_focus();

    if let Some(list) = screen.list {
        render_list(frame, list, model, avatars, focus);
    }
    if let Some(detail) = screen.detail {
        render_detail(frame, detail, model, avatars, focus == Focus::Detail);
    }
    frame.render_widget(footer_line(model, focus), screen.footer);

    if model.help_open {
        render_help_overlay(frame, full_area);
    }
}

/// Keeps the conversation scroll within the wrapped message text.
pub fn clamp_scroll_state(model: &mut AppModel) {
    let Some(areas) = model.screen().detail else {
        return;
    };
    let Some(session) = model.detail.session() else {
        return;
    };
    let paragraph = Paragraph::new(Text::from(message_lines(session, model))).wrap(Wrap { trim: false });
    let total = paragraph.line_count(areas.body.width);
    let max_scroll = total.saturating_sub(usize::from(areas.body.height));
    model.detail.scroll = model
        .detail
        .scroll
        .min(u16::try_from(max_scroll).unwrap_or(u16::MAX));
}

fn pane_block(focused: bool) -> Block<'static> {
    let border = if focused {
        theme::BORDER_FOCUSED
    } else {
        theme::BORDER
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

fn render_list(
    frame: &mut Frame,
    areas: ListAreas,
    model: &AppModel,
    avatars: &AvatarPool,
    focus: Focus,
) {
    let list = &model.list;
    frame.render_widget(pane_block(focus != Focus::Detail), areas.block);

    let title = Line::from(vec![
        Span::styled("Messaging ", Style::default().fg(theme::FG).bold()),
        Span::styled(
            format!("[{} | {}]", list.current_page, list.total_pages),
            Style::default().fg(theme::MUTED),
        ),
    ]);
    frame.render_widget(Paragraph::new(title), areas.title);

    render_search_box(frame, areas.search, model, focus == Focus::Search);

    let rows_area = areas.rows;
    let visible = usize::from(rows_area.height);
    if list.displayed.is_empty() {
        let text = if !list.query.trim().is_empty() {
            format!("No chat sessions found for \"{}\"", list.query)
        } else if list.is_loading {
            String::new()
        } else {
            "No chat sessions yet.".to_string()
        };
        frame.render_widget(
            Paragraph::new(text)
                .style(Style::default().fg(theme::MUTED))
                .wrap(Wrap { trim: true }),
            rows_area,
        );
    } else {
        let selected_id = model.navigator.selected_id();
        let width = usize::from(rows_area.width);
        let items: Vec<ListItem> = list
            .displayed_sessions()
            .enumerate()
            .skip(list.offset)
            .take(visible)
            .map(|(index, session)| {
                let is_cursor = index == list.cursor && focus == Focus::List;
                let is_open = selected_id == Some(session.id);
                session_list_item(session, avatars, width, is_cursor, is_open)
            })
            .collect();
        frame.render_widget(List::new(items), rows_area);
    }

    let status = if list.is_loading {
        Span::styled("Loading more sessions...", Style::default().fg(theme::ACCENT))
    } else {
        Span::styled(
            format!("{} of {} sessions", list.displayed.len(), list.sessions.len()),
            Style::default().fg(theme::DIM),
        )
    };
    frame.render_widget(Paragraph::new(Line::from(status)), areas.status);
}

fn render_search_box(frame: &mut Frame, area: Rect, model: &AppModel, focused: bool) {
    let search = &model.list.search;
    let block = pane_block(focused).title(Span::styled(
        " Search ",
        Style::default().fg(theme::MUTED),
    ));
    let inner = block.inner(area);

    let line = if search.is_blank() && !focused {
        Line::from(Span::styled(
            "Type / to search by name",
            Style::default().fg(theme::DIM),
        ))
    } else {
        Line::from(Span::styled(
            search.text().to_string(),
            Style::default().fg(theme::FG),
        ))
    };
    frame.render_widget(Paragraph::new(line).block(block), area);

    if focused && inner.width > 0 && inner.height > 0 {
        let before: String = search.text().chars().take(search.cursor()).collect();
        let offset = u16::try_from(UnicodeWidthStr::width(before.as_str())).unwrap_or(u16::MAX);
        let x = inner.x.saturating_add(offset).min(inner.right().saturating_sub(1));
        frame.set_cursor_position(Position::new(x, inner.y));
    }
}

fn avatar_badge(image: &str, avatars: &AvatarPool) -> Span<'static> {
    match avatars.index_of(image) {
        Some(index) => Span::styled(
            format!(" P{} ", index + 1),
            Style::default()
                .fg(Color::Black)
                .bg(theme::AVATAR_COLORS[index % theme::AVATAR_COLORS.len()]),
        ),
        None => Span::styled(" ?? ", Style::default().fg(theme::FG).bg(theme::DIM)),
    }
}

fn session_list_item(
    session: &ListedSession,
    avatars: &AvatarPool,
    width: usize,
    is_cursor: bool,
    is_open: bool,
) -> ListItem<'static> {
    let marker = if is_cursor { "▸ " } else { "  " };
    let badge = avatar_badge(&session.image, avatars);
    let badge_width = UnicodeWidthStr::width(badge.content.as_ref());
    let age = session.latest_message_age.clone();
    let age_width = UnicodeWidthStr::width(age.as_str());

    let fixed = UnicodeWidthStr::width(marker) + badge_width;
    let gap = 2usize;
    let name_budget = width.saturating_sub(fixed + gap + age_width);
    let (name, age) = if name_budget < 4 {
        (truncate_end(&session.name, width.saturating_sub(fixed)), String::new())
    } else {
        (truncate_end(&session.name, name_budget), age)
    };
    let padding = width.saturating_sub(
        fixed + UnicodeWidthStr::width(name.as_str()) + UnicodeWidthStr::width(age.as_str()),
    );

    let name_style = if is_open {
        Style::default().fg(theme::ACCENT).bold()
    } else {
        Style::default().fg(theme::FG)
    };
    let line = Line::from(vec![
        Span::styled(marker, Style::default().fg(theme::ACCENT)),
        badge,
        Span::styled(name, name_style),
        Span::raw(" ".repeat(padding)),
        Span::styled(age, Style::default().fg(theme::DIM)),
    ]);

    let item = ListItem::new(line);
    if is_cursor {
        item.style(Style::default().bg(theme::SELECTED_BG))
    } else {
        item
    }
}

fn render_detail(
    frame: &mut Frame,
    areas: DetailAreas,
    model: &AppModel,
    avatars: &AvatarPool,
    focused: bool,
) {
    frame.render_widget(pane_block(focused), areas.block);
    let detail = &model.detail;

    let mut header: Vec<Span<'static>> = Vec::new();
    if areas.back.is_some() {
        header.push(Span::styled("←  ", Style::default().fg(theme::ACCENT).bold()));
    }

    match &detail.status {
        DetailStatus::Idle => {
            render_placeholder(frame, areas.body);
        }
        DetailStatus::Loading => {
            frame.render_widget(Paragraph::new(Line::from(header)), areas.header);
            frame.render_widget(
                Paragraph::new("Loading chat messages...").style(Style::default().fg(theme::MUTED)),
                areas.body,
            );
        }
        DetailStatus::Failed(error) => {
            frame.render_widget(Paragraph::new(Line::from(header)), areas.header);
            frame.render_widget(
                Paragraph::new(error.to_string())
                    .style(Style::default().fg(theme::ERROR))
                    .wrap(Wrap { trim: true }),
                areas.body,
            );
        }
        DetailStatus::Loaded(session) => {
            header.push(avatar_badge(model.navigator.image(), avatars));
            header.push(Span::styled(
                detail.display_name().unwrap_or_default(),
                Style::default().fg(theme::FG).bold(),
            ));
            header.push(Span::styled(
                format!("  · {} messages", session.messages.len()),
                Style::default().fg(theme::DIM),
            ));
            frame.render_widget(Paragraph::new(Line::from(header)), areas.header);
            render_divider(frame, areas);

            let text = Text::from(message_lines(session, model));
            let paragraph = Paragraph::new(text)
                .wrap(Wrap { trim: false })
                .scroll((detail.scroll, 0));
            frame.render_widget(paragraph, areas.body);
        }
    }
}

fn render_divider(frame: &mut Frame, areas: DetailAreas) {
    let y = areas.header.y.saturating_add(1);
    if y >= areas.body.y {
        return;
    }
    let divider = Rect {
        y,
        height: 1,
        ..areas.header
    };
    frame.render_widget(
        Paragraph::new("─".repeat(usize::from(divider.width)))
            .style(Style::default().fg(theme::BORDER)),
        divider,
    );
}

fn render_placeholder(frame: &mut Frame, area: Rect) {
    if area.height == 0 {
        return;
    }
    let top = area.height.saturating_sub(2) / 2;
    let centered = Rect {
        y: area.y.saturating_add(top),
        height: area.height.saturating_sub(top).min(2),
        ..area
    };
    let lines = vec![
        Line::from(Span::styled(
            NO_SELECTION_TITLE,
            Style::default().fg(theme::FG).bold(),
        )),
        Line::from(Span::styled(NO_SELECTION_HINT, Style::default().fg(theme::MUTED))),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        centered,
    );
}

fn message_lines(session: &Session, model: &AppModel) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in &session.messages {
        lines.extend(single_message_lines(message, model));
        lines.push(Line::from(""));
    }
    lines
}

fn single_message_lines(message: &Message, model: &AppModel) -> Vec<Line<'static>> {
    let clock = format_clock_12h(&message.timestamp, model.local_offset);
    let mut lines = Vec::new();
    match message.action {
        MessageAction::User => {
            lines.push(
                Line::from(vec![
                    Span::styled(clock, Style::default().fg(theme::DIM)),
                    Span::styled("  You", Style::default().fg(theme::ACCENT).bold()),
                ])
                .right_aligned(),
            );
            for text in message.content.lines() {
                lines.push(
                    Line::from(Span::styled(
                        text.to_string(),
                        Style::default().fg(theme::ACCENT).bg(theme::ACCENT_BG),
                    ))
                    .right_aligned(),
                );
            }
        }
        MessageAction::Ai => {
            lines.push(Line::from(vec![
                Span::styled("AI  ", Style::default().fg(theme::MUTED).bold()),
                Span::styled(clock, Style::default().fg(theme::DIM)),
            ]));
            for text in message.content.lines() {
                lines.push(Line::from(Span::styled(
                    text.to_string(),
                    Style::default().fg(theme::FG),
                )));
            }
        }
    }
    lines
}

fn footer_line(model: &AppModel, focus: Focus) -> Paragraph<'static> {
    let text = match focus {
        Focus::List => {
            "Keys: arrows=move  PgUp/PgDn=page  Enter=open  /=search  Esc=clear search  Tab=detail  Ctrl+Q/Ctrl+C=quit  F1=help"
        }
        Focus::Search => "Keys: type to edit  Enter=run search  Esc/Down=list  Ctrl+Q/Ctrl+C=quit  F1=help",
        Focus::Detail if model.is_mobile() => {
            "Keys: arrows/PgUp/PgDn=scroll  Esc/Backspace=back  Ctrl+Q/Ctrl+C=quit  F1=help"
        }
        Focus::Detail => "Keys: arrows/PgUp/PgDn=scroll  Esc/Tab=list  Ctrl+Q/Ctrl+C=quit  F1=help",
    };
    Paragraph::new(text).style(Style::default().fg(theme::DIM))
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup = centered_rect(70, 60, area);
    frame.render_widget(Clear, popup);

    let text = vec![
        Line::from("Session list"),
        Line::from("  - Arrows, PgUp/PgDn, Home/End: move (more sessions load as you scroll)"),
        Line::from("  - Enter or click: open a session"),
        Line::from("  - / or any letter: edit search, Esc clears"),
        Line::from("  - Typing alone does not filter; press Enter to run the search"),
        Line::from(""),
        Line::from("Conversation"),
        Line::from("  - Arrows, PgUp/PgDn or wheel: scroll"),
        Line::from("  - Esc: back to the list (narrow terminals show one pane)"),
        Line::from(""),
        Line::from("Global"),
        Line::from("  - Ctrl+Q or Ctrl+C: quit"),
        Line::from("  - F1: toggle this help"),
    ];

    let paragraph = Paragraph::new(text).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .padding(Padding::horizontal(1))
            .title("Help (F1 or Esc to close)"),
    );
    frame.render_widget(paragraph, popup);
}

fn truncate_end(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }
    let ellipsis = "…";
    let available = max_width.saturating_sub(UnicodeWidthStr::width(ellipsis));
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + ch_width > available {
            break;
        }
        used += ch_width;
        out.push(ch);
    }
    out.push_str(ellipsis);
    out
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(r);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);
    center
}
