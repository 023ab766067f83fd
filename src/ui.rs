use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Modal, NoticeKind, Screen};
use crate::entry_editor::{EntryEditor, MoodPolicy};
use crate::journal_entry::{Entry, Mood};
use crate::text_input::TextInput;
use crate::theme::Palette;

pub fn draw(f: &mut Frame, app: &App) {
    let palette = app.theme().palette();
    f.render_widget(
        Block::default().style(Style::default().bg(palette.background).fg(palette.text)),
        f.area(),
    );

    match app.screen() {
        Screen::Journal => draw_journal(f, app, &palette),
        Screen::Explore => draw_explore(f, app, &palette),
    }

    if let Some(modal) = app.modal() {
        draw_modal(f, modal, app.notice().is_none(), &palette);
    }
    if let Some(notice) = app.notice() {
        let area = centered_rect(50, 7, f.area());
        let color = match notice.kind {
            NoticeKind::Success => palette.accent,
            NoticeKind::Error => palette.error,
        };
        let body = Paragraph::new(vec![
            Line::from(notice.message.as_str()),
            Line::from(""),
            Line::from(Span::styled(
                "Press any key",
                Style::default().fg(palette.hint),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().bg(palette.surface).fg(palette.text))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(Span::styled(
                    notice.title,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )),
        );
        f.render_widget(Clear, area);
        f.render_widget(body, area);
    }
}

fn draw_journal(f: &mut Frame, app: &App, palette: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(recent_height(app.recent_entries().len())),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(f.area());

    f.render_widget(header("What's on your mind today?", app, palette), chunks[0]);

    let composer = app.composer();
    f.render_widget(mood_selector(composer, palette), chunks[1]);
    let focused = app.modal().is_none() && app.notice().is_none();
    draw_input(f, composer.input(), "Start writing...", chunks[2], focused, palette);

    if !app.recent_entries().is_empty() {
        let items: Vec<ListItem> = app
            .recent_entries()
            .iter()
            .map(|e| entry_item(e, palette))
            .collect();
        let recent = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border))
                .title("Recent Entries"),
        );
        f.render_widget(recent, chunks[3]);
    }

    f.render_widget(
        controls(
            &[
                ("Ctrl+S", "save"),
                ("Ctrl+N/P", "mood"),
                ("Tab", "explore"),
                ("Ctrl+T", "theme"),
                ("Ctrl+Q", "quit"),
            ],
            palette,
        ),
        chunks[4],
    );
}

fn draw_explore(f: &mut Frame, app: &App, palette: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(f.area());

    f.render_widget(header("Explore Entries", app, palette), chunks[0]);

    let focused = app.modal().is_none() && app.notice().is_none();
    draw_input(f, &app.search, "Search entries...", chunks[1], focused, palette);

    let visible = app.visible_entries();
    let title = if app.list.query().trim().is_empty() {
        format!("Entries ({})", visible.len())
    } else {
        format!("Entries ({} of {})", visible.len(), app.entries().len())
    };
    let items: Vec<ListItem> = visible.iter().map(|e| entry_item(e, palette)).collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border))
                .title(title),
        )
        .highlight_style(
            Style::default()
                .bg(palette.surface)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    f.render_stateful_widget(
        list,
        chunks[2],
        &mut ListState::default().with_selected(app.list.selected_index()),
    );

    f.render_widget(
        controls(
            &[
                ("Up/Down", "select"),
                ("Enter", "view"),
                ("Ctrl+E", "edit"),
                ("Ctrl+D", "delete"),
                ("Tab", "journal"),
                ("Ctrl+T", "theme"),
                ("Ctrl+Q", "quit"),
            ],
            palette,
        ),
        chunks[3],
    );
}

fn draw_modal(f: &mut Frame, modal: &Modal, focused: bool, palette: &Palette) {
    match modal {
        Modal::View(entry) => {
            let area = centered_rect(80, 20, f.area());
            let mut lines: Vec<Line> = entry.text.lines().map(Line::from).collect();
            lines.push(Line::from(""));
            lines.push(mood_line(entry, palette));
            let body = Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .style(Style::default().bg(palette.surface).fg(palette.text))
                .block(modal_block(
                    &format!("Entry from {}", entry.date_label()),
                    palette,
                ));
            f.render_widget(Clear, area);
            f.render_widget(body, area);
        }
        Modal::ConfirmDelete(_) => {
            let area = centered_rect(50, 7, f.area());
            let body = Paragraph::new(vec![
                Line::from("Are you sure you want to delete this entry?"),
                Line::from(""),
                Line::from(Span::styled(
                    "y/Enter: Delete, any other key: Cancel",
                    Style::default().fg(palette.hint),
                )),
            ])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(Style::default().bg(palette.surface).fg(palette.text))
            .block(modal_block("Delete Entry", palette));
            f.render_widget(Clear, area);
            f.render_widget(body, area);
        }
        Modal::Edit(editor) => {
            let area = centered_rect(80, 18, f.area());
            f.render_widget(Clear, area);
            let block = modal_block("Edit Entry", palette)
                .style(Style::default().bg(palette.surface).fg(palette.text));
            let inner = block.inner(area);
            f.render_widget(block, area);

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints(
                    [
                        Constraint::Length(3),
                        Constraint::Min(3),
                        Constraint::Length(1),
                    ]
                    .as_ref(),
                )
                .split(inner);
            f.render_widget(mood_selector(editor, palette), chunks[0]);
            draw_input(f, editor.input(), "Edit your entry...", chunks[1], focused, palette);
            f.render_widget(
                controls(&[("Ctrl+S", "update entry"), ("Esc", "close")], palette),
                chunks[2],
            );
        }
    }
}

fn header<'a>(title: &'a str, app: &App, palette: &Palette) -> Paragraph<'a> {
    let mode = if app.theme().is_dark() {
        "dark mode"
    } else {
        "light mode"
    };
    Paragraph::new(Line::from(vec![
        Span::styled(
            title,
            Style::default()
                .fg(palette.title)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  [{mode}]"), Style::default().fg(palette.muted)),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(palette.border)),
    )
}

fn mood_selector<'a>(editor: &EntryEditor, palette: &Palette) -> Paragraph<'a> {
    let mut spans = Vec::with_capacity(Mood::ALL.len() * 2);
    for mood in Mood::ALL {
        let style = if editor.mood() == Some(mood) {
            Style::default()
                .bg(palette.accent)
                .fg(palette.surface)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.muted)
        };
        spans.push(Span::styled(format!(" {} ", mood.label()), style));
        spans.push(Span::raw(" "));
    }
    let title = match editor.policy() {
        MoodPolicy::Required => "Mood",
        MoodPolicy::Optional => "Mood (optional)",
    };
    Paragraph::new(Line::from(spans))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border))
                .title(title),
        )
}

fn draw_input(
    f: &mut Frame,
    input: &TextInput,
    placeholder: &str,
    area: Rect,
    focused: bool,
    palette: &Palette,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused {
            palette.accent
        } else {
            palette.border
        }));
    let inner = block.inner(area);
    let (rows, (row, column)) = input.wrap(inner.width);
    let scroll = row.saturating_sub(inner.height.saturating_sub(1));

    let paragraph = if input.text().is_empty() {
        Paragraph::new(Span::styled(
            placeholder.to_owned(),
            Style::default().fg(palette.muted),
        ))
    } else {
        let lines: Vec<Line> = rows.into_iter().map(Line::from).collect();
        Paragraph::new(lines).scroll((scroll, 0))
    };
    f.render_widget(paragraph.block(block), area);

    if focused && inner.width > 0 && inner.height > 0 {
        let x = inner.x + column.min(inner.width - 1);
        let y = inner.y + (row - scroll).min(inner.height - 1);
        f.set_cursor_position((x, y));
    }
}

fn entry_item<'a>(entry: &Entry, palette: &Palette) -> ListItem<'a> {
    ListItem::new(vec![
        Line::from(Span::styled(
            entry.date_label(),
            Style::default().fg(palette.muted),
        )),
        Line::from(Span::styled(
            entry.first_line().to_owned(),
            Style::default().fg(palette.text),
        )),
        mood_line(entry, palette),
    ])
}

fn mood_line<'a>(entry: &Entry, palette: &Palette) -> Line<'a> {
    let mood = entry.mood.map(Mood::label).unwrap_or("-");
    Line::from(Span::styled(
        format!("Mood: {mood}"),
        Style::default().fg(palette.muted),
    ))
}

fn controls<'a>(keys: &[(&'a str, &'a str)], palette: &Palette) -> Paragraph<'a> {
    let mut spans = Vec::with_capacity(keys.len() * 2);
    for (i, (key, action)) in keys.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(", "));
        }
        spans.push(Span::styled(*key, Style::default().add_modifier(Modifier::BOLD)));
        spans.push(Span::raw(format!(": {action}")));
    }
    Paragraph::new(Line::from(spans))
        .style(Style::default().fg(palette.hint))
        .alignment(Alignment::Center)
}

fn modal_block<'a>(title: &str, palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .title(Span::styled(
            title.to_owned(),
            Style::default()
                .fg(palette.title)
                .add_modifier(Modifier::BOLD),
        ))
}

fn recent_height(count: usize) -> u16 {
    if count == 0 {
        0
    } else {
        u16::try_from(count * 3 + 2).unwrap_or(u16::MAX)
    }
}

/// A `percent_x` wide, `height` tall rectangle centred in `area`.
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
