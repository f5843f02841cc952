use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::model::Record;

use super::app::{App, Mode};

/// Main render function
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    let bg = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // header + separator
            Constraint::Min(1),    // feed
            Constraint::Length(1), // status row
        ])
        .split(area);

    render_header(frame, app, chunks[0]);

    // Filter panel takes a sidebar while open
    if app.mode == Mode::Filter {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(28)])
            .split(chunks[1]);
        render_feed(frame, app, split[0]);
        render_filter_panel(frame, app, split[1]);
    } else {
        render_feed(frame, app, chunks[1]);
    }

    render_status_row(frame, app, chunks[2]);

    if app.mode == Mode::TagRemove {
        render_tag_remove_popup(frame, app, area);
    }
    if app.lightbox.is_open() {
        render_lightbox(frame, app, area);
    }
    if app.show_help {
        render_help_overlay(frame, app, area);
    }
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let mut spans = vec![
        Span::styled(
            " feedvault ",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                " {} post{} ",
                app.session.post_count(),
                if app.session.post_count() == 1 { "" } else { "s" }
            ),
            Style::default().fg(theme.text),
        ),
    ];
    let selected = app.session.selected_tags();
    if !selected.is_empty() {
        let tags: Vec<String> = selected.iter().map(|t| format!("#{}", t)).collect();
        spans.push(Span::styled(
            format!(" filter: {} ({} shown) ", tags.join(" "), app.visible.len()),
            Style::default().fg(theme.tag),
        ));
    }

    let lines = vec![
        Line::from(spans),
        Line::from(Span::styled(
            "─".repeat(area.width as usize),
            Style::default().fg(theme.dim),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

fn render_feed(frame: &mut Frame, app: &mut App, area: Rect) {
    if app.visible.is_empty() {
        let message = if app.session.post_count() == 0 {
            "no posts yet — run `fv import <archive.json>`"
        } else {
            "no posts match the current filter"
        };
        let line = Line::from(Span::styled(message, Style::default().fg(app.theme.dim)));
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let width = area.width.saturating_sub(2) as usize;
    let heights: Vec<usize> = app
        .visible
        .iter()
        .map(|r| card_height(r, width, app.config.ui.card_rows, app.config.ui.show_media))
        .collect();

    // Keep the cursor card fully on screen
    if app.scroll > app.cursor {
        app.scroll = app.cursor;
    }
    while app.scroll < app.cursor
        && visible_span(&heights, app.scroll, app.cursor) > area.height as usize
    {
        app.scroll += 1;
    }

    let mut lines: Vec<Line> = Vec::new();
    for (i, record) in app.visible.iter().enumerate().skip(app.scroll) {
        if lines.len() >= area.height as usize {
            break;
        }
        lines.extend(card_lines(app, record, i == app.cursor, width));
    }
    lines.truncate(area.height as usize);
    frame.render_widget(Paragraph::new(lines), area);
}

/// Rows a card occupies: header + text + optional media/url rows + blank
fn card_height(record: &Record, width: usize, card_rows: usize, show_media: bool) -> usize {
    let text_rows = wrap_text(&record.full_text, width.saturating_sub(2).max(10))
        .len()
        .min(card_rows);
    let media_row = usize::from(show_media && record.has_media());
    let url_row = usize::from(!record.url.is_empty());
    1 + text_rows + media_row + url_row + 1
}

/// Total rows from the first visible card through the cursor card
fn visible_span(heights: &[usize], scroll: usize, cursor: usize) -> usize {
    heights[scroll..=cursor].iter().sum()
}

fn card_lines<'a>(app: &App, record: &'a Record, selected: bool, width: usize) -> Vec<Line<'a>> {
    let theme = &app.theme;
    let row_bg = if selected {
        Style::default().bg(theme.selection_bg)
    } else {
        Style::default()
    };

    let marker = if selected { "▌" } else { " " };
    let mut header = vec![
        Span::styled(marker, row_bg.fg(theme.highlight)),
        Span::styled(
            format!("@{}", display_name(record)),
            row_bg.fg(theme.text_bright).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  [{}]", record.id), row_bg.fg(theme.dim)),
    ];
    for tag in &record.tags {
        header.push(Span::styled(format!("  #{}", tag), row_bg.fg(theme.tag)));
    }

    let mut lines = vec![Line::from(header)];
    let text_width = width.saturating_sub(2).max(10);
    let wrapped = wrap_text(&record.full_text, text_width);
    let shown = wrapped.len().min(app.config.ui.card_rows);
    let truncated = wrapped.len() > shown;
    for (i, row) in wrapped.into_iter().take(shown).enumerate() {
        let suffix = if truncated && i + 1 == shown { " …" } else { "" };
        lines.push(Line::from(Span::styled(
            format!("  {}{}", row, suffix),
            row_bg.fg(theme.text),
        )));
    }
    if app.config.ui.show_media && record.has_media() {
        lines.push(Line::from(Span::styled(
            format!("  ▶ {}", crate::cli::output::media_summary(record)),
            row_bg.fg(theme.highlight),
        )));
    }
    if !record.url.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("  {}", record.url),
            row_bg.fg(theme.dim),
        )));
    }
    lines.push(Line::from(""));
    lines
}

fn display_name(record: &Record) -> &str {
    if record.screen_name.is_empty() {
        "unknown"
    } else {
        &record.screen_name
    }
}

/// Greedy word wrap by display width
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    for paragraph in text.lines() {
        let mut row = String::new();
        for word in paragraph.split_whitespace() {
            if row.is_empty() {
                row = word.to_string();
            } else if row.width() + 1 + word.width() <= width {
                row.push(' ');
                row.push_str(word);
            } else {
                rows.push(std::mem::take(&mut row));
                row = word.to_string();
            }
        }
        if !row.is_empty() || paragraph.is_empty() {
            rows.push(row);
        }
    }
    if rows.is_empty() {
        rows.push(String::new());
    }
    rows
}

// ---------------------------------------------------------------------------
// Filter panel
// ---------------------------------------------------------------------------

fn render_filter_panel(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let tags: Vec<String> = app.session.available_tags().into_iter().collect();

    let block = Block::default()
        .borders(Borders::LEFT)
        .title(" filter ")
        .style(Style::default().fg(theme.text));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    if tags.is_empty() {
        lines.push(Line::from(Span::styled(
            "no tags yet",
            Style::default().fg(theme.dim),
        )));
    }
    for (i, tag) in tags.iter().enumerate() {
        let mark = if app.filter_selection.contains(tag) {
            "[x]"
        } else {
            "[ ]"
        };
        let style = if i == app.filter_cursor {
            Style::default()
                .fg(theme.text_bright)
                .bg(theme.selection_bg)
        } else {
            Style::default().fg(theme.text)
        };
        lines.push(Line::from(Span::styled(
            format!(" {} #{}", mark, tag),
            style,
        )));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

// ---------------------------------------------------------------------------
// Popups and overlays
// ---------------------------------------------------------------------------

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}

fn render_tag_remove_popup(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let Some(record) = app.selected() else {
        return;
    };

    let height = (record.tags.len() as u16 + 2).min(area.height);
    let popup = centered(area, 32, height);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" remove tag ")
        .style(Style::default().fg(theme.text));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let lines: Vec<Line> = record
        .tags
        .iter()
        .enumerate()
        .map(|(i, tag)| {
            let style = if i == app.remove_cursor {
                Style::default()
                    .fg(theme.text_bright)
                    .bg(theme.selection_bg)
            } else {
                Style::default().fg(theme.tag)
            };
            Line::from(Span::styled(format!(" #{}", tag), style))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_lightbox(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let Some((index, count)) = app.lightbox.position() else {
        return;
    };
    let Some(item) = app.lightbox.current() else {
        return;
    };

    let popup = centered(area, area.width.saturating_sub(8).min(72), 7);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" media {}/{} ", index + 1, count))
        .style(Style::default().fg(theme.highlight));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let mut lines = vec![
        Line::from(Span::styled(
            format!(" {} ", item.kind.label()),
            Style::default()
                .fg(theme.text_bright)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            item.original.clone(),
            Style::default().fg(theme.accent),
        )),
        Line::from(""),
    ];
    let hint = if app.lightbox.single_image() {
        "esc close"
    } else {
        "←/→ navigate   esc close"
    };
    lines.push(Line::from(Span::styled(
        hint,
        Style::default().fg(theme.dim),
    )));
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bindings = [
        ("j/k", "move through the feed"),
        ("enter/o", "open media lightbox"),
        ("←/→", "navigate lightbox"),
        ("f", "tag filter panel"),
        ("t", "add tag to post"),
        ("x", "remove tag from post"),
        ("r", "reload from store"),
        ("w", "write (retry a failed save)"),
        ("?", "toggle this help"),
        ("q", "quit"),
    ];

    let popup = centered(area, 44, bindings.len() as u16 + 2);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" help ")
        .style(Style::default().fg(theme.text));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let lines: Vec<Line> = bindings
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(format!(" {:<8}", keys), Style::default().fg(theme.highlight)),
                Span::styled(*what, Style::default().fg(theme.text)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

// ---------------------------------------------------------------------------
// Status row
// ---------------------------------------------------------------------------

fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let line = if app.mode == Mode::TagInput {
        Line::from(vec![
            Span::styled("tag: ", Style::default().fg(theme.text)),
            Span::styled(
                app.tag_input.clone(),
                Style::default().fg(theme.text_bright),
            ),
            Span::styled("\u{258C}", Style::default().fg(theme.highlight)),
            Span::styled(
                "  enter add  esc cancel",
                Style::default().fg(theme.dim),
            ),
        ])
    } else if app.pending_write() {
        Line::from(Span::styled(
            " ! changes not yet written to store — w to retry ",
            Style::default().fg(theme.warning),
        ))
    } else if let Some(ref status) = app.status {
        Line::from(Span::styled(
            status.clone(),
            Style::default().fg(theme.text),
        ))
    } else {
        let hint = match app.mode {
            Mode::Filter => "space toggle  c clear  esc done",
            _ => "j/k move  enter media  f filter  t tag  ? help  q quit",
        };
        Line::from(Span::styled(hint, Style::default().fg(theme.dim)))
    };

    frame.render_widget(Paragraph::new(line), area);
}
