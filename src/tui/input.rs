use crossterm::event::{KeyCode, KeyEvent};
use indexmap::IndexSet;

use crate::carousel::NavKey;
use crate::session::SessionError;

use super::app::{App, Mode};

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    app.status = None;

    // The lightbox intercepts all keys while open; its subscription is
    // attached on open and released on close, so nothing leaks through to
    // the feed bindings.
    if app.lightbox.is_open() {
        handle_lightbox(app, key);
        return;
    }

    // Help overlay intercepts ? and Esc
    if app.show_help {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
            app.show_help = false;
        }
        return;
    }

    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Filter => handle_filter(app, key),
        Mode::TagInput => handle_tag_input(app, key),
        Mode::TagRemove => handle_tag_remove(app, key),
    }
}

fn handle_lightbox(app: &mut App, key: KeyEvent) {
    let nav = match key.code {
        KeyCode::Left | KeyCode::Char('h') => NavKey::Left,
        KeyCode::Right | KeyCode::Char('l') => NavKey::Right,
        KeyCode::Esc | KeyCode::Char('q') => NavKey::Escape,
        // Swallowed: the overlay owns the keyboard while open
        _ => return,
    };
    app.lightbox.handle_key(nav);
}

fn handle_navigate(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('j') | KeyCode::Down => {
            if app.cursor + 1 < app.visible.len() {
                app.cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Char('g') => {
            app.cursor = 0;
        }
        KeyCode::Char('G') => {
            app.cursor = app.visible.len().saturating_sub(1);
        }
        KeyCode::Enter | KeyCode::Char('o') => open_lightbox(app),
        KeyCode::Char('f') => {
            app.filter_selection = app.session.selected_tags().clone();
            app.filter_cursor = 0;
            app.mode = Mode::Filter;
        }
        KeyCode::Char('t') => {
            if app.selected().is_some() {
                app.tag_input.clear();
                app.mode = Mode::TagInput;
            }
        }
        KeyCode::Char('x') => {
            if app.selected().is_some_and(|r| !r.tags.is_empty()) {
                app.remove_cursor = 0;
                app.mode = Mode::TagRemove;
            }
        }
        KeyCode::Char('r') => match app.session.reload() {
            Ok(true) => {
                app.refresh_view();
                app.set_status("reloaded from store");
            }
            Ok(false) => app.set_status("unsaved changes; press w to write first"),
            Err(e) => app.set_status(format!("reload failed: {}", e)),
        },
        KeyCode::Char('w') => match app.session.persist() {
            Ok(()) => app.set_status("written to store"),
            Err(e) => app.set_status(format!("write failed: {}", e)),
        },
        _ => {}
    }
}

fn open_lightbox(app: &mut App) {
    let Some(record) = app.selected() else {
        return;
    };
    if !app.lightbox.open(record.media.clone(), 0) {
        app.set_status("no media on this post");
    }
}

fn handle_filter(app: &mut App, key: KeyEvent) {
    let tags: Vec<String> = app.session.available_tags().into_iter().collect();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.filter_cursor + 1 < tags.len() {
                app.filter_cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.filter_cursor = app.filter_cursor.saturating_sub(1);
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            if let Some(tag) = tags.get(app.filter_cursor) {
                if !app.filter_selection.shift_remove(tag) {
                    app.filter_selection.insert(tag.clone());
                }
                apply_filter(app);
            }
        }
        KeyCode::Char('c') => {
            app.filter_selection = IndexSet::new();
            apply_filter(app);
        }
        KeyCode::Esc | KeyCode::Char('f') | KeyCode::Char('q') => {
            app.mode = Mode::Navigate;
        }
        _ => {}
    }
}

fn apply_filter(app: &mut App) {
    app.session.set_selected_tags(app.filter_selection.clone());
    app.refresh_view();
}

fn handle_tag_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) => app.tag_input.push(c),
        KeyCode::Backspace => {
            app.tag_input.pop();
        }
        KeyCode::Enter => {
            commit_tag(app);
            app.mode = Mode::Navigate;
        }
        KeyCode::Esc => {
            app.tag_input.clear();
            app.mode = Mode::Navigate;
        }
        _ => {}
    }
}

fn commit_tag(app: &mut App) {
    let Some(id) = app.selected().map(|r| r.id.clone()) else {
        return;
    };
    let text = std::mem::take(&mut app.tag_input);
    match app.session.add_tag(&id, &text) {
        Ok(true) => {
            app.refresh_view();
            app.set_status(format!("added #{}", text.trim()));
        }
        Ok(false) => app.set_status("empty tag; nothing added"),
        Err(e) => report_store_error(app, e),
    }
}

fn handle_tag_remove(app: &mut App, key: KeyEvent) {
    let tag_count = app.selected().map_or(0, |r| r.tags.len());
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.remove_cursor + 1 < tag_count {
                app.remove_cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.remove_cursor = app.remove_cursor.saturating_sub(1);
        }
        KeyCode::Enter | KeyCode::Char('x') => {
            let picked = app
                .selected()
                .and_then(|r| r.tags.get(app.remove_cursor).map(|t| (r.id.clone(), t.clone())));
            if let Some((id, tag)) = picked {
                match app.session.remove_tag(&id, &tag) {
                    Ok(true) => {
                        app.refresh_view();
                        app.set_status(format!("removed #{}", tag));
                    }
                    Ok(false) => {}
                    Err(e) => report_store_error(app, e),
                }
            }
            app.mode = Mode::Navigate;
        }
        KeyCode::Esc => {
            app.mode = Mode::Navigate;
        }
        _ => {}
    }
}

/// A failed durable write keeps the in-memory change; tell the operator and
/// leave the pending marker visible in the status row.
fn report_store_error(app: &mut App, e: SessionError) {
    app.refresh_view();
    app.set_status(format!("{} (press w to retry)", e));
}
