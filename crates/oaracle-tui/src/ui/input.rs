//! Keyboard and mouse input handling for the TUI.
//!
//! Events are translated into `App` actions. Overlays (quit confirmation,
//! help, the error dialog) capture input before the map does.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use oaracle_core::map::PanDirection;

use crate::app::{App, AppState, PAGE_SCROLL_SIZE};

use super::render::map_area;

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Error dialog is modal
    if app.ctx.workflow.error().is_some() {
        match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('x') => app.dismiss_error(),
            KeyCode::Char('c') | KeyCode::Char('r') => app.request_conditions(),
            KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
            _ => {}
        }
        return Ok(false);
    }

    handle_normal_input(app, key);
    Ok(false)
}

fn handle_normal_input(app: &mut App, key: KeyEvent) {
    let results_open = app.ctx.workflow.results_visible();

    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,

        // Map navigation
        KeyCode::Up => app.pan(PanDirection::North),
        KeyCode::Down => app.pan(PanDirection::South),
        KeyCode::Left => app.pan(PanDirection::West),
        KeyCode::Right => app.pan(PanDirection::East),
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),
        KeyCode::Enter | KeyCode::Char(' ') => app.select_center(),

        // Workflow
        KeyCode::Char('c') => app.request_conditions(),
        KeyCode::Char('x') | KeyCode::Esc if results_open => app.close_results(),
        KeyCode::Esc if app.ctx.workflow.instructions_visible() => app.dismiss_instructions(),
        KeyCode::Char('d') => app.dismiss_instructions(),
        KeyCode::Char('l') | KeyCode::Char('L') => app.locate_device(),

        // Results scrolling
        KeyCode::PageDown if results_open => app.scroll_results(true, PAGE_SCROLL_SIZE),
        KeyCode::PageUp if results_open => app.scroll_results(false, PAGE_SCROLL_SIZE),

        _ => {}
    }
}

/// Handle mouse input: left click selects, the wheel zooms.
pub fn handle_mouse(app: &mut App, mouse: MouseEvent, frame_area: Rect) {
    if app.state != AppState::Normal || app.ctx.workflow.error().is_some() {
        return;
    }

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            app.click(map_area(frame_area), mouse.column, mouse.row);
        }
        MouseEventKind::ScrollUp => app.zoom_in(),
        MouseEventKind::ScrollDown => app.zoom_out(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    use crate::app::tests::app;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_quit_needs_confirmation() {
        let mut app = app();
        assert!(!handle_input(&mut app, key(KeyCode::Char('q'))).unwrap());
        assert_eq!(app.state, AppState::ConfirmingQuit);

        assert!(!handle_input(&mut app, key(KeyCode::Char('n'))).unwrap());
        assert_eq!(app.state, AppState::Normal);

        handle_input(&mut app, key(KeyCode::Char('q'))).unwrap();
        assert!(handle_input(&mut app, key(KeyCode::Char('y'))).unwrap());
        assert_eq!(app.state, AppState::Quitting);
    }

    #[test]
    fn test_help_swallows_keys() {
        let mut app = app();
        handle_input(&mut app, key(KeyCode::Char('?'))).unwrap();
        assert_eq!(app.state, AppState::ShowingHelp);

        let zoom = app.ctx.map.zoom();
        handle_input(&mut app, key(KeyCode::Char('+'))).unwrap();
        assert_eq!(app.ctx.map.zoom(), zoom);

        handle_input(&mut app, key(KeyCode::Esc)).unwrap();
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_navigation_keys() {
        let mut app = app();
        let start = app.ctx.map.center();
        let zoom = app.ctx.map.zoom();

        handle_input(&mut app, key(KeyCode::Char('+'))).unwrap();
        assert_eq!(app.ctx.map.zoom(), zoom + 1);
        handle_input(&mut app, key(KeyCode::Char('-'))).unwrap();
        assert_eq!(app.ctx.map.zoom(), zoom);

        handle_input(&mut app, key(KeyCode::Up)).unwrap();
        assert!(app.ctx.map.center().latitude > start.latitude);
        handle_input(&mut app, key(KeyCode::Left)).unwrap();
        assert!(app.ctx.map.center().longitude < start.longitude);
    }

    #[test]
    fn test_dismiss_instructions() {
        let mut app = app();
        assert!(app.ctx.workflow.instructions_visible());
        handle_input(&mut app, key(KeyCode::Char('d'))).unwrap();
        assert!(!app.ctx.workflow.instructions_visible());
    }

    #[tokio::test]
    async fn test_enter_selects_center() {
        let mut app = app();
        handle_input(&mut app, key(KeyCode::Enter)).unwrap();
        let selection = app.ctx.workflow.selection().unwrap();
        assert_eq!(selection.point, app.ctx.map.center());
        assert!(app.ctx.workflow.location_panel_visible());
    }

    #[test]
    fn test_mouse_ignored_under_overlay() {
        let mut app = app();
        app.state = AppState::ShowingHelp;
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 20,
            row: 10,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(&mut app, click, Rect::new(0, 0, 120, 40));
        assert!(app.ctx.workflow.selection().is_none());
    }
}
