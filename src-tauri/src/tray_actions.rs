//! Tray event handling.
//!
//! Routes icon clicks, context menu selections and timer ticks to the visibility controller held
//! in Tauri managed state. Everything here runs on the main thread. Events that arrive before
//! setup has stored the controller are dropped.

use std::sync::{Arc, Mutex};

use tauri::menu::MenuEvent;
use tauri::tray::{MouseButton, MouseButtonState, TrayIconEvent};
use tauri::{AppHandle, Manager, Runtime};
use tracing::{debug, warn};

use crate::controller::{TimerKind, TrayVisibilityController};
use crate::tray::{TauriHost, LAUNCH_ON_STARTUP_ID, MENU_TRAY_ID, SPACER_TRAY_ID};

pub type SharedController<R> = Arc<Mutex<TrayVisibilityController<TauriHost<R>>>>;

fn with_controller<R: Runtime>(
    app: &AppHandle<R>,
    source: &'static str,
    f: impl FnOnce(&mut TrayVisibilityController<TauriHost<R>>),
) {
    let Some(state) = app.try_state::<SharedController<R>>() else {
        debug!(source, "Controller not ready, ignoring event");
        return;
    };
    let Ok(mut controller) = state.lock() else {
        warn!(source, "Controller lock poisoned");
        return;
    };
    if controller.is_quitting() {
        debug!(source, "Quitting, ignoring event");
        return;
    }
    f(&mut controller);
}

/// Handles a click on either tray icon. Call from `on_tray_icon_event`.
pub fn handle_tray_icon_event<R: Runtime>(app: &AppHandle<R>, id: &str, event: TrayIconEvent) {
    let TrayIconEvent::Click {
        button,
        button_state,
        ..
    } = event
    else {
        return;
    };

    match (id, button, button_state) {
        (MENU_TRAY_ID, MouseButton::Left, MouseButtonState::Up) => {
            with_controller(app, "menu click", |c| c.on_menu_click());
        }
        // The context menu opens on press, so react to the press as well.
        (MENU_TRAY_ID, MouseButton::Right, MouseButtonState::Down) => {
            with_controller(app, "menu right-click", |c| c.on_menu_right_click());
        }
        (SPACER_TRAY_ID, MouseButton::Left, MouseButtonState::Up) => {
            with_controller(app, "spacer click", |c| c.on_spacer_click());
        }
        _ => {}
    }
}

/// Handles a context menu selection. Quit is a predefined item and never reaches here.
pub fn handle_tray_menu_event<R: Runtime>(app: &AppHandle<R>, event: MenuEvent) {
    let id = event.id().0.as_str();
    match id {
        LAUNCH_ON_STARTUP_ID => {
            with_controller(app, "launch on startup", |c| c.on_launch_on_startup());
        }
        _ => {
            debug!(id, "Unhandled tray menu item");
        }
    }
}

/// Delivers a timer tick. Called on the main thread by the timers `TauriHost` starts.
pub fn handle_timer_tick<R: Runtime>(app: &AppHandle<R>, kind: TimerKind) {
    match kind {
        TimerKind::Countdown { generation } => {
            with_controller(app, "countdown tick", |c| c.on_countdown_tick(generation));
        }
        TimerKind::HealthCheck => {
            with_controller(app, "health check", |c| c.verify_icons_accessible());
        }
    }
}
