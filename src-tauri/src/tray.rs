//! Tauri side of the status bar: the two tray icons, their context menu, timers and dialogs.
//!
//! Implements the controller's host traits on top of `tauri::tray::TrayIcon` and `AppHandle`.
//! Tauri has no pressed-image or highlight API for tray icons, so [`IconLook`] emulates both:
//! the pressed image is shown while the left button is held down and while highlight mode is
//! `Always`. Timer ticks are forwarded to the main thread so the controller only ever runs there.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tauri::image::Image;
use tauri::menu::{Menu, MenuItem, PredefinedMenuItem};
use tauri::tray::{MouseButton, MouseButtonState, TrayIcon, TrayIconBuilder, TrayIconEvent};
use tauri::{AppHandle, Manager, Runtime};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};
use thiserror::Error;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::assets::IconAsset;
use crate::config::{AppSettings, RightClickAction};
use crate::controller::{
    Bounds, HighlightMode, MessageKind, StatusIcon, TimerHandle, TimerKind, TrayHost,
};
use crate::tray_actions;

pub const MENU_TRAY_ID: &str = "menu";
pub const SPACER_TRAY_ID: &str = "spacer";
pub const LAUNCH_ON_STARTUP_ID: &str = "launch_on_startup";

#[derive(Debug, Error)]
pub enum TrayError {
    #[error("failed to decode {file}: {source}")]
    Decode {
        file: &'static str,
        #[source]
        source: tauri::Error,
    },
    #[error("Tauri error: {0}")]
    Tauri(#[from] tauri::Error),
}

/// Every bundled image, decoded once at startup.
pub struct IconSet {
    images: Vec<Image<'static>>,
}

impl IconSet {
    pub fn load() -> Result<Self, TrayError> {
        let images = IconAsset::ALL
            .iter()
            .map(|asset| {
                Image::from_bytes(asset.png_bytes()).map_err(|source| TrayError::Decode {
                    file: asset.file_name(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { images })
    }

    pub fn get(&self, asset: IconAsset) -> Image<'static> {
        self.images[asset.index()].clone()
    }
}

/// Image state of one tray icon, including the emulated pressed look.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct IconLook {
    image: Option<IconAsset>,
    pressed: Option<IconAsset>,
    highlight: HighlightMode,
    held: bool,
}

impl IconLook {
    fn displayed(&self) -> Option<IconAsset> {
        if self.held || self.highlight == HighlightMode::Always {
            self.pressed.or(self.image)
        } else {
            self.image
        }
    }
}

fn apply_image<R: Runtime>(tray: &TrayIcon<R>, icons: &IconSet, asset: IconAsset) {
    if let Err(e) = tray.set_icon(Some(icons.get(asset))) {
        warn!(tray = tray.id().0.as_str(), file = asset.file_name(), error = %e, "Failed to set tray image");
        return;
    }
    if let Err(e) = tray.set_icon_as_template(asset.is_template()) {
        warn!(tray = tray.id().0.as_str(), error = %e, "Failed to set template flag");
    }
}

/// Mutates the look and redraws the icon if what it displays changed.
fn update_look<R: Runtime>(
    tray: &TrayIcon<R>,
    icons: &IconSet,
    look: &Mutex<IconLook>,
    change: impl FnOnce(&mut IconLook),
) {
    let redraw = {
        let Ok(mut look) = look.lock() else {
            warn!(tray = tray.id().0.as_str(), "Icon state lock poisoned");
            return;
        };
        let before = look.displayed();
        change(&mut look);
        let after = look.displayed();
        if before != after {
            after
        } else {
            None
        }
    };
    if let Some(asset) = redraw {
        apply_image(tray, icons, asset);
    }
}

pub struct TauriStatusIcon<R: Runtime> {
    tray: TrayIcon<R>,
    icons: Arc<IconSet>,
    look: Arc<Mutex<IconLook>>,
}

impl<R: Runtime> StatusIcon for TauriStatusIcon<R> {
    fn set_image(&self, image: IconAsset) {
        update_look(&self.tray, &self.icons, &self.look, |look| {
            look.image = Some(image)
        });
    }

    fn set_pressed_image(&self, image: IconAsset) {
        update_look(&self.tray, &self.icons, &self.look, |look| {
            look.pressed = Some(image)
        });
    }

    fn set_highlight_mode(&self, mode: HighlightMode) {
        update_look(&self.tray, &self.icons, &self.look, |look| {
            look.highlight = mode
        });
    }

    fn bounds(&self) -> Option<Bounds> {
        match self.tray.rect() {
            Ok(Some(rect)) => {
                let position = rect.position.to_physical::<f64>(1.0);
                let size = rect.size.to_physical::<f64>(1.0);
                Some(Bounds {
                    x: position.x,
                    y: position.y,
                    width: size.width,
                    height: size.height,
                })
            }
            Ok(None) => None,
            Err(e) => {
                warn!(tray = self.tray.id().0.as_str(), error = %e, "Failed to read tray bounds");
                None
            }
        }
    }
}

/// Recurring timer running on Tauri's async runtime. Cancelling aborts the task.
pub struct TauriTimer(tauri::async_runtime::JoinHandle<()>);

impl TimerHandle for TauriTimer {
    fn cancel(self) {
        self.0.abort();
    }
}

pub struct TauriHost<R: Runtime> {
    app: AppHandle<R>,
}

impl<R: Runtime> TauriHost<R> {
    pub fn new(app: AppHandle<R>) -> Self {
        Self { app }
    }
}

impl<R: Runtime> TrayHost for TauriHost<R> {
    type Icon = TauriStatusIcon<R>;
    type Timer = TauriTimer;

    fn start_timer(&self, kind: TimerKind, period: Duration) -> TauriTimer {
        let app = self.app.clone();
        TauriTimer(tauri::async_runtime::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let handle = app.clone();
                if let Err(e) =
                    app.run_on_main_thread(move || tray_actions::handle_timer_tick(&handle, kind))
                {
                    warn!(?kind, error = %e, "Failed to dispatch timer tick, stopping timer");
                    break;
                }
            }
        }))
    }

    fn show_message(&self, kind: MessageKind, title: &str, message: &str) {
        let dialog_kind = match kind {
            MessageKind::Info => MessageDialogKind::Info,
            MessageKind::Error => MessageDialogKind::Error,
        };
        self.app
            .dialog()
            .message(message)
            .title(title)
            .kind(dialog_kind)
            .show(|_| {});
    }

    fn pop_up_context_menu(&self, icon: &TauriStatusIcon<R>) {
        // The menu is attached to the icon; macOS opens it on the same right-click.
        debug!(tray = icon.tray.id().0.as_str(), "Context menu presented");
    }

    fn quit(&self) {
        self.app.exit(0);
    }
}

/// Builds the toggle icon's context menu: Launch on Startup, separator, Quit.
pub fn build_context_menu<R: Runtime>(app: &impl Manager<R>) -> Result<Menu<R>, tauri::Error> {
    let launch_on_startup = MenuItem::with_id(
        app,
        LAUNCH_ON_STARTUP_ID,
        "Launch on Startup",
        true,
        None::<&str>,
    )?;
    let sep = PredefinedMenuItem::separator(app)?;
    let quit = PredefinedMenuItem::quit(app, Some("Quit"))?;
    Menu::with_items(app, &[&launch_on_startup, &sep, &quit])
}

fn build_status_icon<R: Runtime>(
    app: &AppHandle<R>,
    id: &'static str,
    initial: IconAsset,
    icons: &Arc<IconSet>,
    menu: Option<Menu<R>>,
) -> Result<TauriStatusIcon<R>, TrayError> {
    let look = Arc::new(Mutex::new(IconLook::default()));
    let press_look = Arc::clone(&look);
    let press_icons = Arc::clone(icons);

    let mut builder = TrayIconBuilder::with_id(id)
        .icon(icons.get(initial))
        .icon_as_template(initial.is_template())
        .show_menu_on_left_click(false)
        .on_tray_icon_event(move |tray, event| {
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state,
                ..
            } = &event
            {
                let held = matches!(button_state, MouseButtonState::Down);
                update_look(tray, &press_icons, &press_look, |look| look.held = held);
            }
            tray_actions::handle_tray_icon_event(tray.app_handle(), id, event);
        });
    if let Some(menu) = menu {
        builder = builder
            .menu(&menu)
            .on_menu_event(|app, event| tray_actions::handle_tray_menu_event(app, event));
    }

    Ok(TauriStatusIcon {
        tray: builder.build(app)?,
        icons: Arc::clone(icons),
        look,
    })
}

pub struct TrayIcons<R: Runtime> {
    pub menu: TauriStatusIcon<R>,
    pub spacer: TauriStatusIcon<R>,
}

/// Creates the toggle icon, then the spacer. macOS places later items further left, which
/// leaves the toggle to the right of the spacer.
pub fn create_tray_icons<R: Runtime>(
    app: &AppHandle<R>,
    settings: &AppSettings,
) -> Result<TrayIcons<R>, TrayError> {
    let icons = Arc::new(IconSet::load()?);
    let menu = match settings.right_click {
        RightClickAction::ContextMenu => Some(build_context_menu(app)?),
        RightClickAction::Quit => None,
    };

    let menu = build_status_icon(app, MENU_TRAY_ID, IconAsset::Expand, &icons, menu)?;
    let spacer = build_status_icon(app, SPACER_TRAY_ID, IconAsset::SpacerMove, &icons, None)?;
    debug!("Tray icons created");
    Ok(TrayIcons { menu, spacer })
}
