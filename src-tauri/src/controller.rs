//! Visibility state machine for the spacer/toggle icon pair.
//!
//! macOS lays status items out right to left in creation order, so the toggle icon sits to the
//! right of the spacer. Everything between the spacer and the left edge of the menu bar is what
//! gets hidden: in hide mode the spacer shows a very wide transparent image and pushes those
//! items off screen. Hiding is only safe while the toggle is at or right of the spacer; if
//! another item ends up between the two, the controller refuses to hide and asks the user to
//! restore the order.
//!
//! The controller never touches Tauri directly. Icons, timers, dialogs, menus and quitting go
//! through [`StatusIcon`], [`TimerHandle`] and [`TrayHost`], which `tray` implements for the
//! real app and the tests implement in memory. All methods are expected to run on the UI thread.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::assets::{countdown_frame, IconAsset, COLLAPSE_PROGRESS};
use crate::config::{AppSettings, RightClickAction};

pub const DIALOG_TITLE: &str = "Hide Menu Extras";
pub const MISALIGNED_MESSAGE: &str =
    "Please make sure the Arrow is always positioned after (to the right side of) the dot spacer.";
pub const LAUNCH_ON_STARTUP_MESSAGE: &str = "Launch on startup is not yet supported.";

const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HighlightMode {
    #[default]
    Never,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
}

/// Which recurring callback a timer drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// One-second countdown tick, tagged with the countdown it belongs to.
    Countdown { generation: u64 },
    HealthCheck,
}

pub trait StatusIcon {
    fn set_image(&self, image: IconAsset);
    fn set_pressed_image(&self, image: IconAsset);
    fn set_highlight_mode(&self, mode: HighlightMode);
    /// Current on-screen bounds, `None` when the host cannot report them.
    fn bounds(&self) -> Option<Bounds>;
}

pub trait TimerHandle {
    fn cancel(self);
}

pub trait TrayHost {
    type Icon: StatusIcon;
    type Timer: TimerHandle;

    /// Starts a recurring timer whose ticks are delivered back to the controller.
    fn start_timer(&self, kind: TimerKind, period: Duration) -> Self::Timer;
    fn show_message(&self, kind: MessageKind, title: &str, message: &str);
    /// Presents the context menu for `icon`. Hosts that attach the menu to the icon itself
    /// may leave presentation to the platform.
    fn pop_up_context_menu(&self, icon: &Self::Icon);
    fn quit(&self);
}

struct Countdown<T> {
    generation: u64,
    remaining: u32,
    timer: T,
}

pub struct TrayVisibilityController<H: TrayHost> {
    host: H,
    menu_icon: H::Icon,
    spacer_icon: H::Icon,
    settings: AppSettings,
    show_all: bool,
    countdown: Option<Countdown<H::Timer>>,
    next_generation: u64,
    health_check: Option<H::Timer>,
    quitting: bool,
}

impl<H: TrayHost> TrayVisibilityController<H> {
    pub fn new(host: H, menu_icon: H::Icon, spacer_icon: H::Icon, settings: AppSettings) -> Self {
        Self {
            host,
            menu_icon,
            spacer_icon,
            settings,
            show_all: true,
            countdown: None,
            next_generation: 0,
            health_check: None,
            quitting: false,
        }
    }

    pub fn is_showing_all(&self) -> bool {
        self.show_all
    }

    /// Seconds left on the auto-hide countdown, `None` when no countdown runs.
    pub fn countdown_remaining(&self) -> Option<u32> {
        self.countdown.as_ref().map(|c| c.remaining)
    }

    fn countdown_secs(&self) -> u32 {
        u32::try_from(self.settings.autohide.as_secs())
            .unwrap_or(u32::MAX)
            .max(1)
    }

    /// Initial icon setup, show-all mode, the first countdown and the recurring health check.
    pub fn on_ready(&mut self) {
        self.menu_icon.set_image(IconAsset::Expand);
        self.menu_icon.set_pressed_image(IconAsset::ExpandPressed);
        self.menu_icon.set_highlight_mode(HighlightMode::Never);
        self.spacer_icon.set_image(if self.show_all {
            IconAsset::SpacerMove
        } else {
            IconAsset::Spacer
        });
        self.spacer_icon.set_highlight_mode(HighlightMode::Never);

        self.show_all = self.show_icon_mode(true);
        self.start_countdown();

        if let Some(previous) = self.health_check.take() {
            previous.cancel();
        }
        self.health_check = Some(
            self.host
                .start_timer(TimerKind::HealthCheck, self.settings.health_check_interval),
        );
        info!(
            autohide_secs = self.countdown_secs(),
            health_check_ms = self.settings.health_check_interval.as_millis() as u64,
            "Tray icons ready"
        );
    }

    /// True when the toggle icon is at or right of the spacer.
    ///
    /// Unknown bounds count as aligned: nothing proves another item sits between the two.
    pub fn check_bounds(&self) -> bool {
        match (self.menu_icon.bounds(), self.spacer_icon.bounds()) {
            (Some(menu), Some(spacer)) => menu.x >= spacer.x,
            _ => {
                debug!("Tray bounds unavailable, assuming icons are aligned");
                true
            }
        }
    }

    /// Applies the images for `show_all` and returns the mode actually in effect.
    ///
    /// Hiding is refused while the icons are out of order; icons are left untouched and `true`
    /// is returned.
    pub fn show_icon_mode(&self, show_all: bool) -> bool {
        if !show_all && !self.check_bounds() {
            warn!("Icons out of order, refusing to hide menu extras");
            return true;
        }

        self.spacer_icon.set_image(if show_all {
            IconAsset::SpacerMove
        } else {
            IconAsset::Spacer
        });
        let (image, pressed) = if show_all {
            (IconAsset::Collapse, IconAsset::CollapsePressed)
        } else {
            (IconAsset::Expand, IconAsset::ExpandPressed)
        };
        self.menu_icon.set_image(image);
        self.menu_icon.set_pressed_image(pressed);
        self.menu_icon.set_highlight_mode(HighlightMode::Never);
        show_all
    }

    /// True once quit was requested; every later event is ignored.
    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    fn quit(&mut self) {
        info!("Quit requested from tray");
        self.quitting = true;
        self.cancel_countdown();
        if let Some(health_check) = self.health_check.take() {
            health_check.cancel();
        }
        self.host.quit();
    }

    fn toggle_mode(&mut self) {
        self.show_all = self.show_icon_mode(!self.show_all);
        debug!(show_all = self.show_all, "Display mode toggled");
        if self.show_all {
            self.start_countdown();
        } else {
            self.cancel_countdown();
        }
    }

    /// Left click on the toggle icon.
    pub fn on_menu_click(&mut self) {
        if self.quitting {
            return;
        }
        self.toggle_mode();
    }

    /// Left click on the spacer: stops a running countdown, otherwise toggles like the arrow.
    pub fn on_spacer_click(&mut self) {
        if self.quitting {
            return;
        }
        if self.countdown.is_some() {
            self.cancel_countdown();
            self.show_all = self.show_icon_mode(self.show_all);
            debug!("Auto-hide countdown stopped from spacer");
        } else {
            self.toggle_mode();
        }
    }

    /// Right click on the toggle icon.
    pub fn on_menu_right_click(&mut self) {
        if self.quitting {
            return;
        }
        match self.settings.right_click {
            RightClickAction::Quit => self.quit(),
            RightClickAction::ContextMenu => {
                self.cancel_countdown();
                self.show_all = self.show_icon_mode(self.show_all);
                self.menu_icon.set_highlight_mode(HighlightMode::Always);
                self.host.pop_up_context_menu(&self.menu_icon);
            }
        }
    }

    /// "Launch on Startup" menu entry.
    pub fn on_launch_on_startup(&self) {
        if self.quitting {
            return;
        }
        self.host
            .show_message(MessageKind::Info, DIALOG_TITLE, LAUNCH_ON_STARTUP_MESSAGE);
    }

    /// (Re)starts the auto-hide countdown. Any running countdown is cancelled first.
    pub fn start_countdown(&mut self) {
        self.cancel_countdown();

        let duration = self.countdown_secs();
        self.next_generation += 1;
        let generation = self.next_generation;
        self.render_countdown(duration);
        let timer = self
            .host
            .start_timer(TimerKind::Countdown { generation }, COUNTDOWN_TICK);
        self.countdown = Some(Countdown {
            generation,
            remaining: duration,
            timer,
        });
        debug!(generation, duration, "Auto-hide countdown started");
    }

    /// Stops the countdown timer. The displayed image is left as is.
    pub fn cancel_countdown(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            countdown.timer.cancel();
            debug!(generation = countdown.generation, "Auto-hide countdown cancelled");
        }
    }

    /// One countdown second elapsed. Ticks from a countdown that is no longer live are dropped.
    pub fn on_countdown_tick(&mut self, generation: u64) {
        if self.quitting {
            return;
        }
        let remaining = match self.countdown.as_mut() {
            Some(countdown) if countdown.generation == generation => {
                countdown.remaining = countdown.remaining.saturating_sub(1);
                countdown.remaining
            }
            _ => {
                debug!(generation, "Ignoring stale countdown tick");
                return;
            }
        };

        self.render_countdown(remaining);
        if remaining == 0 {
            self.cancel_countdown();
            self.show_all = self.show_icon_mode(false);
            if self.show_all {
                // Hiding was refused; replace the last countdown frame with the mode's image.
                self.show_icon_mode(true);
            }
            debug!(show_all = self.show_all, "Auto-hide countdown finished");
        }
    }

    fn render_countdown(&self, remaining: u32) {
        let frame = countdown_frame(remaining, self.countdown_secs(), COLLAPSE_PROGRESS.len());
        self.menu_icon.set_image(COLLAPSE_PROGRESS[frame]);
    }

    /// Periodic check that the icons are still in order. Forces show-all and tells the user
    /// when they are not.
    pub fn verify_icons_accessible(&mut self) {
        if self.quitting || self.check_bounds() {
            return;
        }

        warn!("Toggle icon is left of the spacer, showing all menu extras");
        self.show_all = self.show_icon_mode(true);
        self.host
            .show_message(MessageKind::Error, DIALOG_TITLE, MISALIGNED_MESSAGE);
    }
}
