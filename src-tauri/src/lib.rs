//! Hide Menu Extras: a spacer icon and an arrow icon in the macOS status bar. Collapsing the
//! arrow widens the spacer until every menu bar extra left of it is pushed off screen.
mod assets;
mod config;
mod controller;
mod tray;
mod tray_actions;

use std::sync::{Arc, Mutex};

use tauri::{Manager, RunEvent};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::controller::TrayVisibilityController;
use crate::tray_actions::SharedController;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let settings = config::load_settings();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.log_level.as_filter())),
        )
        .init();

    let app = match tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .setup(move |app| {
            // Status bar only: no Dock icon, no app menu.
            #[cfg(target_os = "macos")]
            let _ = app.set_activation_policy(tauri::ActivationPolicy::Accessory);

            let handle = app.handle().clone();
            let icons = tray::create_tray_icons(&handle, &settings)?;
            let host = tray::TauriHost::new(handle);
            let mut controller =
                TrayVisibilityController::new(host, icons.menu, icons.spacer, settings);
            controller.on_ready();
            info!(
                show_all = controller.is_showing_all(),
                countdown = ?controller.countdown_remaining(),
                right_click = ?settings.right_click,
                "Hide Menu Extras started"
            );

            let shared: SharedController<tauri::Wry> = Arc::new(Mutex::new(controller));
            app.manage(shared);
            Ok(())
        })
        .build(tauri::generate_context!())
    {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "Error while building Tauri application");
            std::process::exit(1);
        }
    };

    app.run(|_app, event| {
        // No windows exist; only an explicit quit ends the process.
        if let RunEvent::ExitRequested {
            code: None, api, ..
        } = event
        {
            api.prevent_exit();
        }
    });
}
