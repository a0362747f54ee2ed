#![cfg_attr(all(not(debug_assertions), target_os = "windows"), windows_subsystem = "windows")]

mod commands;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use eb_bookmarks::{load_config, BookmarkConfig, JsonFileStorage};
use parking_lot::Mutex;
use tauri::Manager;
use tracing_subscriber::EnvFilter;

use crate::commands::bookmarks::Tab;

pub struct AppState {
    pub app_dir: PathBuf,
    pub config: BookmarkConfig,
    pub origins: Mutex<HashMap<String, Arc<JsonFileStorage>>>, // one durable area per origin
    pub tabs: Mutex<HashMap<String, Tab>>,                     // keyed by window label
}

fn resolve_app_dir(app: &tauri::AppHandle) -> PathBuf {
    app.path_resolver().app_data_dir().unwrap_or_else(|| {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("eb_bookmarks=info")))
        .init();

    tauri::Builder::default()
        .setup(|app| {
            let app_dir = resolve_app_dir(&app.app_handle());
            std::fs::create_dir_all(&app_dir).ok();
            let config = load_config(&app_dir);
            tracing::info!(dir = ?app_dir, locale = %config.locale, "bookmark store ready");
            app.manage(AppState {
                app_dir,
                config,
                origins: Mutex::new(HashMap::new()),
                tabs: Mutex::new(HashMap::new()),
            });
            Ok(())
        })
        .on_window_event(|event| {
            if let tauri::WindowEvent::Destroyed = event.event() {
                let window = event.window();
                let state = window.state::<AppState>();
                state.tabs.lock().remove(window.label());
            }
        })
        .invoke_handler(tauri::generate_handler![
            commands::bookmarks::page_setup_done,
            commands::bookmarks::attach_page,
            commands::bookmarks::bookmark_event,
            commands::bookmarks::list_bookmarks,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
