use std::sync::Arc;

use serde::Serialize;
use tauri::State;

use eb_bookmarks::{
    controller::{EventOutcome, Services, Startup, UiController, UiEvent, UiState},
    i18n::DefaultLocalizer,
    prompt::QueuedPrompt,
    session::SystemClock,
    BookmarkRecord, Capabilities, Document, JsonFileStorage, MemoryStorage, Readiness,
};

use crate::AppState;

/// Per-window state. A window is one tab: its session storage lives and
/// dies with it.
pub struct Tab {
    session: Arc<MemoryStorage>,
    prompt: Arc<QueuedPrompt>,
    readiness: Readiness,
    controller: Option<Box<UiController>>,
}

impl Tab {
    fn new() -> Self {
        Self {
            session: Arc::new(MemoryStorage::new()),
            prompt: Arc::new(QueuedPrompt::default()),
            readiness: Readiness::new(),
            controller: None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub enabled: bool,
    pub document: Document,
    pub ui: UiState,
    pub alerts: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventReply {
    pub outcome: EventOutcome,
    pub document: Document,
    pub ui: UiState,
    pub alerts: Vec<String>,
}

fn origin_of(url: &str) -> &str {
    let Some(scheme_end) = url.find("://") else { return url };
    let rest = &url[scheme_end + 3..];
    match rest.find(['/', '#', '?']) {
        Some(pos) => &url[..scheme_end + 3 + pos],
        None => url,
    }
}

fn local_area(state: &AppState, url: &str) -> Result<Arc<JsonFileStorage>, String> {
    let origin = origin_of(url).to_string();
    let mut origins = state.origins.lock();
    if let Some(area) = origins.get(&origin) {
        return Ok(area.clone());
    }
    let area = Arc::new(JsonFileStorage::for_origin(&state.app_dir.join("storage"), &origin).map_err(|e| e.to_string())?);
    origins.insert(origin, area.clone());
    Ok(area)
}

/// Called by the page-setup script once per flag: `ids` when element
/// identifiers are assigned, `fingerprints` when fingerprints are.
#[tauri::command]
pub fn page_setup_done(step: String, window: tauri::Window, state: State<AppState>) -> Result<bool, String> {
    let mut tabs = state.tabs.lock();
    let tab = tabs.entry(window.label().to_string()).or_insert_with(Tab::new);
    match step.as_str() {
        "ids" => tab.readiness.mark_ids_assigned(),
        "fingerprints" => tab.readiness.mark_fingerprints_assigned(),
        other => return Err(format!("unknown setup step {other:?}")),
    }
    Ok(tab.readiness.is_ready())
}

#[tauri::command]
pub fn attach_page(document: Document, capabilities: Capabilities, window: tauri::Window, state: State<AppState>) -> Result<PageView, String> {
    let local = local_area(&state, &document.url)?;
    let mut tabs = state.tabs.lock();
    let tab = tabs.entry(window.label().to_string()).or_insert_with(Tab::new);
    if !tab.readiness.is_ready() {
        return Err(eb_bookmarks::BookmarkError::NotReady.to_string());
    }
    // the next page in this window has to signal readiness again
    tab.readiness = Readiness::new();

    let services = Services {
        local,
        session: tab.session.clone(),
        clock: Arc::new(SystemClock),
        localizer: Arc::new(DefaultLocalizer),
        prompt: tab.prompt.clone(),
        config: state.config.clone(),
    };
    match UiController::start(document, &capabilities, services).map_err(|e| e.to_string())? {
        Startup::Running(controller) => {
            let view = PageView {
                enabled: true,
                document: controller.document().clone(),
                ui: controller.ui_state(),
                alerts: tab.prompt.take_alerts(),
            };
            tab.controller = Some(controller);
            Ok(view)
        }
        Startup::Disabled { document, .. } => {
            tab.controller = None;
            Ok(PageView { enabled: false, document, ui: UiState::default(), alerts: Vec::new() })
        }
    }
}

/// Routes one UI event. `confirmed` carries the reader's answer when the
/// webview already asked for confirmation (delete all).
#[tauri::command]
pub fn bookmark_event(event: UiEvent, confirmed: Option<bool>, window: tauri::Window, state: State<AppState>) -> Result<EventReply, String> {
    let mut tabs = state.tabs.lock();
    let tab = tabs.get_mut(window.label()).ok_or_else(|| eb_bookmarks::BookmarkError::NotReady.to_string())?;
    let controller = tab.controller.as_mut().ok_or_else(|| eb_bookmarks::BookmarkError::NotReady.to_string())?;
    tab.prompt.set_answer(confirmed.unwrap_or(false));
    let outcome = controller.handle(event).map_err(|e| e.to_string())?;
    Ok(EventReply {
        outcome,
        document: controller.document().clone(),
        ui: controller.ui_state(),
        alerts: tab.prompt.take_alerts(),
    })
}

#[tauri::command]
pub fn list_bookmarks(book_title: Option<String>, window: tauri::Window, state: State<AppState>) -> Result<Vec<BookmarkRecord>, String> {
    let tabs = state.tabs.lock();
    let controller = tabs
        .get(window.label())
        .and_then(|t| t.controller.as_ref())
        .ok_or_else(|| eb_bookmarks::BookmarkError::NotReady.to_string())?;
    let mut all = controller.store().load_all().map_err(|e| e.to_string())?.visible;
    if let Some(title) = book_title { all.retain(|b| b.book_title == title); }
    Ok(all)
}
