//! Event routing: the piece that owns the page model and turns reader
//! actions into store mutations followed by a fresh reconciliation.

use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    capabilities::Capabilities,
    config::BookmarkConfig,
    document::{Document, Rect},
    error::{BookmarkError, Result},
    fingerprint::FingerprintIndex,
    i18n::Localizer,
    models::{BookmarkRecord, BookmarkType, LoadedBookmarks, OpenTarget},
    prompt::UserPrompt,
    reconcile::DomReconciler,
    selection::{Selection, SelectionTracker},
    session::{Clock, SessionManager},
    storage::StorageArea,
    store::{BookmarkStore, PageInfo},
    visibility::{mark_visibility, resolve_target},
};

/// Everything the controller needs from its host.
#[derive(Clone)]
pub struct Services {
    /// Durable per-origin storage.
    pub local: Arc<dyn StorageArea>,
    /// Storage scoped to this tab.
    pub session: Arc<dyn StorageArea>,
    pub clock: Arc<dyn Clock>,
    pub localizer: Arc<dyn Localizer>,
    pub prompt: Arc<dyn UserPrompt>,
    pub config: BookmarkConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum UiEvent {
    SelectionChanged { selection: Option<Selection> },
    /// Click on an element's own bookmark button.
    BookmarkButton { id: String },
    /// A general "bookmark this page" action with no element attached.
    BookmarkPage,
    DeleteBookmark { key: String },
    DeleteAll { kind: Option<BookmarkType> },
    FollowBookmark { key: String },
    OpenModal,
    /// Close button or a click on the modal backdrop.
    CloseModal,
    /// Click on a list header.
    ToggleList { kind: BookmarkType },
    ViewportChanged { viewport_height: f64, rects: BTreeMap<String, Rect> },
    Unload,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub modal_open: bool,
    /// At most one list panel is open at a time.
    pub open_list: Option<BookmarkType>,
}

impl UiState {
    pub fn toggle(&mut self, kind: BookmarkType) {
        self.open_list = if self.open_list == Some(kind) { None } else { Some(kind) };
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOutcome {
    pub saved: Option<BookmarkRecord>,
    pub navigate: Option<OpenTarget>,
    /// Whether the page model was reconciled again.
    pub reconciled: bool,
}

pub enum Startup {
    Running(Box<UiController>),
    /// A required capability is missing; the returned page has its
    /// bookmark UI hidden.
    Disabled { document: Document, reason: BookmarkError },
}

pub struct UiController {
    doc: Document,
    store: BookmarkStore,
    index: FingerprintIndex,
    reconciler: DomReconciler,
    tracker: SelectionTracker,
    ui: UiState,
    localizer: Arc<dyn Localizer>,
    prompt: Arc<dyn UserPrompt>,
    config: BookmarkConfig,
}

impl UiController {
    /// Brings the subsystem up on a page whose identifiers and fingerprints
    /// are already assigned.
    pub fn start(mut doc: Document, capabilities: &Capabilities, services: Services) -> Result<Startup> {
        if let Err(reason) = capabilities.check() {
            tracing::warn!(%reason, "bookmarks disabled");
            doc.ui_hidden = true;
            return Ok(Startup::Disabled { document: doc, reason });
        }

        let Services { local, session, clock, localizer, prompt, config } = services;
        let sessions = SessionManager::new(session.clone(), clock);
        let session_date = sessions.session_date()?;
        let index = FingerprintIndex::new(session);
        index.build(&doc)?;

        let mut controller = UiController {
            store: BookmarkStore::new(local, sessions, &config),
            index,
            reconciler: DomReconciler::new(localizer.clone(), config.locale.clone(), config.date_format.clone()),
            tracker: SelectionTracker::new(),
            ui: UiState::default(),
            localizer,
            prompt,
            config,
            doc,
        };
        controller.refresh()?;
        mark_visibility(&mut controller.doc, controller.config.viewport_margin);
        tracing::info!(session = %session_date, page = %controller.doc.page_url(), "bookmarks started");
        Ok(Startup::Running(Box::new(controller)))
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn ui_state(&self) -> UiState {
        self.ui
    }

    pub fn store(&self) -> &BookmarkStore {
        &self.store
    }

    /// Loads, prunes and re-applies every record.
    pub fn refresh(&mut self) -> Result<LoadedBookmarks> {
        let loaded = self.store.load_all()?;
        self.reconciler.reconcile(&mut self.doc, &loaded);
        Ok(loaded)
    }

    pub fn handle(&mut self, event: UiEvent) -> Result<EventOutcome> {
        let mut outcome = EventOutcome::default();
        match event {
            UiEvent::SelectionChanged { selection } => {
                self.tracker.on_selection_change(&mut self.doc, selection.as_ref());
            }
            UiEvent::BookmarkButton { id } => {
                outcome.saved = Some(self.capture(BookmarkType::UserBookmark, Some(&id))?);
                self.refresh()?;
                outcome.reconciled = true;
            }
            UiEvent::BookmarkPage => {
                outcome.saved = Some(self.capture(BookmarkType::UserBookmark, None)?);
                self.refresh()?;
                outcome.reconciled = true;
            }
            UiEvent::DeleteBookmark { key } => {
                self.store.delete_bookmark(&key)?;
                self.refresh()?;
                outcome.reconciled = true;
            }
            UiEvent::DeleteAll { kind } => {
                if self.store.delete_all(kind, self.prompt.as_ref(), self.localizer.as_ref(), &self.config.locale)? {
                    self.refresh()?;
                    outcome.reconciled = true;
                }
            }
            UiEvent::FollowBookmark { key } => {
                outcome.navigate = Some(self.follow(&key)?);
            }
            UiEvent::OpenModal => {
                self.ui.modal_open = true;
                self.refresh()?;
                outcome.reconciled = true;
            }
            UiEvent::CloseModal => {
                self.ui.modal_open = false;
            }
            UiEvent::ToggleList { kind } => {
                self.ui.toggle(kind);
            }
            UiEvent::ViewportChanged { viewport_height, rects } => {
                self.doc.viewport_height = viewport_height;
                for (id, rect) in rects {
                    if let Some(el) = self.doc.by_id_mut(&id) {
                        el.rect = rect;
                    }
                }
                mark_visibility(&mut self.doc, self.config.viewport_margin);
            }
            UiEvent::Unload => {
                // Leaving the page: save and return, no reconciliation.
                match self.capture(BookmarkType::LastLocation, None) {
                    Ok(record) => outcome.saved = Some(record),
                    Err(BookmarkError::NoTarget) => tracing::debug!("nothing to remember on unload"),
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(outcome)
    }

    /// Where a stored bookmark leads, and whether its target could be
    /// verified against the fingerprint index. Expired last locations are
    /// pruned before the lookup, so they cannot be followed.
    pub fn follow(&self, key: &str) -> Result<OpenTarget> {
        let record = self.store.get(key)?.ok_or_else(|| BookmarkError::UnknownBookmark(key.to_string()))?;
        let verified = record.page_url() == self.doc.page_url()
            && self
                .index
                .resolve(&self.doc, &record.id, self.prompt.as_ref(), self.localizer.as_ref(), &self.config.locale)?
                .is_verified();
        Ok(OpenTarget { url: record.location, id: record.id, verified })
    }

    fn capture(&self, kind: BookmarkType, explicit: Option<&str>) -> Result<BookmarkRecord> {
        let node = resolve_target(&self.doc, explicit)?;
        let target = self.doc.element(node).ok_or(BookmarkError::NoTarget)?;
        let description = target.id().and_then(|id| self.tracker.description_for(id));
        let page = PageInfo { url: &self.doc.url, book_title: &self.doc.book_title, page_title: &self.doc.page_title };
        self.store.set_bookmark(kind, page, target, description)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicI64;

    use super::*;
    use crate::{
        document::{Element, NodeId, ATTR_VISIBILITY},
        i18n::DefaultLocalizer,
        prompt::QueuedPrompt,
        session::tests::StepClock,
        storage::MemoryStorage,
    };

    fn page() -> Document {
        let mut doc = Document::new("https://site/book/ch2.html", "Book", "Chapter 2");
        doc.viewport_height = 1000.0;
        doc.push(Element::new("p-1").with_fingerprint("f1").with_text("First paragraph.").at(-500.0, -100.0));
        doc.push(Element::new("p-2").with_fingerprint("f2").with_text("Second paragraph.").at(200.0, 400.0));
        doc.push(Element::new("p-3").with_fingerprint("f3").with_text("Third paragraph.").at(1200.0, 1400.0));
        doc
    }

    fn services(local: Arc<MemoryStorage>, prompt: Arc<QueuedPrompt>) -> Services {
        Services {
            local,
            session: Arc::new(MemoryStorage::new()),
            clock: Arc::new(StepClock(AtomicI64::new(1_000))),
            localizer: Arc::new(DefaultLocalizer),
            prompt,
            config: BookmarkConfig::default(),
        }
    }

    fn running(local: Arc<MemoryStorage>, prompt: Arc<QueuedPrompt>) -> UiController {
        match UiController::start(page(), &Capabilities::FULL, services(local, prompt)).unwrap() {
            Startup::Running(c) => *c,
            Startup::Disabled { reason, .. } => panic!("disabled: {reason}"),
        }
    }

    #[test]
    fn missing_capability_hides_ui() {
        let caps = Capabilities { selection_api: false, ..Capabilities::FULL };
        let local = Arc::new(MemoryStorage::new());
        match UiController::start(page(), &caps, services(local.clone(), Arc::default())).unwrap() {
            Startup::Disabled { document, reason } => {
                assert!(document.ui_hidden);
                assert!(matches!(reason, BookmarkError::Unsupported(_)));
            }
            Startup::Running(_) => panic!("should be disabled"),
        }
        assert!(local.is_empty());
    }

    #[test]
    fn start_tags_visibility_and_renders_lists() {
        let c = running(Arc::new(MemoryStorage::new()), Arc::default());
        assert_eq!(c.document().by_id("p-2").unwrap().attr(ATTR_VISIBILITY), Some("onscreen"));
        assert_eq!(c.document().by_id("p-3").unwrap().attr(ATTR_VISIBILITY), Some("offscreen"));
        assert_eq!(c.document().lists.len(), 2);
    }

    #[test]
    fn bookmark_button_uses_selection() {
        let mut c = running(Arc::new(MemoryStorage::new()), Arc::default());
        c.handle(UiEvent::SelectionChanged { selection: Some(Selection { text: "Third".into(), anchor: NodeId(2) }) })
            .unwrap();
        let out = c.handle(UiEvent::BookmarkButton { id: "p-3".into() }).unwrap();
        let saved = out.saved.unwrap();
        assert_eq!(saved.description, "Third");
        assert_eq!(saved.location, "https://site/book/ch2.html#p-3");
        assert!(out.reconciled);
        assert!(c.document().by_id("p-3").unwrap().is_bookmarked());
        assert_eq!(c.document().list(BookmarkType::UserBookmark).unwrap().items.len(), 1);
    }

    #[test]
    fn page_bookmark_falls_back_to_onscreen_element() {
        let mut c = running(Arc::new(MemoryStorage::new()), Arc::default());
        let saved = c.handle(UiEvent::BookmarkPage).unwrap().saved.unwrap();
        assert_eq!(saved.id, "p-2");
        assert_eq!(saved.description, "Second paragraph.");
    }

    #[test]
    fn viewport_change_moves_the_fallback() {
        let mut c = running(Arc::new(MemoryStorage::new()), Arc::default());
        let rects = BTreeMap::from([
            ("p-2".to_string(), Rect { top: -600.0, bottom: -400.0 }),
            ("p-3".to_string(), Rect { top: 300.0, bottom: 500.0 }),
        ]);
        c.handle(UiEvent::ViewportChanged { viewport_height: 1000.0, rects }).unwrap();
        let saved = c.handle(UiEvent::BookmarkPage).unwrap().saved.unwrap();
        assert_eq!(saved.id, "p-3");
    }

    #[test]
    fn unload_saves_last_location_without_listing_it() {
        let local = Arc::new(MemoryStorage::new());
        let mut c = running(local.clone(), Arc::default());
        let out = c.handle(UiEvent::Unload).unwrap();
        let saved = out.saved.unwrap();
        assert_eq!(saved.kind, BookmarkType::LastLocation);
        assert!(!out.reconciled);
        assert!(local.get_item(&saved.key).unwrap().is_some());
        c.refresh().unwrap();
        assert!(c.document().list(BookmarkType::LastLocation).unwrap().items.is_empty());
        assert!(c.document().by_id("p-2").unwrap().is_bookmarked());
    }

    #[test]
    fn delete_and_delete_all() {
        let prompt = Arc::new(QueuedPrompt::answering(false));
        let local = Arc::new(MemoryStorage::new());
        let mut c = running(local.clone(), prompt.clone());
        let saved = c.handle(UiEvent::BookmarkButton { id: "p-1".into() }).unwrap().saved.unwrap();

        let out = c.handle(UiEvent::DeleteAll { kind: Some(BookmarkType::UserBookmark) }).unwrap();
        assert!(!out.reconciled);
        assert!(local.get_item(&saved.key).unwrap().is_some());

        prompt.set_answer(true);
        let out = c.handle(UiEvent::DeleteAll { kind: Some(BookmarkType::UserBookmark) }).unwrap();
        assert!(out.reconciled);
        assert!(local.get_item(&saved.key).unwrap().is_none());
        assert!(!c.document().by_id("p-1").unwrap().is_bookmarked());

        let again = c.handle(UiEvent::BookmarkButton { id: "p-1".into() }).unwrap().saved.unwrap();
        c.handle(UiEvent::DeleteBookmark { key: again.key.clone() }).unwrap();
        assert!(local.get_item(&again.key).unwrap().is_none());
    }

    #[test]
    fn delete_event_cannot_reach_foreign_keys() {
        let local = Arc::new(MemoryStorage::new());
        local.set_item("theme", "dark").unwrap();
        let mut c = running(local.clone(), Arc::default());
        c.handle(UiEvent::DeleteBookmark { key: "theme".into() }).unwrap();
        assert_eq!(local.get_item("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn modal_and_exclusive_lists() {
        let mut c = running(Arc::new(MemoryStorage::new()), Arc::default());
        c.handle(UiEvent::OpenModal).unwrap();
        assert!(c.ui_state().modal_open);
        c.handle(UiEvent::ToggleList { kind: BookmarkType::UserBookmark }).unwrap();
        assert_eq!(c.ui_state().open_list, Some(BookmarkType::UserBookmark));
        c.handle(UiEvent::ToggleList { kind: BookmarkType::LastLocation }).unwrap();
        assert_eq!(c.ui_state().open_list, Some(BookmarkType::LastLocation));
        c.handle(UiEvent::ToggleList { kind: BookmarkType::LastLocation }).unwrap();
        assert_eq!(c.ui_state().open_list, None);
        c.handle(UiEvent::CloseModal).unwrap();
        assert!(!c.ui_state().modal_open);
    }

    #[test]
    fn follow_verifies_against_index() {
        let prompt = Arc::new(QueuedPrompt::default());
        let mut c = running(Arc::new(MemoryStorage::new()), prompt.clone());
        let saved = c.handle(UiEvent::BookmarkButton { id: "p-2".into() }).unwrap().saved.unwrap();
        let target = c.handle(UiEvent::FollowBookmark { key: saved.key.clone() }).unwrap().navigate.unwrap();
        assert!(target.verified);
        assert_eq!(target.url, "https://site/book/ch2.html#p-2");
        assert!(prompt.alerts().is_empty());

        assert!(matches!(c.follow("bookmark-nope-UserBookmark"), Err(BookmarkError::UnknownBookmark(_))));
    }

    #[test]
    fn follow_cannot_reach_a_pruned_last_location() {
        let local = Arc::new(MemoryStorage::new());
        let stale = |session: &str| BookmarkRecord {
            key: crate::keys::record_key("bookmark", "Book", BookmarkType::LastLocation, session),
            kind: BookmarkType::LastLocation,
            book_title: "Book".into(),
            page_title: "Chapter 2".into(),
            description: "old".into(),
            id: "p-2".into(),
            fingerprint: "f2".into(),
            location: "https://site/book/ch2.html#p-2".into(),
            session_date: session.into(),
        };
        let (oldest, newer) = (stale("10"), stale("20"));
        for r in [&oldest, &newer] {
            local.set_item(&r.key, &serde_json::to_string(r).unwrap()).unwrap();
        }
        let c = running(local.clone(), Arc::default());
        // another tab writes it back after this page started
        local.set_item(&oldest.key, &serde_json::to_string(&oldest).unwrap()).unwrap();
        assert!(matches!(c.follow(&oldest.key), Err(BookmarkError::UnknownBookmark(_))));
        assert!(local.get_item(&oldest.key).unwrap().is_none());
        assert_eq!(c.follow(&newer.key).unwrap().id, "p-2");
    }

    #[test]
    fn follow_reports_drift() {
        let prompt = Arc::new(QueuedPrompt::default());
        let mut c = running(Arc::new(MemoryStorage::new()), prompt.clone());
        let saved = c.handle(UiEvent::BookmarkButton { id: "p-2".into() }).unwrap().saved.unwrap();
        // the page re-numbered its paragraphs after the index was taken
        c.doc.elements[1].fingerprint = Some("f1".into());
        let target = c.follow(&saved.key).unwrap();
        assert!(!target.verified);
        assert_eq!(prompt.alerts().len(), 1);
    }

    #[test]
    fn events_round_trip_as_tagged_json() {
        let event: UiEvent = serde_json::from_str(r#"{"event":"toggleList","kind":"LastLocation"}"#).unwrap();
        assert_eq!(event, UiEvent::ToggleList { kind: BookmarkType::LastLocation });
        let event: UiEvent = serde_json::from_str(r#"{"event":"unload"}"#).unwrap();
        assert_eq!(event, UiEvent::Unload);
    }
}
