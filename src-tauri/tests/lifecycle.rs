use std::sync::Arc;

use eb_bookmarks::{
    controller::{Services, Startup, UiController, UiEvent},
    i18n::DefaultLocalizer,
    prompt::QueuedPrompt,
    session::Clock,
    BookmarkConfig, BookmarkType, Capabilities, Document, Element, JsonFileStorage, StorageArea,
};

struct FixedClock(i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

fn chapter(url: &str) -> Document {
    let mut doc = Document::new(url, "The Voyage Out", "Chapter 1");
    doc.viewport_height = 900.0;
    doc.push(Element::new("p-1").with_fingerprint("a1").with_text("As the streets that lead from the Strand").at(100.0, 300.0));
    doc.push(Element::new("p-2").with_fingerprint("b2").with_text("were narrow, it was better not to walk").at(1000.0, 1200.0));
    doc
}

/// Opens a new tab at time `now` against the shared durable area.
fn open_tab(local: Arc<JsonFileStorage>, now: i64, doc: Document) -> UiController {
    let services = Services {
        local,
        session: Arc::new(eb_bookmarks::MemoryStorage::new()),
        clock: Arc::new(FixedClock(now)),
        localizer: Arc::new(DefaultLocalizer),
        prompt: Arc::new(QueuedPrompt::answering(true)),
        config: BookmarkConfig::default(),
    };
    match UiController::start(doc, &Capabilities::FULL, services).unwrap() {
        Startup::Running(c) => *c,
        Startup::Disabled { reason, .. } => panic!("disabled: {reason}"),
    }
}

fn last_location_sessions(local: &JsonFileStorage) -> Vec<String> {
    let mut sessions: Vec<String> = local
        .keys()
        .unwrap()
        .into_iter()
        .filter(|k| k.contains("-LastLocation-"))
        .map(|k| k.rsplit('-').next().unwrap().to_string())
        .collect();
    sessions.sort();
    sessions
}

#[test]
fn last_locations_converge_to_previous_and_current() {
    let dir = tempfile::tempdir().unwrap();
    let local = Arc::new(JsonFileStorage::open(dir.path().join("origin.json")).unwrap());

    for now in [1000, 2000, 3000, 4000, 5000] {
        let mut tab = open_tab(local.clone(), now, chapter("https://books.example/voyage/ch1.html"));
        tab.handle(UiEvent::Unload).unwrap();
        assert!(last_location_sessions(&local).len() <= 2);
    }
    assert_eq!(last_location_sessions(&local), vec!["4000", "5000"]);

    let tab = open_tab(local.clone(), 6000, chapter("https://books.example/voyage/ch1.html"));
    let listed = tab.document().list(BookmarkType::LastLocation).unwrap();
    assert_eq!(listed.items.len(), 1);
    assert!(listed.items[0].key.ends_with("-5000"));
    assert_eq!(last_location_sessions(&local), vec!["5000"]);
}

#[test]
fn records_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("origin.json");
    {
        let local = Arc::new(JsonFileStorage::open(&path).unwrap());
        let mut tab = open_tab(local, 1000, chapter("https://books.example/voyage/ch1.html"));
        tab.handle(UiEvent::BookmarkButton { id: "p-2".into() }).unwrap();
        tab.handle(UiEvent::BookmarkButton { id: "p-1".into() }).unwrap();
    }
    let local = Arc::new(JsonFileStorage::open(&path).unwrap());
    let tab = open_tab(local, 2000, chapter("https://books.example/voyage/ch1.html#p-2"));
    let listed = tab.document().list(BookmarkType::UserBookmark).unwrap();
    assert_eq!(listed.items.len(), 1);
    assert_eq!(listed.items[0].link, "https://books.example/voyage/ch1.html#p-1");
    assert!(tab.document().by_id("p-1").unwrap().is_bookmarked());
    assert!(!tab.document().by_id("p-2").unwrap().is_bookmarked());
}

#[test]
fn bookmarks_on_other_pages_are_listed_not_marked() {
    let dir = tempfile::tempdir().unwrap();
    let local = Arc::new(JsonFileStorage::open(dir.path().join("origin.json")).unwrap());
    let mut ch1 = open_tab(local.clone(), 1000, chapter("https://books.example/voyage/ch1.html"));
    ch1.handle(UiEvent::BookmarkButton { id: "p-1".into() }).unwrap();

    let ch2 = open_tab(local, 2000, chapter("https://books.example/voyage/ch2.html"));
    assert_eq!(ch2.document().list(BookmarkType::UserBookmark).unwrap().items.len(), 1);
    assert!(ch2.document().elements.iter().all(|e| !e.is_bookmarked()));
}

#[test]
fn corrupt_record_does_not_break_the_page() {
    let dir = tempfile::tempdir().unwrap();
    let local = Arc::new(JsonFileStorage::open(dir.path().join("origin.json")).unwrap());
    local.set_item("bookmark-the-voyage-out-UserBookmark", "{oops").unwrap();
    local
        .set_item(
            "bookmark-the-voyage-out-LastLocation-500",
            r#"{"key":"bookmark-the-voyage-out-LastLocation-500","type":"LastLocation","bookTitle":"The Voyage Out",
               "pageTitle":"Chapter 1","description":"As the streets","id":"p-1","fingerprint":"a1",
               "location":"https://books.example/voyage/ch1.html#p-1","sessionDate":"500"}"#,
        )
        .unwrap();

    let tab = open_tab(local.clone(), 1000, chapter("https://books.example/voyage/ch1.html"));
    assert!(tab.document().list(BookmarkType::UserBookmark).unwrap().items.is_empty());
    assert_eq!(tab.document().list(BookmarkType::LastLocation).unwrap().items.len(), 1);
    assert_eq!(tab.document().by_id("p-1").unwrap().bookmark_type(), Some(BookmarkType::LastLocation));
    assert!(local.get_item("bookmark-the-voyage-out-UserBookmark").unwrap().is_some());
}
