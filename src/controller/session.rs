use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::time::Duration;

use super::autoformat::Autoformat;
use super::debounce::Debouncer;
use super::insert::InsertController;
use super::key_handler::EditorKey;
use crate::document_model::record::{DEFAULT_TITLE_LENGTH, now_timestamp};
use crate::document_model::{
    DOC_TYPE, DocumentRecord, LengthClass, LineLength, OPTIONS_KEY, Options, TextField,
    derive_title,
};
use crate::export::{DEFAULT_FILENAME_LENGTH, Downloader, export_filename};
use crate::storage::{ChangeSubscription, DocumentStore, StoreChange};

pub const NEW_DOCUMENT_TITLE: &str = "New document";
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Loading,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub debounce: Duration,
    pub title_length: usize,
    pub filename_length: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            title_length: DEFAULT_TITLE_LENGTH,
            filename_length: DEFAULT_FILENAME_LENGTH,
        }
    }
}

/// Discrete commands from the menu/messaging side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Download,
}

/// Presentation flags taken from the options record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSettings {
    pub spell_check: bool,
    pub line_length: LineLength,
}

/// Missing, blank and the literal `"undefined"` all mean "no document id".
pub fn normalize_doc_id(id: Option<&str>) -> Option<String> {
    id.map(str::trim)
        .filter(|id| !id.is_empty() && *id != "undefined")
        .map(str::to_string)
}

/// One open document: owns the field, persists edits through a debounced
/// save and follows store changes made elsewhere.
pub struct EditorSession {
    store: DocumentStore,
    downloader: Arc<dyn Downloader>,
    settings: SessionSettings,
    doc_id: Option<String>,
    state: SessionState,
    field: TextField,
    insert: InsertController,
    options: Options,
    focused: bool,
    window_title: Arc<Mutex<String>>,
    debouncer: Debouncer,
    changes: Option<ChangeSubscription>,
}

impl EditorSession {
    pub fn new(
        store: DocumentStore,
        downloader: Arc<dyn Downloader>,
        doc_id: Option<&str>,
        settings: SessionSettings,
    ) -> Self {
        let debouncer = Debouncer::new(settings.debounce);
        Self {
            store,
            downloader,
            settings,
            doc_id: normalize_doc_id(doc_id),
            state: SessionState::Uninitialized,
            field: TextField::new(),
            insert: InsertController::new(Autoformat::default()),
            options: Options::default(),
            focused: false,
            window_title: Arc::new(Mutex::new(NEW_DOCUMENT_TITLE.to_string())),
            debouncer,
            changes: None,
        }
    }

    /// Replace the engine, e.g. to install a different word predicate.
    /// Toggles are still driven by the options record.
    pub fn with_autoformat(mut self, autoformat: Autoformat) -> Self {
        self.insert = InsertController::new(autoformat);
        self.insert.autoformat.apply_options(&self.options);
        self
    }

    /// Load options and the document, then become ready for input.
    pub async fn start(&mut self) {
        if self.state != SessionState::Uninitialized {
            return;
        }
        self.state = SessionState::Loading;
        tracing::debug!("Session {:?} loading", self.doc_id);

        self.changes = Some(self.store.subscribe());

        let options = self.store.load_options().await;
        let record = match &self.doc_id {
            Some(id) => self.store.load_document(id).await,
            None => None,
        };

        self.apply_options(options);
        match record {
            Some(record) => self.display(&record),
            None => self.set_window_title(""),
        }

        self.state = SessionState::Ready;
        tracing::info!(
            "Session {:?} ready ({} chars)",
            self.doc_id,
            self.field.len()
        );
    }

    /// Feed one key to the field. Returns whether the text changed; changes
    /// schedule a save.
    pub fn handle_key(&mut self, key: EditorKey) -> bool {
        if self.state != SessionState::Ready {
            return false;
        }

        let changed = self.insert.handle_key(key, &mut self.field);
        if changed {
            self.schedule_save();
        }
        changed
    }

    fn schedule_save(&mut self) {
        let Some(id) = self.doc_id.clone() else {
            tracing::debug!("Edit not persisted, session has no document id");
            return;
        };

        let text = self.field.text().to_string();
        let caret = self.field.caret();
        let store = self.store.clone();
        let window_title = Arc::clone(&self.window_title);
        let title_length = self.settings.title_length;

        self.debouncer.schedule(async move {
            persist(&store, &id, text, caret, title_length, &window_title).await;
        });
    }

    /// Write the current buffer now, replacing any scheduled save.
    pub async fn save_now(&mut self) {
        let Some(id) = self.doc_id.clone() else {
            return;
        };

        let text = self.field.text().to_string();
        let caret = self.field.caret();
        let store = self.store.clone();
        let window_title = Arc::clone(&self.window_title);
        let title_length = self.settings.title_length;

        self.debouncer
            .run_now(persist(&store, &id, text, caret, title_length, &window_title))
            .await;
    }

    /// Persist a pending save immediately, or wait for one in flight.
    pub async fn flush(&mut self) {
        if self.debouncer.is_pending() {
            self.save_now().await;
        } else {
            self.debouncer.settle().await;
        }
    }

    /// Flush and stop listening for store changes.
    pub async fn close(&mut self) {
        self.flush().await;
        self.changes = None;
        tracing::debug!("Session {:?} closed", self.doc_id);
    }

    /// Next change event from the store. Pends forever once unsubscribed.
    pub async fn next_change(&mut self) -> Option<StoreChange> {
        let Some(subscription) = self.changes.as_mut() else {
            return std::future::pending().await;
        };

        let change = subscription.recv().await;
        if change.is_none() {
            self.changes = None;
        }
        change
    }

    /// React to a store change: reload our document when the view is not
    /// focused, re-apply options always.
    pub async fn handle_store_change(&mut self, change: &StoreChange) {
        if self.state != SessionState::Ready {
            return;
        }

        if let Some(id) = self.doc_id.clone() {
            if change.contains(&id) && !self.focused {
                match self.store.load_document(&id).await {
                    Some(record) if !record.text.is_empty() => {
                        tracing::debug!("Reloading {:?} after external change", id);
                        self.display(&record);
                    }
                    _ => {}
                }
            }
        }

        if change.contains(OPTIONS_KEY) {
            let options = self.store.load_options().await;
            tracing::debug!("Applying changed options {:?}", options);
            self.apply_options(options);
        }
    }

    /// Menu commands only reach the focused view.
    pub async fn handle_command(&mut self, command: SessionCommand) -> Option<String> {
        if !self.focused {
            return None;
        }
        match command {
            SessionCommand::Download => self.export().await,
        }
    }

    /// Export through the session's downloader. Returns the filename used,
    /// or `None` when the export failed (the failure is logged).
    pub async fn export(&self) -> Option<String> {
        let downloader = Arc::clone(&self.downloader);
        self.export_to(downloader.as_ref()).await
    }

    pub async fn export_to(&self, downloader: &dyn Downloader) -> Option<String> {
        let text = self.field.text();
        let filename = export_filename(text, self.settings.filename_length);

        match downloader.download_file(text, &filename).await {
            Ok(()) => Some(filename),
            Err(e) => {
                tracing::warn!("Export of {:?} failed: {}", filename, e);
                None
            }
        }
    }

    fn display(&mut self, record: &DocumentRecord) {
        self.field.set_text(record.text.as_str());
        self.set_window_title(&record.title);
        self.field.set_caret(record.caret);
    }

    fn apply_options(&mut self, options: Options) {
        self.options = options;
        self.insert.autoformat.apply_options(&options);
    }

    fn set_window_title(&self, title: &str) {
        set_title(&self.window_title, title);
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn doc_id(&self) -> Option<&str> {
        self.doc_id.as_deref()
    }

    pub fn text(&self) -> &str {
        self.field.text()
    }

    pub fn field(&self) -> &TextField {
        &self.field
    }

    pub fn window_title(&self) -> String {
        self.window_title.lock().clone()
    }

    pub fn options(&self) -> Options {
        self.options
    }

    pub fn view_settings(&self) -> ViewSettings {
        ViewSettings {
            spell_check: self.options.spell_check,
            line_length: self.options.line_length,
        }
    }

    pub fn autoformat(&self) -> &Autoformat {
        &self.insert.autoformat
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// An edit is waiting out the debounce window.
    pub fn is_dirty(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn length_class(&self) -> LengthClass {
        LengthClass::for_text(self.field.text())
    }
}

fn set_title(window_title: &Mutex<String>, title: &str) {
    let mut current = window_title.lock();
    *current = if title.is_empty() {
        NEW_DOCUMENT_TITLE.to_string()
    } else {
        title.to_string()
    };
}

/// Read-modify-write of one document record. The first save stamps `type`,
/// `id` and `created`; the title is only rewritten when it changed.
async fn persist(
    store: &DocumentStore,
    id: &str,
    text: String,
    caret: usize,
    title_length: usize,
    window_title: &Mutex<String>,
) {
    let mut record = store.load(id, Map::new()).await;
    let title = derive_title(&text, title_length);
    let now = now_timestamp();

    if record.is_empty() {
        record.insert("type".to_string(), json!(DOC_TYPE));
        record.insert("id".to_string(), json!(id));
        record.insert("title".to_string(), json!(title));
        record.insert("created".to_string(), json!(now));
        set_title(window_title, &title);
    } else if record.get("title").and_then(Value::as_str) != Some(title.as_str()) {
        record.insert("title".to_string(), json!(title));
        set_title(window_title, &title);
    }

    record.insert("modified".to_string(), json!(now));
    record.insert("text".to_string(), json!(text));
    record.insert("caret".to_string(), json!(caret));

    tracing::debug!("Saving {:?} ({} chars)", id, text.chars().count());
    store.save(id, record).await;
}
