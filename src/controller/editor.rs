use crossterm::{
    event::{DisableFocusChange, EnableFocusChange, Event, EventStream, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use std::io::{self, stdout};
use std::time::Duration;

use super::key_handler::{AppCommand, KeyAction, KeyHandler};
use super::menu::{MenuCommand, apply_menu_command};
use super::session::{EditorSession, SessionCommand};
use crate::error::Result;
use crate::export::ClipboardDownloader;
use crate::storage::DocumentStore;
use crate::view::{FieldViewModel, RenderParams, View};

/// How often the screen is refreshed while a save is pending, so the
/// unsaved marker clears once it lands.
const DIRTY_REFRESH: Duration = Duration::from_millis(250);

/// Terminal host for one editor session.
pub struct EditorApp {
    session: EditorSession,
    store: DocumentStore,
    clipboard: ClipboardDownloader,
    view: View,
    status_message: String,
    watch_interval: Option<Duration>,
}

impl EditorApp {
    pub fn new(session: EditorSession, store: DocumentStore) -> Self {
        Self {
            session,
            store,
            clipboard: ClipboardDownloader::new(),
            view: View::new(),
            status_message: String::new(),
            watch_interval: None,
        }
    }

    /// Poll the store for writes by other processes while running.
    pub fn with_watch_interval(mut self, interval: Option<Duration>) -> Self {
        self.watch_interval = interval;
        self
    }

    pub fn with_tab_stop(mut self, tab_stop: usize) -> Self {
        self.view.set_tab_stop(tab_stop);
        self
    }

    pub async fn run(mut self) -> Result<()> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, EnableFocusChange)?;

        let result = self.run_loop().await;
        self.session.close().await;

        disable_raw_mode()?;
        execute!(stdout(), DisableFocusChange, LeaveAlternateScreen)?;

        result
    }

    async fn run_loop(&mut self) -> Result<()> {
        self.session.start().await;
        // Terminals without focus reporting never send FocusGained.
        self.session.set_focused(true);

        let _watcher = self.watch_interval.map(|interval| self.store.watch(interval));
        let mut events = EventStream::new();

        loop {
            self.render()?;

            let dirty = self.session.is_dirty();
            tokio::select! {
                event = events.next() => match event {
                    Some(Ok(event)) => {
                        if self.handle_event(event).await {
                            break;
                        }
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },
                change = self.session.next_change() => {
                    if let Some(change) = change {
                        self.session.handle_store_change(&change).await;
                    }
                }
                _ = tokio::time::sleep(DIRTY_REFRESH), if dirty => {}
            }
        }

        tracing::info!("Editor closed");
        Ok(())
    }

    fn render(&mut self) -> io::Result<()> {
        let view_settings = self.session.view_settings();
        let title = self.session.window_title();
        let view_model = FieldViewModel::new(self.session.field());

        let params = RenderParams {
            title: &title,
            status_message: &self.status_message,
            line_length: view_settings.line_length,
            spell_check: view_settings.spell_check,
            dirty: self.session.is_dirty(),
            length_class: self.session.length_class(),
        };
        self.view.render(&view_model, &params)
    }

    /// Returns true when the editor should quit.
    async fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                self.handle_key_event(key_event).await
            }
            Event::FocusGained => {
                self.session.set_focused(true);
                false
            }
            Event::FocusLost => {
                self.session.set_focused(false);
                false
            }
            Event::Resize(..) => {
                self.view.force_redraw();
                false
            }
            _ => false,
        }
    }

    async fn handle_key_event(&mut self, key_event: KeyEvent) -> bool {
        match KeyHandler::parse_key(&key_event) {
            Some(KeyAction::Edit(key)) => {
                self.status_message.clear();
                self.session.handle_key(key);
                false
            }
            Some(KeyAction::Command(command)) => self.handle_command(command).await,
            None => false,
        }
    }

    async fn handle_command(&mut self, command: AppCommand) -> bool {
        match command {
            AppCommand::Quit => return true,
            AppCommand::Download => {
                self.status_message = match self.session.handle_command(SessionCommand::Download).await {
                    Some(filename) => format!("Exported {filename}"),
                    None => "Export failed".to_string(),
                };
            }
            AppCommand::CopyToClipboard => {
                self.status_message = match self.session.export_to(&self.clipboard).await {
                    Some(_) => "Copied to clipboard".to_string(),
                    None => "Clipboard unavailable".to_string(),
                };
            }
            toggle => {
                if let Some(menu_command) = MenuCommand::for_toggle(toggle, &self.session.options()) {
                    apply_menu_command(&self.store, menu_command).await;
                    self.status_message = menu_command.to_string();
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::session::SessionSettings;
    use crate::document_model::LineLength;
    use crate::export::DirectoryDownloader;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    async fn app(store: &DocumentStore, export_dir: &TempDir) -> EditorApp {
        let session = EditorSession::new(
            store.clone(),
            Arc::new(DirectoryDownloader::new(export_dir.path())),
            Some("k3j9x2a1"),
            SessionSettings::default(),
        );
        let mut app = EditorApp::new(session, store.clone());
        app.session.start().await;
        app.session.set_focused(true);
        app
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_reaches_session() {
        let store = DocumentStore::in_memory();
        let dir = TempDir::new().unwrap();
        let mut app = app(&store, &dir).await;

        for c in "- a".chars() {
            assert!(!app.handle_event(key(KeyCode::Char(c), KeyModifiers::NONE)).await);
        }
        app.handle_event(key(KeyCode::Enter, KeyModifiers::NONE)).await;
        assert_eq!(app.session.text(), "- a\n- ");

        app.session.flush().await;
        assert_eq!(store.load_document("k3j9x2a1").await.unwrap().text, "- a\n- ");
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_release_ignored() {
        let store = DocumentStore::in_memory();
        let dir = TempDir::new().unwrap();
        let mut app = app(&store, &dir).await;

        let release = Event::Key(KeyEvent {
            code: KeyCode::Char('x'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        app.handle_event(release).await;
        assert_eq!(app.session.text(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_events() {
        let store = DocumentStore::in_memory();
        let dir = TempDir::new().unwrap();
        let mut app = app(&store, &dir).await;

        app.handle_event(Event::FocusLost).await;
        assert!(!app.session.is_focused());
        app.handle_event(Event::FocusGained).await;
        assert!(app.session.is_focused());
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_goes_through_store() {
        let store = DocumentStore::in_memory();
        let dir = TempDir::new().unwrap();
        let mut app = app(&store, &dir).await;

        app.handle_event(key(KeyCode::Char('l'), KeyModifiers::CONTROL)).await;
        assert_eq!(app.status_message, "lineLength_wide");
        assert_eq!(store.load_options().await.line_length, LineLength::Wide);

        // the session sees it through the change event
        let change = app.session.next_change().await.unwrap();
        app.session.handle_store_change(&change).await;
        assert_eq!(app.session.view_settings().line_length, LineLength::Wide);
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_and_quit() {
        let store = DocumentStore::in_memory();
        let dir = TempDir::new().unwrap();
        let mut app = app(&store, &dir).await;

        for c in "Plan".chars() {
            app.handle_event(key(KeyCode::Char(c), KeyModifiers::NONE)).await;
        }
        app.handle_event(key(KeyCode::Char('s'), KeyModifiers::CONTROL)).await;
        assert_eq!(app.status_message, "Exported Plan.txt");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("Plan.txt")).unwrap(),
            "Plan"
        );

        assert!(app.handle_event(key(KeyCode::Char('q'), KeyModifiers::CONTROL)).await);
    }
}
