/// Controller subsystem - Turns keystrokes into edits and edits into saves
///
/// The autoformat engine decides per key what the text field should do, the
/// insert controller applies it, and the editor session owns one document:
/// debounced persistence, reloads on external changes and exports. The
/// terminal host and the menu commands sit on top.

pub mod autoformat;
pub mod debounce;
pub mod editor;
pub mod insert;
pub mod key_handler;
pub mod menu;
pub mod session;

// Re-export public interface
pub use autoformat::{Autoformat, KeyOutcome, WordPredicate, default_word_predicate};
pub use debounce::Debouncer;
pub use editor::EditorApp;
pub use insert::InsertController;
pub use key_handler::{AppCommand, EditorKey, KeyAction, KeyHandler};
pub use menu::{MENU_ITEMS, MenuCommand, apply_menu_command, checked_items};
pub use session::{
    EditorSession, NEW_DOCUMENT_TITLE, SessionCommand, SessionSettings, SessionState, ViewSettings,
    normalize_doc_id,
};
