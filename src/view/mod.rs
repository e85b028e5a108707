/// View subsystem - Terminal rendering of the editor screen
///
/// The renderer only sees the document through the ViewModel trait: lines,
/// cursor position and selection. Soft wrapping, the centered narrow column
/// and the title/status bars live here.

pub mod renderer;
pub mod view_model;

// Re-export public interface
pub use renderer::{NARROW_COLUMNS, RenderParams, View, VisualRow};
pub use view_model::{CursorPosition, FieldViewModel, ViewModel};
