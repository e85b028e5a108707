use super::autoformat::{Autoformat, KeyOutcome};
use super::key_handler::EditorKey;
use crate::document_model::TextField;

/// Routes field keys through the autoformat engine and falls back to the
/// field's own behavior when the engine passes.
#[derive(Debug, Clone, Default)]
pub struct InsertController {
    pub autoformat: Autoformat,
}

impl InsertController {
    pub fn new(autoformat: Autoformat) -> Self {
        Self { autoformat }
    }

    /// Returns true when the buffer text changed.
    pub fn handle_key(&self, key: EditorKey, field: &mut TextField) -> bool {
        let text_before = key.is_input().then(|| field.text().to_string());

        match self.autoformat.on_key(key, field) {
            KeyOutcome::Replace(edits) => {
                for edit in &edits {
                    field.apply(edit);
                }
            }
            KeyOutcome::PassThrough => Self::apply_default(key, field),
        }

        match text_before {
            Some(text) => field.text() != text,
            None => false,
        }
    }

    /// What the field does with a key on its own.
    pub fn apply_default(key: EditorKey, field: &mut TextField) {
        match key {
            EditorKey::Char(c) => field.insert_text(c.encode_utf8(&mut [0; 4])),
            EditorKey::Enter => field.insert_text("\n"),
            EditorKey::Tab => field.insert_text("\t"),
            EditorKey::Backspace => field.delete_backward(),
            EditorKey::Delete => field.delete_forward(),
            EditorKey::Left => field.move_left(),
            EditorKey::Right => field.move_right(),
            EditorKey::Up => field.move_up(),
            EditorKey::Down => field.move_down(),
            EditorKey::Home => field.move_home(),
            EditorKey::End => field.move_end(),
            EditorKey::ExtendLeft => field.extend_left(),
            EditorKey::ExtendRight => field.extend_right(),
        }
    }
}
