/// View Model - Abstracts the text field for the view layer
/// This keeps the renderer free of any knowledge about char offsets and
/// selection anchors
use crate::document_model::TextField;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CursorPosition {
    pub line: usize,
    pub column: usize,
}

/// The ViewModel trait provides everything the view needs to render
pub trait ViewModel {
    /// Get current cursor position
    fn get_cursor_position(&self) -> CursorPosition;

    /// Get total line count
    fn get_line_count(&self) -> usize;

    /// Get a specific line by number
    fn get_line(&self, line_number: usize) -> Option<String>;

    /// Selected range as (start, end), end exclusive
    fn get_selection(&self) -> Option<(CursorPosition, CursorPosition)>;
}

/// Adapts a `TextField` to `ViewModel`
pub struct FieldViewModel<'a> {
    field: &'a TextField,
}

impl<'a> FieldViewModel<'a> {
    pub fn new(field: &'a TextField) -> Self {
        Self { field }
    }

    fn position_of(&self, offset: usize) -> CursorPosition {
        let mut line = 0;
        let mut column = 0;
        for c in self.field.text().chars().take(offset) {
            if c == '\n' {
                line += 1;
                column = 0;
            } else {
                column += 1;
            }
        }
        CursorPosition { line, column }
    }
}

impl<'a> ViewModel for FieldViewModel<'a> {
    fn get_cursor_position(&self) -> CursorPosition {
        self.position_of(self.field.caret())
    }

    fn get_line_count(&self) -> usize {
        self.field.text().split('\n').count()
    }

    fn get_line(&self, line_number: usize) -> Option<String> {
        self.field.text().split('\n').nth(line_number).map(str::to_string)
    }

    fn get_selection(&self) -> Option<(CursorPosition, CursorPosition)> {
        self.field.has_selection().then(|| {
            (
                self.position_of(self.field.selection_start()),
                self.position_of(self.field.selection_end()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_position() {
        let mut field = TextField::from_text("one\ntwo\n");
        let model = FieldViewModel::new(&field);
        assert_eq!(model.get_cursor_position(), CursorPosition { line: 2, column: 0 });
        assert_eq!(model.get_line_count(), 3);
        assert_eq!(model.get_line(1).as_deref(), Some("two"));
        assert_eq!(model.get_line(2).as_deref(), Some(""));
        assert_eq!(model.get_line(3), None);

        field.set_caret(5);
        let model = FieldViewModel::new(&field);
        assert_eq!(model.get_cursor_position(), CursorPosition { line: 1, column: 1 });
    }

    #[test]
    fn test_selection() {
        let mut field = TextField::from_text("ab\ncd");
        assert_eq!(FieldViewModel::new(&field).get_selection(), None);

        field.select(1, 4);
        assert_eq!(
            FieldViewModel::new(&field).get_selection(),
            Some((
                CursorPosition { line: 0, column: 1 },
                CursorPosition { line: 1, column: 1 }
            ))
        );
    }

    #[test]
    fn test_empty_field_has_one_line() {
        let field = TextField::new();
        let model = FieldViewModel::new(&field);
        assert_eq!(model.get_line_count(), 1);
        assert_eq!(model.get_cursor_position(), CursorPosition { line: 0, column: 0 });
    }
}
