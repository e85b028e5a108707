use super::locator;

/// A single primitive change to a text field, as the autoformat engine
/// requests it. Sequences of edits are applied in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    InsertText(String),
    DeleteBackward,
    MoveCaret(isize),
    WrapSelection { open: char, close: char },
}

/// Editable buffer plus selection, the host field the engine acts on.
///
/// Offsets count chars. `anchor` stays put while `head` moves when a
/// selection is extended; a collapsed caret has `anchor == head`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    text: String,
    anchor: usize,
    head: usize,
}

impl TextField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let len = text.chars().count();
        Self {
            text,
            anchor: len,
            head: len,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the whole buffer, keeping the caret where it fits.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        let len = self.len();
        self.anchor = self.anchor.min(len);
        self.head = self.head.min(len);
    }

    pub fn selection_start(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn selection_end(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn has_selection(&self) -> bool {
        self.anchor != self.head
    }

    /// Caret offset as persisted: the selection end.
    pub fn caret(&self) -> usize {
        self.selection_end()
    }

    pub fn set_caret(&mut self, offset: usize) {
        let offset = offset.min(self.len());
        self.anchor = offset;
        self.head = offset;
    }

    pub fn select(&mut self, start: usize, end: usize) {
        let len = self.len();
        self.anchor = start.min(len);
        self.head = end.min(len);
    }

    pub fn selected_text(&self) -> String {
        let start = self.selection_start();
        self.text
            .chars()
            .skip(start)
            .take(self.selection_end() - start)
            .collect()
    }

    pub fn char_after_caret(&self) -> Option<char> {
        locator::char_at(&self.text, self.selection_end())
    }

    pub fn current_line(&self) -> String {
        locator::current_line(&self.text, self.selection_start())
    }

    pub fn current_word(&self) -> String {
        locator::current_word(&self.text, self.selection_start())
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map_or(self.text.len(), |(byte, _)| byte)
    }

    /// Replace the selection (or insert at the caret) and leave the caret
    /// after the inserted text.
    pub fn insert_text(&mut self, text: &str) {
        let start = self.selection_start();
        let range = self.byte_index(start)..self.byte_index(self.selection_end());
        self.text.replace_range(range, text);
        self.set_caret(start + text.chars().count());
    }

    /// Delete the selection, or the single char before the caret.
    pub fn delete_backward(&mut self) {
        if self.has_selection() {
            self.insert_text("");
            return;
        }
        let caret = self.head;
        if caret == 0 {
            return;
        }
        let range = self.byte_index(caret - 1)..self.byte_index(caret);
        self.text.replace_range(range, "");
        self.set_caret(caret - 1);
    }

    pub fn delete_forward(&mut self) {
        if self.has_selection() {
            self.insert_text("");
            return;
        }
        let caret = self.head;
        if caret >= self.len() {
            return;
        }
        let range = self.byte_index(caret)..self.byte_index(caret + 1);
        self.text.replace_range(range, "");
    }

    /// Negative deltas pull the selection end back; positive deltas push the
    /// selection start forward. On a collapsed caret both just move it.
    pub fn move_caret(&mut self, delta: isize) {
        let len = self.len();
        let (mut start, mut end) = (self.selection_start(), self.selection_end());
        if delta < 0 {
            end = end.saturating_sub(delta.unsigned_abs());
            start = start.min(end);
        } else {
            start = (start + delta as usize).min(len);
            end = end.max(start);
        }
        self.anchor = start;
        self.head = end;
    }

    pub fn apply(&mut self, edit: &Edit) {
        match edit {
            Edit::InsertText(text) => self.insert_text(text),
            Edit::DeleteBackward => self.delete_backward(),
            Edit::MoveCaret(delta) => self.move_caret(*delta),
            Edit::WrapSelection { open, close } => {
                let start = self.selection_start();
                let wrapped = format!("{open}{}{close}", self.selected_text());
                self.insert_text(&wrapped);
                self.set_caret(start + 1);
            }
        }
    }

    pub fn move_left(&mut self) {
        if self.has_selection() {
            self.set_caret(self.selection_start());
        } else {
            self.set_caret(self.head.saturating_sub(1));
        }
    }

    pub fn move_right(&mut self) {
        if self.has_selection() {
            self.set_caret(self.selection_end());
        } else {
            self.set_caret(self.head + 1);
        }
    }

    pub fn extend_left(&mut self) {
        self.head = self.head.saturating_sub(1);
    }

    pub fn extend_right(&mut self) {
        self.head = (self.head + 1).min(self.len());
    }

    pub fn move_home(&mut self) {
        let (start, _) = locator::line_bounds(&self.text, self.head);
        self.set_caret(start);
    }

    pub fn move_end(&mut self) {
        let (_, end) = locator::line_bounds(&self.text, self.head);
        self.set_caret(end);
    }

    pub fn move_up(&mut self) {
        let (start, _) = locator::line_bounds(&self.text, self.head);
        if start == 0 {
            self.set_caret(0);
            return;
        }
        let column = self.head - start;
        let (prev_start, prev_end) = locator::line_bounds(&self.text, start - 1);
        self.set_caret(prev_start + column.min(prev_end - prev_start));
    }

    pub fn move_down(&mut self) {
        let (start, end) = locator::line_bounds(&self.text, self.head);
        if end >= self.len() {
            self.set_caret(self.len());
            return;
        }
        let column = self.head - start;
        let (next_start, next_end) = locator::line_bounds(&self.text, end + 1);
        self.set_caret(next_start + column.min(next_end - next_start));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_selection() {
        let mut field = TextField::from_text("hello world");
        field.select(6, 11);
        field.insert_text("there");
        assert_eq!(field.text(), "hello there");
        assert_eq!(field.caret(), 11);
        assert!(!field.has_selection());
    }

    #[test]
    fn test_delete_backward() {
        let mut field = TextField::from_text("abc");
        field.delete_backward();
        assert_eq!(field.text(), "ab");
        assert_eq!(field.caret(), 2);

        field.set_caret(0);
        field.delete_backward();
        assert_eq!(field.text(), "ab");
    }

    #[test]
    fn test_delete_backward_multibyte() {
        let mut field = TextField::from_text("añb");
        field.set_caret(2);
        field.delete_backward();
        assert_eq!(field.text(), "ab");
        assert_eq!(field.caret(), 1);
    }

    #[test]
    fn test_delete_forward() {
        let mut field = TextField::from_text("abc");
        field.set_caret(1);
        field.delete_forward();
        assert_eq!(field.text(), "ac");
        assert_eq!(field.caret(), 1);
    }

    #[test]
    fn test_move_caret_collapsed() {
        let mut field = TextField::from_text("()");
        field.move_caret(-1);
        assert_eq!((field.selection_start(), field.selection_end()), (1, 1));
        field.move_caret(1);
        assert_eq!((field.selection_start(), field.selection_end()), (2, 2));
        field.move_caret(5);
        assert_eq!(field.caret(), 2);
    }

    #[test]
    fn test_move_caret_on_selection() {
        let mut field = TextField::from_text("abcdef");
        field.select(1, 4);
        field.move_caret(-1);
        assert_eq!((field.selection_start(), field.selection_end()), (1, 3));

        field.select(1, 4);
        field.move_caret(5);
        assert_eq!((field.selection_start(), field.selection_end()), (6, 6));
    }

    #[test]
    fn test_wrap_selection() {
        let mut field = TextField::from_text("say hi now");
        field.select(4, 6);
        field.apply(&Edit::WrapSelection { open: '(', close: ')' });
        assert_eq!(field.text(), "say (hi) now");
        assert_eq!(field.caret(), 5);
    }

    #[test]
    fn test_vertical_movement_clamps_column() {
        let mut field = TextField::from_text("long line\nab\nthird line");
        field.set_caret(7);
        field.move_down();
        assert_eq!(field.caret(), 12);
        field.move_down();
        assert_eq!(field.caret(), 15);
        field.move_up();
        field.move_up();
        assert_eq!(field.caret(), 2);
        field.move_up();
        assert_eq!(field.caret(), 0);
    }

    #[test]
    fn test_home_end_and_extend() {
        let mut field = TextField::from_text("one\ntwo");
        field.set_caret(5);
        field.move_home();
        assert_eq!(field.caret(), 4);
        field.move_end();
        assert_eq!(field.caret(), 7);
        field.extend_left();
        field.extend_left();
        assert_eq!(field.selected_text(), "wo");
        field.move_left();
        assert_eq!(field.caret(), 5);
    }

    #[test]
    fn test_set_text_clamps_caret() {
        let mut field = TextField::from_text("a long buffer");
        field.set_text("ab");
        assert_eq!(field.caret(), 2);
    }
}
