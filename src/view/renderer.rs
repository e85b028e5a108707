use super::view_model::{CursorPosition, ViewModel};
use crate::document_model::{LengthClass, LineLength};
use crossterm::{
    cursor, queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{Clear, ClearType, size},
};
use std::io::{self, Write, stdout};
use unicode_width::UnicodeWidthChar;

/// Column count of the narrow layout.
pub const NARROW_COLUMNS: usize = 72;

#[derive(Clone)]
pub struct RenderParams<'a> {
    pub title: &'a str,
    pub status_message: &'a str,
    pub line_length: LineLength,
    pub spell_check: bool,
    pub dirty: bool,
    pub length_class: LengthClass,
}

/// One screen row of a soft-wrapped line: chars `start..end` of `line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualRow {
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

pub struct View {
    last_rows: Vec<String>,
    last_title_bar: String,
    last_status: String,
    last_terminal_size: (u16, u16),
    last_line_length: LineLength,
    scroll_offset: usize,
    needs_full_redraw: bool,
    tab_stop: usize,
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

impl View {
    pub fn new() -> Self {
        Self {
            last_rows: Vec::new(),
            last_title_bar: String::new(),
            last_status: String::new(),
            last_terminal_size: (0, 0),
            last_line_length: LineLength::Narrow,
            scroll_offset: 0,
            needs_full_redraw: true,
            tab_stop: 4,
        }
    }

    pub fn render(&mut self, view_model: &dyn ViewModel, params: &RenderParams<'_>) -> io::Result<()> {
        let (width, height) = size()?;
        let mut out = stdout().lock();

        let current_size = (width, height);
        if self.last_terminal_size != current_size || self.last_line_length != params.line_length {
            self.needs_full_redraw = true;
            self.last_terminal_size = current_size;
            self.last_line_length = params.line_length;
        }

        if self.needs_full_redraw {
            queue!(out, Clear(ClearType::All))?;
            self.needs_full_redraw = false;
            self.last_rows.clear();
            self.last_title_bar.clear();
            self.last_status.clear();
        }

        let (margin, text_width) = Self::text_area(width as usize, params.line_length);
        // title bar on top, status line at the bottom
        let max_rows = (height as usize).saturating_sub(2);

        let rows = self.layout(view_model, text_width);
        let cursor = view_model.get_cursor_position();
        let cursor_row = Self::row_of(&rows, cursor);
        self.adjust_scroll_to_cursor(cursor_row, max_rows);

        let title_bar = Self::title_bar(params, width as usize);
        if self.last_title_bar != title_bar {
            queue!(
                out,
                cursor::MoveTo(0, 0),
                SetAttribute(Attribute::Reverse),
                Print(&title_bar),
                SetAttribute(Attribute::Reset)
            )?;
            self.last_title_bar = title_bar;
        }

        let selection = view_model.get_selection();
        let visible_rows: Vec<String> = (0..max_rows)
            .map(|i| match rows.get(self.scroll_offset + i) {
                Some(row) => {
                    let line = view_model.get_line(row.line).unwrap_or_default();
                    format!("{}{}", " ".repeat(margin), self.render_row(&line, row, selection))
                }
                None => String::new(),
            })
            .collect();

        if self.last_rows != visible_rows {
            // Only redraw changed rows
            for (i, row) in visible_rows.iter().enumerate() {
                if self.last_rows.get(i) != Some(row) {
                    queue!(
                        out,
                        cursor::MoveTo(0, (i + 1) as u16),
                        Clear(ClearType::CurrentLine),
                        Print(row)
                    )?;
                }
            }
            self.last_rows = visible_rows;
        }

        let status = if params.status_message.is_empty() {
            crate::controller::KeyHandler::help_text().to_string()
        } else {
            params.status_message.to_string()
        };
        if self.last_status != status {
            let clipped: String = status.chars().take(width as usize).collect();
            queue!(
                out,
                cursor::MoveTo(0, height.saturating_sub(1)),
                Clear(ClearType::CurrentLine),
                Print(clipped)
            )?;
            self.last_status = status;
        }

        let line = view_model.get_line(cursor.line).unwrap_or_default();
        let row = rows.get(cursor_row).copied().unwrap_or(VisualRow {
            line: cursor.line,
            start: 0,
            end: 0,
        });
        let row_text: String = line.chars().skip(row.start).collect();
        let column = self.calculate_display_column(&row_text, cursor.column.saturating_sub(row.start));
        let screen_line = cursor_row.saturating_sub(self.scroll_offset) + 1;
        let screen_column = margin + column.min(text_width.saturating_sub(1));

        // The cursor has to be put back after every row redraw.
        queue!(out, cursor::MoveTo(screen_column as u16, screen_line as u16))?;

        out.flush()?;
        Ok(())
    }

    pub fn force_redraw(&mut self) {
        self.needs_full_redraw = true;
    }

    pub fn set_tab_stop(&mut self, tab_stop: usize) {
        if self.tab_stop != tab_stop && tab_stop > 0 {
            self.tab_stop = tab_stop;
            self.needs_full_redraw = true;
        }
    }

    pub fn get_tab_stop(&self) -> usize {
        self.tab_stop
    }

    pub fn get_scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Left margin and usable width: narrow is a centered column, wide
    /// uses the whole terminal.
    pub fn text_area(terminal_width: usize, line_length: LineLength) -> (usize, usize) {
        match line_length {
            LineLength::Narrow if terminal_width > NARROW_COLUMNS => {
                ((terminal_width - NARROW_COLUMNS) / 2, NARROW_COLUMNS)
            }
            _ => (0, terminal_width.max(1)),
        }
    }

    /// Every visual row of the document, in order.
    pub fn layout(&self, view_model: &dyn ViewModel, width: usize) -> Vec<VisualRow> {
        let mut rows = Vec::new();
        for line_idx in 0..view_model.get_line_count() {
            let line = view_model.get_line(line_idx).unwrap_or_default();
            let len = line.chars().count();
            let starts = self.wrap_points(&line, width);
            for (i, &start) in starts.iter().enumerate() {
                let end = starts.get(i + 1).copied().unwrap_or(len);
                rows.push(VisualRow {
                    line: line_idx,
                    start,
                    end,
                });
            }
        }
        rows
    }

    /// Char indices where each row of `line` starts. Breaks after the last
    /// space that fits, or mid-word when a word is wider than the row.
    pub fn wrap_points(&self, line: &str, width: usize) -> Vec<usize> {
        let width = width.max(1);
        let chars: Vec<char> = line.chars().collect();
        let mut starts = vec![0];
        let mut row_start = 0;
        let mut col = 0;
        let mut break_after: Option<usize> = None;

        let mut i = 0;
        while i < chars.len() {
            let w = self.char_width(chars[i], col);
            if col + w > width && i > row_start {
                let start = match break_after {
                    Some(b) if b > row_start && b <= i => b,
                    _ => i,
                };
                starts.push(start);
                row_start = start;
                col = 0;
                break_after = None;
                i = start;
                continue;
            }
            col += w;
            if chars[i] == ' ' {
                break_after = Some(i + 1);
            }
            i += 1;
        }
        starts
    }

    /// Index of the row holding the cursor. A cursor sitting on a wrap
    /// point shows at the start of the following row.
    fn row_of(rows: &[VisualRow], cursor: CursorPosition) -> usize {
        rows.iter()
            .rposition(|row| row.line == cursor.line && row.start <= cursor.column)
            .unwrap_or(0)
    }

    fn render_row(
        &self,
        line: &str,
        row: &VisualRow,
        selection: Option<(CursorPosition, CursorPosition)>,
    ) -> String {
        let mut result = String::new();
        let mut col = 0;
        let mut highlighted = false;

        for (i, ch) in line.chars().enumerate().skip(row.start).take(row.end - row.start) {
            let pos = CursorPosition {
                line: row.line,
                column: i,
            };
            let selected = selection.is_some_and(|(start, end)| start <= pos && pos < end);
            if selected != highlighted {
                let attribute = if selected { Attribute::Reverse } else { Attribute::NoReverse };
                result.push_str(&format!("{}", SetAttribute(attribute)));
                highlighted = selected;
            }

            let w = self.char_width(ch, col);
            match ch {
                '\t' => result.push_str(&" ".repeat(w)),
                c if c.is_control() => result.push(' '),
                c => result.push(c),
            }
            col += w;
        }

        if highlighted {
            result.push_str(&format!("{}", SetAttribute(Attribute::NoReverse)));
        }
        result
    }

    fn title_bar(params: &RenderParams<'_>, width: usize) -> String {
        let mut flags = Vec::new();
        if params.dirty {
            flags.push("*");
        }
        if params.spell_check {
            flags.push("spell");
        }
        flags.push(params.length_class.glyph());
        let right = flags.join(" ");

        let right_width = right.chars().count() + 1;
        let title_width = width.saturating_sub(right_width + 1);
        let title: String = params.title.chars().take(title_width).collect();
        let used = 1 + title.chars().count();
        let padding = width.saturating_sub(used + right_width);
        format!(" {title}{}{right} ", " ".repeat(padding))
            .chars()
            .take(width)
            .collect()
    }

    fn adjust_scroll_to_cursor(&mut self, cursor_row: usize, visible_rows: usize) {
        if cursor_row < self.scroll_offset {
            self.scroll_offset = cursor_row;
        } else if visible_rows > 0 && cursor_row >= self.scroll_offset + visible_rows {
            self.scroll_offset = cursor_row - visible_rows + 1;
        }
    }

    fn char_width(&self, c: char, col: usize) -> usize {
        match c {
            '\t' => self.tab_stop - col % self.tab_stop,
            c => c.width().unwrap_or(1),
        }
    }

    /// Convert logical character position to display column position
    /// Accounts for tab expansion and Unicode character widths
    fn calculate_display_column(&self, text: &str, logical_pos: usize) -> usize {
        text.chars()
            .take(logical_pos)
            .fold(0, |col, c| col + self.char_width(c, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Lines(Vec<&'static str>, CursorPosition);

    impl ViewModel for Lines {
        fn get_cursor_position(&self) -> CursorPosition {
            self.1
        }
        fn get_line_count(&self) -> usize {
            self.0.len()
        }
        fn get_line(&self, line_number: usize) -> Option<String> {
            self.0.get(line_number).map(|s| s.to_string())
        }
        fn get_selection(&self) -> Option<(CursorPosition, CursorPosition)> {
            None
        }
    }

    #[test]
    fn test_calculate_display_column() {
        let view = View::new();

        assert_eq!(view.calculate_display_column("abc", 0), 0);
        assert_eq!(view.calculate_display_column("abc", 3), 3);

        // tabs advance to the next stop of 4
        assert_eq!(view.calculate_display_column("a\tb", 2), 4);
        assert_eq!(view.calculate_display_column("abcd\t", 5), 8);
        assert_eq!(view.calculate_display_column("\t- item", 1), 4);

        // wide chars take two cells
        assert_eq!(view.calculate_display_column("a中b", 2), 3);
        assert_eq!(view.calculate_display_column("a😀b", 2), 3);
    }

    #[test]
    fn test_text_area() {
        assert_eq!(View::text_area(100, LineLength::Narrow), (14, 72));
        assert_eq!(View::text_area(60, LineLength::Narrow), (0, 60));
        assert_eq!(View::text_area(100, LineLength::Wide), (0, 100));
    }

    #[test]
    fn test_wrap_at_spaces() {
        let view = View::new();
        assert_eq!(view.wrap_points("short", 10), vec![0]);
        assert_eq!(view.wrap_points("", 10), vec![0]);
        // "hello " | "world"
        assert_eq!(view.wrap_points("hello world", 8), vec![0, 6]);
        // exactly full rows do not wrap early
        assert_eq!(view.wrap_points("abcd efgh", 9), vec![0]);
    }

    #[test]
    fn test_wrap_long_word() {
        let view = View::new();
        assert_eq!(view.wrap_points("abcdefghij", 4), vec![0, 4, 8]);
        // wide chars never straddle a row
        assert_eq!(view.wrap_points("中中中", 5), vec![0, 2]);
    }

    #[test]
    fn test_layout_and_cursor_row() {
        let view = View::new();
        let model = Lines(
            vec!["hello world", "", "x"],
            CursorPosition { line: 0, column: 6 },
        );
        let rows = view.layout(&model, 8);
        assert_eq!(
            rows,
            vec![
                VisualRow { line: 0, start: 0, end: 6 },
                VisualRow { line: 0, start: 6, end: 11 },
                VisualRow { line: 1, start: 0, end: 0 },
                VisualRow { line: 2, start: 0, end: 1 },
            ]
        );
        assert_eq!(View::row_of(&rows, model.1), 1);
        assert_eq!(View::row_of(&rows, CursorPosition { line: 0, column: 5 }), 0);
        assert_eq!(View::row_of(&rows, CursorPosition { line: 2, column: 1 }), 3);
    }

    #[test]
    fn test_scroll_follows_cursor() {
        let mut view = View::new();
        view.adjust_scroll_to_cursor(30, 10);
        assert_eq!(view.get_scroll_offset(), 21);
        view.adjust_scroll_to_cursor(25, 10);
        assert_eq!(view.get_scroll_offset(), 21);
        view.adjust_scroll_to_cursor(3, 10);
        assert_eq!(view.get_scroll_offset(), 3);
    }

    #[test]
    fn test_title_bar() {
        let params = RenderParams {
            title: "Groceries",
            status_message: "",
            line_length: LineLength::Narrow,
            spell_check: true,
            dirty: true,
            length_class: LengthClass::Short,
        };
        let bar = View::title_bar(&params, 30);
        assert_eq!(bar.chars().count(), 30);
        assert!(bar.starts_with(" Groceries"));
        assert!(bar.ends_with("* spell ▁ "));
    }

    #[test]
    fn test_render_row_expands_tabs() {
        let view = View::new();
        let row = VisualRow { line: 0, start: 0, end: 3 };
        assert_eq!(view.render_row("\t-x", &row, None), "    -x");
    }
}
