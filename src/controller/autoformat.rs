use regex::Regex;
use std::sync::{Arc, LazyLock};

use super::key_handler::EditorKey;
use crate::document_model::{
    Edit, Options, PairKind, TextField, match_list_line, pair_for_close, pair_for_open,
};

static WORD_CHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w").expect("word pattern compiles"));

/// Decides whether the word around the caret counts as a word, which keeps
/// quotes typed inside it (`don't`) from being paired.
pub type WordPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

pub fn default_word_predicate() -> WordPredicate {
    Arc::new(|word: &str| WORD_CHAR.is_match(word))
}

/// What to do with a keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Let the field perform its default action.
    PassThrough,
    /// Suppress the default and apply these edits in order.
    Replace(Vec<Edit>),
}

#[derive(Clone)]
pub struct Autoformat {
    pub auto_list: bool,
    pub auto_closure: bool,
    is_word: WordPredicate,
}

impl Default for Autoformat {
    fn default() -> Self {
        Self::from_options(&Options::default())
    }
}

impl std::fmt::Debug for Autoformat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autoformat")
            .field("auto_list", &self.auto_list)
            .field("auto_closure", &self.auto_closure)
            .finish_non_exhaustive()
    }
}

impl Autoformat {
    pub fn new(auto_list: bool, auto_closure: bool) -> Self {
        Self {
            auto_list,
            auto_closure,
            is_word: default_word_predicate(),
        }
    }

    pub fn from_options(options: &Options) -> Self {
        Self::new(options.auto_list, options.auto_closure)
    }

    pub fn with_word_predicate(mut self, predicate: WordPredicate) -> Self {
        self.is_word = predicate;
        self
    }

    pub fn apply_options(&mut self, options: &Options) {
        self.auto_list = options.auto_list;
        self.auto_closure = options.auto_closure;
    }

    pub fn on_key(&self, key: EditorKey, field: &TextField) -> KeyOutcome {
        match key {
            EditorKey::Enter => self.on_enter(field),
            EditorKey::Char(c) => self.on_pair_key(c, field),
            _ => KeyOutcome::PassThrough,
        }
    }

    /// Continue a list item, or drop the marker of an empty one.
    pub fn on_enter(&self, field: &TextField) -> KeyOutcome {
        if !self.auto_list {
            return KeyOutcome::PassThrough;
        }

        let Some(item) = match_list_line(&field.current_line()) else {
            return KeyOutcome::PassThrough;
        };

        if item.has_content() {
            KeyOutcome::Replace(vec![
                Edit::InsertText("\n".to_string()),
                Edit::InsertText(item.continuation()),
            ])
        } else {
            // one delete per char so each lands as its own native edit
            KeyOutcome::Replace(vec![Edit::DeleteBackward; item.prefix_len()])
        }
    }

    pub fn on_pair_key(&self, key: char, field: &TextField) -> KeyOutcome {
        if !self.auto_closure {
            return KeyOutcome::PassThrough;
        }

        let next = field.char_after_caret();

        if let Some(pair) = pair_for_open(key) {
            if field.has_selection() {
                return KeyOutcome::Replace(vec![Edit::WrapSelection {
                    open: pair.open,
                    close: pair.close,
                }]);
            }

            if pair.kind == PairKind::Quote && next != Some(pair.close) {
                let word = field.current_word();
                if !word.is_empty() && (self.is_word)(&word) {
                    return KeyOutcome::PassThrough;
                }
            }

            if next == Some(pair.close) {
                return KeyOutcome::Replace(vec![Edit::MoveCaret(1)]);
            }

            return KeyOutcome::Replace(vec![
                Edit::InsertText(format!("{}{}", pair.open, pair.close)),
                Edit::MoveCaret(-1),
            ]);
        }

        if let Some(pair) = pair_for_close(key) {
            if field.current_line().contains(pair.open) && next == Some(pair.close) {
                return KeyOutcome::Replace(vec![Edit::MoveCaret(1)]);
            }
        }

        KeyOutcome::PassThrough
    }
}
