use std::fmt;
use std::str::FromStr;

use super::key_handler::AppCommand;
use crate::document_model::{LineLength, Options, SortOrder};
use crate::error::JotError;
use crate::storage::DocumentStore;

/// Menu item ids, in menu order. Sort and line length are radio groups, the
/// rest are checkboxes.
pub const MENU_ITEMS: [&str; 8] = [
    "sort_title",
    "sort_modified",
    "sort_created",
    "lineLength_narrow",
    "lineLength_wide",
    "spellCheck",
    "autoList",
    "autoClosure",
];

/// A settings change picked from the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Sort(SortOrder),
    LineLength(LineLength),
    SpellCheck(bool),
    AutoList(bool),
    AutoClosure(bool),
}

impl MenuCommand {
    pub fn apply_to(self, options: &mut Options) {
        match self {
            MenuCommand::Sort(sort) => options.sort = sort,
            MenuCommand::LineLength(line_length) => options.line_length = line_length,
            MenuCommand::SpellCheck(on) => options.spell_check = on,
            MenuCommand::AutoList(on) => options.auto_list = on,
            MenuCommand::AutoClosure(on) => options.auto_closure = on,
        }
    }

    /// The command an editor toggle key stands for, given the current options.
    pub fn for_toggle(command: AppCommand, options: &Options) -> Option<Self> {
        match command {
            AppCommand::ToggleLineLength => Some(MenuCommand::LineLength(match options.line_length {
                LineLength::Narrow => LineLength::Wide,
                LineLength::Wide => LineLength::Narrow,
            })),
            AppCommand::ToggleSpellCheck => Some(MenuCommand::SpellCheck(!options.spell_check)),
            AppCommand::ToggleAutoList => Some(MenuCommand::AutoList(!options.auto_list)),
            AppCommand::ToggleAutoClosure => Some(MenuCommand::AutoClosure(!options.auto_closure)),
            _ => None,
        }
    }
}

impl FromStr for MenuCommand {
    type Err = JotError;

    /// Accepts the menu item ids; checkbox ids take an optional `=true` or
    /// `=false` and mean "on" without one.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || JotError::InvalidOption(s.to_string());
        let (name, value) = match s.trim().split_once('=') {
            Some((name, value)) => (name.trim(), Some(value.trim())),
            None => (s.trim(), None),
        };

        let flag = |value: Option<&str>| match value {
            None | Some("true") | Some("on") => Ok(true),
            Some("false") | Some("off") => Ok(false),
            Some(_) => Err(invalid()),
        };

        match (name, value) {
            ("sort_title", None) => Ok(MenuCommand::Sort(SortOrder::Title)),
            ("sort_modified", None) => Ok(MenuCommand::Sort(SortOrder::Modified)),
            ("sort_created", None) => Ok(MenuCommand::Sort(SortOrder::Created)),
            ("lineLength_narrow", None) => Ok(MenuCommand::LineLength(LineLength::Narrow)),
            ("lineLength_wide", None) => Ok(MenuCommand::LineLength(LineLength::Wide)),
            ("spellCheck", value) => flag(value).map(MenuCommand::SpellCheck),
            ("autoList", value) => flag(value).map(MenuCommand::AutoList),
            ("autoClosure", value) => flag(value).map(MenuCommand::AutoClosure),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for MenuCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MenuCommand::Sort(sort) => write!(f, "sort_{sort}"),
            MenuCommand::LineLength(line_length) => write!(f, "lineLength_{line_length}"),
            MenuCommand::SpellCheck(on) => write!(f, "spellCheck={on}"),
            MenuCommand::AutoList(on) => write!(f, "autoList={on}"),
            MenuCommand::AutoClosure(on) => write!(f, "autoClosure={on}"),
        }
    }
}

/// Load the options, change one field, save. Every session picks the new
/// value up from the store's change event.
pub async fn apply_menu_command(store: &DocumentStore, command: MenuCommand) -> Options {
    let mut options = store.load_options().await;
    command.apply_to(&mut options);
    tracing::info!("Menu command {}", command);
    store.save_options(&options).await;
    options
}

/// Ids of the menu items shown checked for these options.
pub fn checked_items(options: &Options) -> Vec<&'static str> {
    MENU_ITEMS
        .into_iter()
        .filter(|item| match *item {
            "sort_title" => options.sort == SortOrder::Title,
            "sort_modified" => options.sort == SortOrder::Modified,
            "sort_created" => options.sort == SortOrder::Created,
            "lineLength_narrow" => options.line_length == LineLength::Narrow,
            "lineLength_wide" => options.line_length == LineLength::Wide,
            "spellCheck" => options.spell_check,
            "autoList" => options.auto_list,
            "autoClosure" => options.auto_closure,
            _ => false,
        })
        .collect()
}
