/// Document model subsystem - Text, caret and persisted record types
///
/// This module holds the pure pieces of the editor: list/pair pattern
/// matching, caret-relative line and word lookups, the host text field and
/// the record shapes written to the store.

pub mod locator;
pub mod patterns;
pub mod record;
pub mod text_field;

// Re-export main types for convenience
pub use patterns::{ListKind, ListMatch, Pair, PairKind, match_list_line, pair_for_close, pair_for_open};
pub use record::{
    DOC_TYPE, DocumentRecord, LengthClass, LineLength, OPTIONS_KEY, Options, SortOrder,
    derive_title,
};
pub use text_field::{Edit, TextField};
