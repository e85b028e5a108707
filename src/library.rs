//! The document list: every saved document, sorted the way the options ask.

use std::cmp::Ordering;

use crate::document_model::{DocumentRecord, LengthClass, SortOrder};
use crate::error::{JotError, Result};
use crate::storage::DocumentStore;

const ID_LENGTH: usize = 8;
const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// All document records. Documents whose text is empty are removed from
/// the store on the way.
pub async fn list_documents(store: &DocumentStore) -> Vec<DocumentRecord> {
    let mut documents = Vec::new();

    for (key, value) in store.load_all().await {
        let Some(record) = DocumentRecord::from_value(&value) else {
            continue;
        };
        if record.text.is_empty() {
            tracing::debug!("Purging empty document {:?}", key);
            store.clear(&key).await;
        } else {
            documents.push(record);
        }
    }

    documents
}

/// Title sorts A to Z ignoring case; the date orders put the newest first,
/// records with unreadable dates last.
pub fn sort_documents(documents: &mut [DocumentRecord], order: SortOrder) {
    match order {
        SortOrder::Title => {
            documents.sort_by_cached_key(|doc| doc.title.to_uppercase());
        }
        SortOrder::Modified => {
            documents.sort_by(|a, b| newest_first(a.modified_at(), b.modified_at()));
        }
        SortOrder::Created => {
            documents.sort_by(|a, b| newest_first(a.created_at(), b.created_at()));
        }
    }
}

fn newest_first<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    // None < Some, so reversing puts missing dates at the end
    b.cmp(&a)
}

/// The list as shown: purged, then sorted by the stored sort option.
pub async fn sorted_documents(store: &DocumentStore) -> Vec<DocumentRecord> {
    let options = store.load_options().await;
    let mut documents = list_documents(store).await;
    sort_documents(&mut documents, options.sort);
    documents
}

pub async fn delete_document(store: &DocumentStore, id: &str) -> Result<()> {
    if store.load_document(id).await.is_none() {
        return Err(JotError::DocumentNotFound(id.to_string()));
    }
    store.clear(id).await;
    tracing::info!("Deleted document {:?}", id);
    Ok(())
}

/// Fresh 8-character base36 document id.
pub fn new_document_id() -> String {
    let mut n = uuid::Uuid::new_v4().as_u128();
    let mut id = String::with_capacity(ID_LENGTH);
    for _ in 0..ID_LENGTH {
        id.push(ID_ALPHABET[(n % 36) as usize] as char);
        n /= 36;
    }
    id
}

/// One line of the plain-text listing.
pub fn format_entry(doc: &DocumentRecord) -> String {
    let modified = doc
        .modified_at()
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".repeat(16));
    format!(
        "{} {}  {}  {}",
        LengthClass::for_text(&doc.text).glyph(),
        doc.id,
        modified,
        doc.title
    )
}
