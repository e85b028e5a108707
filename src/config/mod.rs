/// Configuration subsystem - Editor settings and preferences
///
/// This module handles loading settings from .jotpadrc files: where the
/// store and exports live, save timing, title lengths and logging.

pub mod rc;

// Re-export public interface
pub use rc::{RC_FILE_NAME, RcConfig, RcLoader};
