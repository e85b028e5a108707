pub mod config;
pub mod controller;
pub mod document_model;
pub mod error;
pub mod export;
pub mod library;
pub mod storage;
pub mod view;

pub use error::{JotError, Result};
