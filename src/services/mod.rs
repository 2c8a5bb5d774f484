//! Service layer for gamesite business logic.
//!
//! This module contains domain logic separated from UI concerns.
//! Services can be used by the CLI, the web server, or other interfaces.

pub mod generated;
pub mod import;

pub use import::{
    load_document, ImportError, ImportEvent, ImportReport, ImportService, SkipReason,
};
