//! Data module - user metadata, the view catalog and record summaries

mod metadata;
mod summary;
mod views;

pub use metadata::{slug_for, MetadataError, UserDirectory, UserEntry};
pub use summary::{SummaryRow, SummaryTable};
pub use views::{ViewCatalog, ViewSpec};
