// stat-domain library entry point
pub mod classify;
pub mod error;
pub mod preview;
pub mod upload;

pub use classify::{ColumnClassification, MissingDataStrategy, VariableType};
pub use error::DomainError;
pub use preview::{ColumnPreview, MissingDataInfo};
pub use upload::UploadedFile;
