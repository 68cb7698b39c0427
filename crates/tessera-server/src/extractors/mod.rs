//! Request extractors and path parsing.

pub mod accept;
pub mod path;

pub use accept::AcceptFormat;
pub use path::{AppProfileLabelPath, AppProfilePath, DocumentName, validate_label};
