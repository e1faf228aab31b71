mod domain;
pub use domain::*;

mod error;
pub use error::{ReportError, SchemaError};
