mod field;
pub use field::{FieldSide, FieldSpec, FieldType};

mod field_set;
pub use field_set::FieldSet;

mod scalar;
pub use scalar::ScalarValue;

mod status;
pub use status::{FailureReason, Status};

mod status_report;
pub use status_report::StatusReport;

/// Upper bound on the number of fields declared for one execution instance.
pub const MAX_FIELDS: usize = 50;

/// Identifier of one execution instance assigned by the control plane.
pub type ExecutionId = String;
