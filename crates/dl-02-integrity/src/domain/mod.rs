//! Domain layer: verification and outcomes. No I/O.

pub mod names;
pub mod verify;

pub use names::sanitize_file_name;
pub use verify::{verify, CheckOutcome, IntegrityOutcome, UploadReceipt};
