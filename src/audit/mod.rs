//! Append-only audit trail of analytics requests.

pub mod log;

pub use log::{AuditError, Audited, RequestAuditor, RECORD_DELIMITER};
