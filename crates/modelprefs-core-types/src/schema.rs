//! Canonical schema constants for structured logging
//!
//! These constants keep field names consistent across crates.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Preference identifiers
pub const FIELD_PREFERENCE: &str = "preference";
pub const FIELD_OWNER_TYPE: &str = "owner_type";
pub const FIELD_OWNER_ID: &str = "owner_id";

// Row counts
pub const FIELD_ROWS_AFFECTED: &str = "rows_affected";

// Error fields, emitted by log_op_error!
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
