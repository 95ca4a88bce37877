//! Record id generation

use uuid::Uuid;

/// Generate a new, never reused record id (UUIDv4, hyphenated)
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}
