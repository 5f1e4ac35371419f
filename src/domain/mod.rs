//! Domain layer: records, value objects, and the pure fee and statistics math.
//!
//! Nothing in here touches storage; the `ports` module defines the seam the
//! infrastructure adapters plug into.

pub mod aviso;
pub mod consorcio;
pub mod expensa;
pub mod fees;
pub mod money;
pub mod pago;
pub mod periodo;
pub mod ports;
pub mod stats;
pub mod unidad;

use crate::error::{AdminError, Result};
use uuid::Uuid;

/// Generates an opaque record id.
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

pub(crate) fn require_field(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(AdminError::validation(format!("Field '{field}' is required")))
    } else {
        Ok(())
    }
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
