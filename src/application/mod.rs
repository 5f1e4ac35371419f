//! Application layer containing the business operations.
//!
//! `AdminService` is the single entry point: it owns the storage backend and
//! its methods are split by concern across the submodules (CRUD and cascades
//! in `admin`, fee generation in `fees`, CSV unit import in `import`, notices
//! in `notices`, derived figures in `reports`).

pub mod admin;
pub mod collection;
pub mod fees;
pub mod import;
pub mod notices;
pub mod reports;

use crate::domain::fees::FeeRounding;
use rust_decimal::Decimal;

/// Tunables the service reads on every operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceOptions {
    pub fee_rounding: FeeRounding,
    /// Lookahead for `vencimiento` notices, in days.
    pub due_soon_days: i64,
    /// Global delinquency (percent) above which the dashboard raises an alert.
    pub delinquency_alert_threshold: Decimal,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            fee_rounding: FeeRounding::Down,
            due_soon_days: 7,
            delinquency_alert_threshold: Decimal::from(20),
        }
    }
}
