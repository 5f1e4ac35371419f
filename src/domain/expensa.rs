use super::money::Money;
use super::periodo::Periodo;
use super::ports::{Record, StorageKey};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A periodic shared-expense charge for one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expensa {
    pub id: String,
    pub consorcio_id: String,
    pub unidad_id: String,
    pub periodo: Periodo,
    pub monto: Money,
    pub vencimiento: NaiveDate,
    pub pagada: bool,
    pub created_at: DateTime<Utc>,
}

impl Expensa {
    /// Unpaid and past its due date as of `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.pagada && self.vencimiento < today
    }

    /// Unpaid and due on or before `limit`.
    pub fn is_due_by(&self, limit: NaiveDate) -> bool {
        !self.pagada && self.vencimiento <= limit
    }

    pub fn estado(&self) -> &'static str {
        if self.pagada { "PAGADO" } else { "PENDIENTE" }
    }
}

impl Record for Expensa {
    const KEY: StorageKey = StorageKey::Expensas;
    const NAME: &'static str = "Expensa";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Criteria for listing expensas; empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ExpensaFilter {
    pub consorcio_id: Option<String>,
    pub periodo: Option<Periodo>,
}

impl ExpensaFilter {
    pub fn matches(&self, expensa: &Expensa) -> bool {
        self.consorcio_id
            .as_deref()
            .is_none_or(|id| expensa.consorcio_id == id)
            && self.periodo.is_none_or(|p| expensa.periodo == p)
    }
}

/// Distinct periods present in `expensas`, newest first.
pub fn distinct_periods(expensas: &[Expensa]) -> Vec<Periodo> {
    let mut periods: Vec<Periodo> = expensas.iter().map(|e| e.periodo).collect();
    periods.sort_unstable_by(|a, b| b.cmp(a));
    periods.dedup();
    periods
}
