//! Proportional fee calculation.
//!
//! Each unit pays its ownership share of the base amount, rounded to a whole
//! peso. Residuals from rounding are dropped rather than redistributed.

use super::expensa::Expensa;
use super::generate_id;
use super::money::Money;
use super::periodo::Periodo;
use super::unidad::Unidad;
use crate::error::Result;
use chrono::Utc;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeRounding {
    /// Truncate to the whole peso; generated fees never exceed the base.
    #[default]
    Down,
    /// Round half away from zero; totals may exceed the base slightly.
    /// Reproduces the amounts of the source application.
    Nearest,
}

impl FeeRounding {
    pub fn apply(&self, amount: Money) -> Money {
        let strategy = match self {
            FeeRounding::Down => RoundingStrategy::ToZero,
            FeeRounding::Nearest => RoundingStrategy::MidpointAwayFromZero,
        };
        Money::new(amount.value().round_dp_with_strategy(0, strategy))
    }
}

/// Fee owed by one unit for `base`.
pub fn unit_fee(base: Money, unidad: &Unidad, rounding: FeeRounding) -> Result<Money> {
    Ok(rounding.apply(unidad.porcentaje.share_of(base)?))
}

/// Builds one unpaid expensa per unit for `periodo`.
pub fn build_expensas(
    consorcio_id: &str,
    periodo: Periodo,
    base: Money,
    unidades: &[Unidad],
    rounding: FeeRounding,
) -> Result<Vec<Expensa>> {
    let vencimiento = periodo.due_date();
    let now = Utc::now();
    unidades
        .iter()
        .map(|unidad| {
            Ok(Expensa {
                id: generate_id(),
                consorcio_id: consorcio_id.to_string(),
                unidad_id: unidad.id.clone(),
                periodo,
                monto: unit_fee(base, unidad, rounding)?,
                vencimiento,
                pagada: false,
                created_at: now,
            })
        })
        .collect()
}
