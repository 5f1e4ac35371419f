//! Derived statistics. Nothing here is stored; every figure is recomputed
//! from the record arrays on each read.

use super::aviso::{Aviso, AvisoTipo};
use super::consorcio::Consorcio;
use super::expensa::Expensa;
use super::money::Money;
use super::pago::Pago;
use super::periodo::Periodo;
use super::unidad::Unidad;
use crate::error::{AdminError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// `(fees - payments) / fees * 100`, or zero when there are no fees.
pub fn delinquency_rate(total_fees: Money, total_payments: Money) -> Result<Decimal> {
    if total_fees.is_zero() {
        return Ok(Decimal::ZERO);
    }
    total_fees
        .checked_sub(total_payments)?
        .value()
        .checked_div(total_fees.value())
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(|| AdminError::validation("Amount too large"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn of(rate: Decimal) -> Self {
        if rate > Decimal::from(30) {
            Severity::High
        } else if rate > Decimal::from(15) {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsorcioStats {
    pub consorcio_id: String,
    pub nombre: String,
    pub unidades: usize,
    pub expensas: Money,
    pub pagos: Money,
    pub morosidad: Decimal,
    pub severity: Severity,
}

pub fn consorcio_stats(
    consorcio: &Consorcio,
    unidades: &[Unidad],
    expensas: &[Expensa],
    pagos: &[Pago],
) -> Result<ConsorcioStats> {
    let total_expensas = Money::try_sum(
        expensas
            .iter()
            .filter(|e| e.consorcio_id == consorcio.id)
            .map(|e| e.monto),
    )?;
    let total_pagos = Money::try_sum(
        pagos
            .iter()
            .filter(|p| p.consorcio_id == consorcio.id)
            .map(|p| p.monto),
    )?;
    let morosidad = delinquency_rate(total_expensas, total_pagos)?;

    Ok(ConsorcioStats {
        consorcio_id: consorcio.id.clone(),
        nombre: consorcio.nombre.clone(),
        unidades: unidades
            .iter()
            .filter(|u| u.consorcio_id == consorcio.id)
            .count(),
        expensas: total_expensas,
        pagos: total_pagos,
        morosidad,
        severity: Severity::of(morosidad),
    })
}

/// Totals for a filtered set of expensas (typically one consorcio and period).
///
/// Delinquency here is count-based: pending records over all records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub total: Money,
    pub count: usize,
    pub pagadas: usize,
    pub pendientes: usize,
    pub morosidad: Decimal,
}

pub fn period_summary<'a>(
    expensas: impl IntoIterator<Item = &'a Expensa>,
) -> Result<PeriodSummary> {
    let mut total = Money::ZERO;
    let mut count = 0usize;
    let mut pagadas = 0usize;
    for e in expensas {
        total = total.checked_add(e.monto)?;
        count += 1;
        if e.pagada {
            pagadas += 1;
        }
    }
    let pendientes = count - pagadas;
    let morosidad = if count == 0 {
        Decimal::ZERO
    } else {
        Decimal::from(pendientes) / Decimal::from(count) * Decimal::ONE_HUNDRED
    };

    Ok(PeriodSummary {
        total,
        count,
        pagadas,
        pendientes,
        morosidad,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagoSummary {
    pub total: Money,
    pub count: usize,
    /// Total of payments dated in the month of `today`.
    pub total_mes: Money,
}

pub fn pago_summary<'a>(
    pagos: impl IntoIterator<Item = &'a Pago>,
    today: NaiveDate,
) -> Result<PagoSummary> {
    let mes = Periodo::of(today);
    let mut summary = PagoSummary {
        total: Money::ZERO,
        count: 0,
        total_mes: Money::ZERO,
    };
    for p in pagos {
        summary.total = summary.total.checked_add(p.monto)?;
        summary.count += 1;
        if mes.contains(p.fecha) {
            summary.total_mes = summary.total_mes.checked_add(p.monto)?;
        }
    }
    Ok(summary)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvisoSummary {
    pub total: usize,
    pub hoy: usize,
    pub mora: usize,
    pub vencimiento: usize,
}

pub fn aviso_summary<'a>(
    avisos: impl IntoIterator<Item = &'a Aviso>,
    today: NaiveDate,
) -> AvisoSummary {
    let mut summary = AvisoSummary {
        total: 0,
        hoy: 0,
        mora: 0,
        vencimiento: 0,
    };
    for a in avisos {
        summary.total += 1;
        if a.sent_on(today) {
            summary.hoy += 1;
        }
        match a.tipo {
            AvisoTipo::Mora => summary.mora += 1,
            AvisoTipo::Vencimiento => summary.vencimiento += 1,
            AvisoTipo::Recordatorio => {}
        }
    }
    summary
}
