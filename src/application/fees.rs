use super::admin::AdminService;
use crate::domain::expensa::Expensa;
use crate::domain::fees::build_expensas;
use crate::domain::money::Money;
use crate::domain::periodo::Periodo;
use crate::error::{AdminError, Result};
use std::collections::HashSet;
use tracing::{info, warn};

/// Outcome of generating a period's fees for one consorcio.
#[derive(Debug, Clone)]
pub struct GeneratedExpensas {
    /// Expensas of the same consorcio and period that were replaced.
    pub replaced: usize,
    /// Pagos dropped along with the replaced expensas.
    pub dropped_pagos: usize,
    pub expensas: Vec<Expensa>,
}

impl GeneratedExpensas {
    pub fn total(&self) -> Result<Money> {
        Money::try_sum(self.expensas.iter().map(|e| e.monto))
    }
}

impl AdminService {
    /// Splits `base` across the consorcio's units by ownership share.
    ///
    /// Any expensas already generated for the same consorcio and period are
    /// replaced, together with the pagos recorded against them.
    pub async fn generate_expensas(
        &self,
        consorcio_id: &str,
        periodo: Periodo,
        base: Money,
    ) -> Result<GeneratedExpensas> {
        let base = Money::positive(base.value())?;
        self.consorcios().get(consorcio_id).await?;

        let unidades = self.list_unidades(Some(consorcio_id), None).await?;
        if unidades.is_empty() {
            return Err(AdminError::NoUnits(consorcio_id.to_string()));
        }
        let expensas = build_expensas(
            consorcio_id,
            periodo,
            base,
            &unidades,
            self.options().fee_rounding,
        )?;

        let replaced = self
            .expensas()
            .retain(|e| !(e.consorcio_id == consorcio_id && e.periodo == periodo))
            .await?;
        let replaced_ids: HashSet<&str> = replaced.iter().map(|e| e.id.as_str()).collect();
        let dropped_pagos = if replaced_ids.is_empty() {
            0
        } else {
            self.pagos()
                .retain(|p| !replaced_ids.contains(p.expensa_id.as_str()))
                .await?
                .len()
        };
        if !replaced.is_empty() {
            warn!(
                consorcio_id,
                %periodo,
                replaced = replaced.len(),
                dropped_pagos,
                "regenerating expensas for existing period"
            );
        }

        self.expensas().extend(expensas.clone()).await?;

        let generated = GeneratedExpensas {
            replaced: replaced.len(),
            dropped_pagos,
            expensas,
        };
        info!(
            consorcio_id,
            %periodo,
            count = generated.expensas.len(),
            total = %generated.total()?,
            "expensas generated"
        );
        Ok(generated)
    }
}
