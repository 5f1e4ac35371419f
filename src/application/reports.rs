use super::admin::AdminService;
use crate::domain::consorcio::Consorcio;
use crate::domain::expensa::{Expensa, ExpensaFilter};
use crate::domain::money::Money;
use crate::domain::pago::{MetodoPago, Pago};
use crate::domain::periodo::Periodo;
use crate::domain::stats::{
    AvisoSummary, ConsorcioStats, PagoSummary, PeriodSummary, aviso_summary, consorcio_stats,
    delinquency_rate, pago_summary, period_summary,
};
use crate::domain::unidad::Unidad;
use crate::error::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Global figures plus one row per consorcio.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub total_consorcios: usize,
    pub total_unidades: usize,
    pub total_expensas: usize,
    pub total_pagos: usize,
    pub monto_expensas: Money,
    pub monto_pagos: Money,
    pub morosidad: Decimal,
    pub expensas_pagadas: usize,
    pub expensas_pendientes: usize,
    /// Global delinquency is above the configured alert threshold.
    pub alerta_morosidad: bool,
    pub consorcios: Vec<ConsorcioStats>,
}

/// Everything needed to print a payment receipt.
#[derive(Debug, Clone)]
pub struct Comprobante {
    pub numero: String,
    pub consorcio: Consorcio,
    pub unidad: Unidad,
    pub periodo: Periodo,
    pub fecha: NaiveDate,
    pub metodo_pago: MetodoPago,
    pub monto: Money,
}

impl fmt::Display for Comprobante {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "COMPROBANTE DE PAGO")?;
        writeln!(f, "{}", self.consorcio.nombre)?;
        writeln!(f, "CUIT: {}", self.consorcio.cuit)?;
        writeln!(f, "{}", self.consorcio.direccion)?;
        writeln!(f, "Tel: {}", self.consorcio.telefono)?;
        writeln!(f)?;
        writeln!(f, "Comprobante N°: {}", self.numero)?;
        writeln!(f, "Fecha: {}", self.fecha.format("%d/%m/%Y"))?;
        writeln!(f)?;
        writeln!(f, "Unidad: {} - Piso: {}", self.unidad.numero, self.unidad.piso)?;
        writeln!(f, "Propietario: {}", self.unidad.propietario)?;
        writeln!(f, "Período: {}", self.periodo)?;
        writeln!(f, "Método de Pago: {}", self.metodo_pago)?;
        writeln!(f, "MONTO: {}", self.monto)?;
        write!(f, "Administrador: {}", self.consorcio.administrador)
    }
}

/// One line of the monthly report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
    pub unidad: String,
    pub propietario: String,
    pub monto: Money,
    pub vencimiento: NaiveDate,
    pub estado: &'static str,
}

/// Per-period report for one consorcio.
#[derive(Debug, Clone)]
pub struct MonthlyReport {
    pub consorcio: Consorcio,
    pub periodo: Periodo,
    pub total_expensas: Money,
    pub total_pagos: Money,
    pub morosidad: Decimal,
    pub lines: Vec<ReportLine>,
}

impl AdminService {
    pub async fn dashboard(&self) -> Result<Dashboard> {
        let consorcios = self.consorcios().all().await?;
        let unidades = self.unidades().all().await?;
        let expensas = self.expensas().all().await?;
        let pagos = self.pagos().all().await?;

        let monto_expensas = Money::try_sum(expensas.iter().map(|e| e.monto))?;
        let monto_pagos = Money::try_sum(pagos.iter().map(|p| p.monto))?;
        let morosidad = delinquency_rate(monto_expensas, monto_pagos)?;
        let stats = consorcios
            .iter()
            .map(|c| consorcio_stats(c, &unidades, &expensas, &pagos))
            .collect::<Result<Vec<_>>>()?;
        let expensas_pagadas = expensas.iter().filter(|e| e.pagada).count();

        Ok(Dashboard {
            total_consorcios: consorcios.len(),
            total_unidades: unidades.len(),
            total_expensas: expensas.len(),
            total_pagos: pagos.len(),
            monto_expensas,
            monto_pagos,
            morosidad,
            expensas_pagadas,
            expensas_pendientes: expensas.len() - expensas_pagadas,
            alerta_morosidad: morosidad > self.options().delinquency_alert_threshold,
            consorcios: stats,
        })
    }

    /// Delinquency of one consorcio: unpaid share of everything billed.
    pub async fn consorcio_stats(&self, consorcio_id: &str) -> Result<ConsorcioStats> {
        let consorcio = self.consorcios().get(consorcio_id).await?;
        let unidades = self.unidades().all().await?;
        let expensas = self.expensas().all().await?;
        let pagos = self.pagos().all().await?;
        consorcio_stats(&consorcio, &unidades, &expensas, &pagos)
    }

    pub async fn period_summary(&self, filter: &ExpensaFilter) -> Result<PeriodSummary> {
        period_summary(&self.list_expensas(filter).await?)
    }

    pub async fn pago_summary(
        &self,
        consorcio_id: Option<&str>,
        search: Option<&str>,
        today: NaiveDate,
    ) -> Result<PagoSummary> {
        pago_summary(&self.list_pagos(consorcio_id, search).await?, today)
    }

    pub async fn aviso_summary(
        &self,
        consorcio_id: Option<&str>,
        today: NaiveDate,
    ) -> Result<AvisoSummary> {
        Ok(aviso_summary(&self.list_avisos(consorcio_id).await?, today))
    }

    pub async fn receipt(&self, pago_id: &str) -> Result<Comprobante> {
        let pago: Pago = self.pagos().get(pago_id).await?;
        let expensa = self.expensas().get(&pago.expensa_id).await?;
        let unidad = self.unidades().get(&pago.unidad_id).await?;
        let consorcio = self.consorcios().get(&pago.consorcio_id).await?;

        Ok(Comprobante {
            numero: pago.receipt_number(),
            consorcio,
            unidad,
            periodo: expensa.periodo,
            fecha: pago.fecha,
            metodo_pago: pago.metodo_pago,
            monto: pago.monto,
        })
    }

    /// Fees of one consorcio and period with their payment status.
    pub async fn monthly_report(
        &self,
        consorcio_id: &str,
        periodo: Periodo,
    ) -> Result<MonthlyReport> {
        let consorcio = self.consorcios().get(consorcio_id).await?;
        let expensas: Vec<Expensa> = self
            .list_expensas(&ExpensaFilter {
                consorcio_id: Some(consorcio_id.to_string()),
                periodo: Some(periodo),
            })
            .await?;
        let unidades = self.list_unidades(Some(consorcio_id), None).await?;
        let pagos = self.pagos().all().await?;

        let total_expensas = Money::try_sum(expensas.iter().map(|e| e.monto))?;
        let total_pagos = Money::try_sum(
            pagos
                .iter()
                .filter(|p| expensas.iter().any(|e| e.id == p.expensa_id))
                .map(|p| p.monto),
        )?;
        let morosidad = delinquency_rate(total_expensas, total_pagos)?;

        let lines = expensas
            .iter()
            .filter_map(|e| {
                let unidad = unidades.iter().find(|u| u.id == e.unidad_id)?;
                Some(ReportLine {
                    unidad: unidad.numero.clone(),
                    propietario: unidad.propietario.clone(),
                    monto: e.monto,
                    vencimiento: e.vencimiento,
                    estado: e.estado(),
                })
            })
            .collect();

        Ok(MonthlyReport {
            consorcio,
            periodo,
            total_expensas,
            total_pagos,
            morosidad,
            lines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::admin::test_support::*;
    use crate::domain::pago::PagoForm;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_empty_dashboard() {
        let svc = service();
        let d = svc.dashboard().await.unwrap();
        assert_eq!(d.total_consorcios, 0);
        assert_eq!(d.morosidad, dec!(0));
        assert!(!d.alerta_morosidad);
        assert!(d.consorcios.is_empty());
    }

    #[tokio::test]
    async fn test_dashboard_and_reports() {
        let svc = service();
        let c = svc.create_consorcio(consorcio_form("Torre")).await.unwrap();
        let otro = svc.create_consorcio(consorcio_form("Otro")).await.unwrap();
        svc.create_unidad(&c.id, unidad_form("1A", dec!(25)))
            .await
            .unwrap();
        svc.create_unidad(&c.id, unidad_form("1B", dec!(75)))
            .await
            .unwrap();
        let periodo: Periodo = "2024-01".parse().unwrap();
        let generated = svc
            .generate_expensas(&c.id, periodo, Money::new(dec!(1000)))
            .await
            .unwrap();
        let small = generated
            .expensas
            .iter()
            .find(|e| e.monto == Money::new(dec!(250)))
            .unwrap();
        let pago = svc
            .register_pago(PagoForm {
                expensa_id: small.id.clone(),
                fecha: NaiveDate::from_ymd_opt(2024, 2, 3).unwrap(),
                monto: Money::new(dec!(250)),
                metodo_pago: MetodoPago::Efectivo,
                comprobante: None,
            })
            .await
            .unwrap();

        let d = svc.dashboard().await.unwrap();
        assert_eq!(d.total_consorcios, 2);
        assert_eq!(d.total_unidades, 2);
        assert_eq!(d.total_expensas, 2);
        assert_eq!(d.total_pagos, 1);
        assert_eq!(d.monto_expensas, Money::new(dec!(1000)));
        assert_eq!(d.monto_pagos, Money::new(dec!(250)));
        assert_eq!(d.morosidad, dec!(75));
        assert_eq!(d.expensas_pagadas, 1);
        assert_eq!(d.expensas_pendientes, 1);
        assert!(d.alerta_morosidad);
        let row = d.consorcios.iter().find(|r| r.consorcio_id == otro.id).unwrap();
        assert_eq!(row.morosidad, dec!(0));

        let summary = svc
            .period_summary(&ExpensaFilter {
                consorcio_id: Some(c.id.clone()),
                periodo: Some(periodo),
            })
            .await
            .unwrap();
        assert_eq!(summary.pagadas, 1);
        assert_eq!(summary.morosidad, dec!(50));

        let report = svc.monthly_report(&c.id, periodo).await.unwrap();
        assert_eq!(report.lines.len(), 2);
        assert_eq!(report.total_pagos, Money::new(dec!(250)));
        assert_eq!(report.morosidad, dec!(75));
        assert!(report.lines.iter().any(|l| l.estado == "PAGADO"));

        let receipt = svc.receipt(&pago.id).await.unwrap();
        assert_eq!(receipt.numero, pago.receipt_number());
        assert_eq!(receipt.periodo, periodo);
        let text = receipt.to_string();
        assert!(text.contains("COMPROBANTE DE PAGO"));
        assert!(text.contains("Unidad: 1A"));
        assert!(text.contains("$ 250,00"));

        let pagos = svc
            .pago_summary(Some(&c.id), None, NaiveDate::from_ymd_opt(2024, 2, 20).unwrap())
            .await
            .unwrap();
        assert_eq!(pagos.total_mes, Money::new(dec!(250)));
    }
}
