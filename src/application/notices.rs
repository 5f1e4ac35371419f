use super::admin::AdminService;
use crate::domain::aviso::{Aviso, AvisoTipo};
use crate::domain::expensa::Expensa;
use crate::domain::generate_id;
use crate::domain::unidad::Unidad;
use crate::error::{AdminError, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::info;

/// Whether `expensa` makes its unit a recipient of a `tipo` notice on `today`.
pub fn qualifies(
    tipo: AvisoTipo,
    expensa: &Expensa,
    today: NaiveDate,
    due_soon_days: i64,
) -> bool {
    match tipo {
        AvisoTipo::Vencimiento => {
            let horizon = Duration::try_days(due_soon_days)
                .and_then(|days| today.checked_add_signed(days))
                .unwrap_or(NaiveDate::MAX);
            expensa.is_due_by(horizon)
        }
        AvisoTipo::Mora => expensa.is_overdue(today),
        AvisoTipo::Recordatorio => !expensa.pagada,
    }
}

impl AdminService {
    /// Units of the consorcio that a `tipo` notice would reach on `today`.
    pub async fn notice_recipients(
        &self,
        consorcio_id: &str,
        tipo: AvisoTipo,
        today: NaiveDate,
    ) -> Result<Vec<Unidad>> {
        let unidades = self.list_unidades(Some(consorcio_id), None).await?;
        let expensas = self.expensas().all().await?;
        let due_soon_days = self.options().due_soon_days;

        Ok(unidades
            .into_iter()
            .filter(|u| {
                expensas
                    .iter()
                    .any(|e| e.unidad_id == u.id && qualifies(tipo, e, today, due_soon_days))
            })
            .collect())
    }

    /// The default message for a notice type, naming the consorcio.
    pub async fn default_notice_message(
        &self,
        consorcio_id: &str,
        tipo: AvisoTipo,
    ) -> Result<String> {
        let consorcio = self.consorcios().get(consorcio_id).await?;
        Ok(tipo.default_message(&consorcio.nombre))
    }

    /// Records one sent aviso per recipient unit.
    pub async fn send_avisos(
        &self,
        consorcio_id: &str,
        tipo: AvisoTipo,
        mensaje: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Aviso>> {
        if mensaje.trim().is_empty() {
            return Err(AdminError::validation("Field 'mensaje' is required"));
        }
        self.consorcios().get(consorcio_id).await?;

        let recipients = self
            .notice_recipients(consorcio_id, tipo, now.date_naive())
            .await?;
        if recipients.is_empty() {
            return Err(AdminError::NoRecipients);
        }

        let avisos: Vec<Aviso> = recipients
            .iter()
            .map(|unidad| Aviso {
                id: generate_id(),
                consorcio_id: consorcio_id.to_string(),
                unidad_id: unidad.id.clone(),
                tipo,
                mensaje: mensaje.to_string(),
                fecha_envio: now,
                enviado: true,
                created_at: now,
            })
            .collect();
        self.avisos().extend(avisos.clone()).await?;
        info!(consorcio_id, %tipo, count = avisos.len(), "avisos sent");
        Ok(avisos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::admin::test_support::*;
    use crate::domain::expensa::fixtures::expensa;
    use crate::domain::money::Money;
    use crate::domain::pago::{MetodoPago, PagoForm};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Consorcio with three units and January 2024 fees (due 2024-02-29);
    /// unit 1A has paid.
    async fn fixture() -> (AdminService, String, Vec<Unidad>) {
        let svc = service();
        let c = svc.create_consorcio(consorcio_form("Torre Sur")).await.unwrap();
        let mut units = Vec::new();
        for (numero, pct) in [("1A", dec!(30)), ("1B", dec!(30)), ("1C", dec!(40))] {
            units.push(svc.create_unidad(&c.id, unidad_form(numero, pct)).await.unwrap());
        }
        let generated = svc
            .generate_expensas(&c.id, "2024-01".parse().unwrap(), Money::new(dec!(1000)))
            .await
            .unwrap();
        let paid = generated
            .expensas
            .iter()
            .find(|e| e.unidad_id == units[0].id)
            .unwrap();
        svc.register_pago(PagoForm {
            expensa_id: paid.id.clone(),
            fecha: date(2024, 2, 5),
            monto: paid.monto,
            metodo_pago: MetodoPago::Cheque,
            comprobante: None,
        })
        .await
        .unwrap();
        (svc, c.id, units)
    }

    #[tokio::test]
    async fn test_recipients_by_tipo() {
        let (svc, cid, units) = fixture().await;
        let pending: Vec<&str> = vec![units[1].id.as_str(), units[2].id.as_str()];

        // Well before the due date: nothing due soon, nothing overdue.
        let early = date(2024, 2, 1);
        assert!(
            svc.notice_recipients(&cid, AvisoTipo::Vencimiento, early)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(
            svc.notice_recipients(&cid, AvisoTipo::Mora, early)
                .await
                .unwrap()
                .is_empty()
        );
        let reminders = svc
            .notice_recipients(&cid, AvisoTipo::Recordatorio, early)
            .await
            .unwrap();
        assert_eq!(reminders.len(), 2);
        assert!(reminders.iter().all(|u| pending.contains(&u.id.as_str())));

        // Seven days before the due date counts as due soon.
        let week_before = date(2024, 2, 22);
        assert_eq!(
            svc.notice_recipients(&cid, AvisoTipo::Vencimiento, week_before)
                .await
                .unwrap()
                .len(),
            2
        );

        // On the due date it is not overdue yet; the day after it is.
        assert!(
            svc.notice_recipients(&cid, AvisoTipo::Mora, date(2024, 2, 29))
                .await
                .unwrap()
                .is_empty()
        );
        assert_eq!(
            svc.notice_recipients(&cid, AvisoTipo::Mora, date(2024, 3, 1))
                .await
                .unwrap()
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn test_send_avisos_records_each_recipient() {
        let (svc, cid, _) = fixture().await;
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap();
        let mensaje = svc
            .default_notice_message(&cid, AvisoTipo::Mora)
            .await
            .unwrap();
        assert!(mensaje.contains("Torre Sur"));

        let sent = svc
            .send_avisos(&cid, AvisoTipo::Mora, &mensaje, now)
            .await
            .unwrap();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|a| a.enviado && a.fecha_envio == now));
        assert_eq!(svc.list_avisos(Some(&cid)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_send_avisos_errors() {
        let (svc, cid, _) = fixture().await;
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();

        assert!(matches!(
            svc.send_avisos(&cid, AvisoTipo::Mora, "  ", now).await,
            Err(AdminError::ValidationError(_))
        ));
        assert!(matches!(
            svc.send_avisos("missing", AvisoTipo::Mora, "hola", now)
                .await,
            Err(AdminError::NotFound { .. })
        ));
        assert!(matches!(
            svc.send_avisos(&cid, AvisoTipo::Mora, "hola", now).await,
            Err(AdminError::NoRecipients)
        ));
        assert!(svc.list_avisos(None).await.unwrap().is_empty());
    }

    #[test]
    fn test_huge_lookahead_covers_every_pending_fee() {
        let e = expensa("c1", "u1", "2024-01", Money::new(dec!(100)));
        let today = date(2024, 1, 1);
        assert!(qualifies(AvisoTipo::Vencimiento, &e, today, i64::MAX));
        assert!(qualifies(AvisoTipo::Vencimiento, &e, today, 3650));
        assert!(!qualifies(AvisoTipo::Vencimiento, &e, today, 0));
    }
}
