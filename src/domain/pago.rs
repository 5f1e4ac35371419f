use super::money::Money;
use super::ports::{Record, StorageKey};
use chrono::{DateTime, NaiveDate, Utc};
use crate::error::AdminError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum MetodoPago {
    Efectivo,
    Transferencia,
    Cheque,
    DebitoAutomatico,
}

impl fmt::Display for MetodoPago {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MetodoPago::Efectivo => "EFECTIVO",
            MetodoPago::Transferencia => "TRANSFERENCIA",
            MetodoPago::Cheque => "CHEQUE",
            MetodoPago::DebitoAutomatico => "DEBITO AUTOMATICO",
        })
    }
}

impl FromStr for MetodoPago {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "efectivo" => Ok(MetodoPago::Efectivo),
            "transferencia" => Ok(MetodoPago::Transferencia),
            "cheque" => Ok(MetodoPago::Cheque),
            "debito_automatico" => Ok(MetodoPago::DebitoAutomatico),
            other => Err(AdminError::validation(format!(
                "Unknown metodo de pago '{other}'"
            ))),
        }
    }
}

/// A payment logged against one expensa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pago {
    pub id: String,
    pub expensa_id: String,
    /// Copied from the expensa at registration time.
    pub unidad_id: String,
    /// Copied from the expensa at registration time.
    pub consorcio_id: String,
    pub fecha: NaiveDate,
    pub monto: Money,
    pub metodo_pago: MetodoPago,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comprobante: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Pago {
    /// Receipt number: last 8 characters of the id, uppercased.
    pub fn receipt_number(&self) -> String {
        let chars: Vec<char> = self.id.chars().collect();
        let start = chars.len().saturating_sub(8);
        chars[start..].iter().collect::<String>().to_uppercase()
    }
}

impl Record for Pago {
    const KEY: StorageKey = StorageKey::Pagos;
    const NAME: &'static str = "Pago";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Input for registering a payment.
#[derive(Debug, Clone, PartialEq)]
pub struct PagoForm {
    pub expensa_id: String,
    pub fecha: NaiveDate,
    pub monto: Money,
    pub metodo_pago: MetodoPago,
    pub comprobante: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pago(id: &str) -> Pago {
        Pago {
            id: id.to_string(),
            expensa_id: "e1".to_string(),
            unidad_id: "u1".to_string(),
            consorcio_id: "c1".to_string(),
            fecha: NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
            monto: Money::new(dec!(1500)),
            metodo_pago: MetodoPago::DebitoAutomatico,
            comprobante: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_receipt_number() {
        assert_eq!(pago("lq3k9x2abcdef12").receipt_number(), "ABCDEF12");
        assert_eq!(pago("abc").receipt_number(), "ABC");
    }

    #[test]
    fn test_metodo_pago_wire_format() {
        let json = serde_json::to_value(pago("p1")).unwrap();
        assert_eq!(json["metodoPago"], "debito_automatico");
        assert!(json.get("comprobante").is_none());

        let parsed: MetodoPago = serde_json::from_str("\"transferencia\"").unwrap();
        assert_eq!(parsed, MetodoPago::Transferencia);
        assert_eq!(MetodoPago::DebitoAutomatico.to_string(), "DEBITO AUTOMATICO");
        assert_eq!("Cheque".parse::<MetodoPago>().unwrap(), MetodoPago::Cheque);
        assert!("bitcoin".parse::<MetodoPago>().is_err());
    }
}
