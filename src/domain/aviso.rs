use super::ports::{Record, StorageKey};
use crate::error::AdminError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AvisoTipo {
    /// Unpaid fee coming due soon.
    Vencimiento,
    /// Unpaid fee past its due date.
    Mora,
    /// Any unpaid fee.
    Recordatorio,
}

impl AvisoTipo {
    pub fn label(&self) -> &'static str {
        match self {
            AvisoTipo::Vencimiento => "Próximo Vencimiento",
            AvisoTipo::Mora => "Mora",
            AvisoTipo::Recordatorio => "Recordatorio",
        }
    }

    /// Default message body for this kind of notice.
    pub fn default_message(&self, consorcio_nombre: &str) -> String {
        match self {
            AvisoTipo::Vencimiento => format!(
                "Estimado propietario,\n\nLe recordamos que su expensa del {consorcio_nombre} vence próximamente. \
                 Por favor, proceda con el pago para evitar recargos.\n\nGracias por su atención.\n\nAdministración"
            ),
            AvisoTipo::Mora => format!(
                "Estimado propietario,\n\nSu expensa del {consorcio_nombre} se encuentra vencida. \
                 Le solicitamos regularice su situación a la brevedad para evitar mayores inconvenientes.\n\n\
                 Para consultas, contáctese con la administración.\n\nAdministración"
            ),
            AvisoTipo::Recordatorio => format!(
                "Estimado propietario,\n\nLe recordamos que tiene expensas pendientes de pago en {consorcio_nombre}. \
                 Por favor, verifique su estado de cuenta.\n\nGracias por su atención.\n\nAdministración"
            ),
        }
    }
}

impl fmt::Display for AvisoTipo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AvisoTipo::Vencimiento => "vencimiento",
            AvisoTipo::Mora => "mora",
            AvisoTipo::Recordatorio => "recordatorio",
        })
    }
}

impl FromStr for AvisoTipo {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vencimiento" => Ok(AvisoTipo::Vencimiento),
            "mora" => Ok(AvisoTipo::Mora),
            "recordatorio" => Ok(AvisoTipo::Recordatorio),
            other => Err(AdminError::validation(format!(
                "Unknown tipo de aviso '{other}'"
            ))),
        }
    }
}

/// A notification sent to a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aviso {
    pub id: String,
    pub consorcio_id: String,
    pub unidad_id: String,
    pub tipo: AvisoTipo,
    pub mensaje: String,
    pub fecha_envio: DateTime<Utc>,
    pub enviado: bool,
    pub created_at: DateTime<Utc>,
}

impl Aviso {
    pub fn sent_on(&self, day: NaiveDate) -> bool {
        self.fecha_envio.date_naive() == day
    }
}

impl Record for Aviso {
    const KEY: StorageKey = StorageKey::Avisos;
    const NAME: &'static str = "Aviso";

    fn id(&self) -> &str {
        &self.id
    }
}
