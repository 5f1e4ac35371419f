use super::money::Percentage;
use super::ports::{Record, StorageKey};
use super::{contains_ignore_case, generate_id, require_field};
use crate::error::{AdminError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An individually owned unit inside a consorcio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unidad {
    pub id: String,
    pub consorcio_id: String,
    pub numero: String,
    pub piso: String,
    pub propietario: String,
    pub email: String,
    pub telefono: String,
    pub porcentaje: Percentage,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnidadForm {
    pub numero: String,
    pub piso: String,
    pub propietario: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telefono: String,
    pub porcentaje: Percentage,
}

impl UnidadForm {
    pub fn validate(&self) -> Result<()> {
        require_field("numero", &self.numero)?;
        require_field("piso", &self.piso)?;
        require_field("propietario", &self.propietario)
    }
}

impl Unidad {
    pub fn new(consorcio_id: impl Into<String>, form: UnidadForm) -> Self {
        Self {
            id: generate_id(),
            consorcio_id: consorcio_id.into(),
            numero: form.numero,
            piso: form.piso,
            propietario: form.propietario,
            email: form.email,
            telefono: form.telefono,
            porcentaje: form.porcentaje,
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, form: UnidadForm) {
        self.numero = form.numero;
        self.piso = form.piso;
        self.propietario = form.propietario;
        self.email = form.email;
        self.telefono = form.telefono;
        self.porcentaje = form.porcentaje;
    }

    pub fn matches(&self, term: &str) -> bool {
        contains_ignore_case(&self.numero, term)
            || contains_ignore_case(&self.propietario, term)
            || contains_ignore_case(&self.piso, term)
    }

    /// Short label used in listings and reports: `numero - propietario`.
    pub fn label(&self) -> String {
        format!("{} - {}", self.numero, self.propietario)
    }
}

impl Record for Unidad {
    const KEY: StorageKey = StorageKey::Unidades;
    const NAME: &'static str = "Unidad";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Sum of the shares of `unidades` belonging to `consorcio_id`, skipping `exclude_id`.
pub fn allocated_percentage(
    unidades: &[Unidad],
    consorcio_id: &str,
    exclude_id: Option<&str>,
) -> Decimal {
    unidades
        .iter()
        .filter(|u| u.consorcio_id == consorcio_id)
        .filter(|u| Some(u.id.as_str()) != exclude_id)
        .map(|u| u.porcentaje.value())
        .sum()
}

/// Checks that giving a unit `requested` keeps the consorcio total at or under 100.
pub fn check_allocation(
    unidades: &[Unidad],
    consorcio_id: &str,
    exclude_id: Option<&str>,
    requested: Percentage,
) -> Result<()> {
    let current = allocated_percentage(unidades, consorcio_id, exclude_id);
    if current + requested.value() > Decimal::ONE_HUNDRED {
        Err(AdminError::PercentageExceeded {
            current,
            available: Decimal::ONE_HUNDRED - current,
        })
    } else {
        Ok(())
    }
}
