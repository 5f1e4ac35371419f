use super::ports::{Record, StorageKey};
use super::{contains_ignore_case, generate_id, require_field};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A managed building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consorcio {
    pub id: String,
    pub nombre: String,
    pub cuit: String,
    pub direccion: String,
    pub telefono: String,
    pub email: String,
    pub administrador: String,
    pub created_at: DateTime<Utc>,
}

/// Editable fields of a consorcio.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsorcioForm {
    pub nombre: String,
    pub cuit: String,
    pub direccion: String,
    pub telefono: String,
    pub email: String,
    pub administrador: String,
}

impl ConsorcioForm {
    pub fn validate(&self) -> Result<()> {
        require_field("nombre", &self.nombre)?;
        require_field("cuit", &self.cuit)?;
        require_field("direccion", &self.direccion)?;
        require_field("telefono", &self.telefono)?;
        require_field("email", &self.email)?;
        require_field("administrador", &self.administrador)
    }
}

impl Consorcio {
    pub fn new(form: ConsorcioForm) -> Self {
        Self {
            id: generate_id(),
            nombre: form.nombre,
            cuit: form.cuit,
            direccion: form.direccion,
            telefono: form.telefono,
            email: form.email,
            administrador: form.administrador,
            created_at: Utc::now(),
        }
    }

    /// Replaces the editable fields, keeping identity and creation time.
    pub fn apply(&mut self, form: ConsorcioForm) {
        self.nombre = form.nombre;
        self.cuit = form.cuit;
        self.direccion = form.direccion;
        self.telefono = form.telefono;
        self.email = form.email;
        self.administrador = form.administrador;
    }

    /// Search by name or address (case-insensitive) or CUIT (exact substring).
    pub fn matches(&self, term: &str) -> bool {
        contains_ignore_case(&self.nombre, term)
            || self.cuit.contains(term)
            || contains_ignore_case(&self.direccion, term)
    }
}

impl Record for Consorcio {
    const KEY: StorageKey = StorageKey::Consorcios;
    const NAME: &'static str = "Consorcio";

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ConsorcioForm {
        ConsorcioForm {
            nombre: "Edificio Libertador".to_string(),
            cuit: "30-71234567-8".to_string(),
            direccion: "Av. Libertador 1234".to_string(),
            telefono: "011-4555-1234".to_string(),
            email: "admin@libertador.com.ar".to_string(),
            administrador: "Laura Gómez".to_string(),
        }
    }

    #[test]
    fn test_form_validation() {
        assert!(form().validate().is_ok());

        let mut missing = form();
        missing.cuit = String::new();
        assert!(missing.validate().is_err());
    }

    #[test]
    fn test_matches_search_term() {
        let c = Consorcio::new(form());
        assert!(c.matches("libertador"));
        assert!(c.matches("7123"));
        assert!(c.matches("AV. LIB"));
        assert!(!c.matches("palermo"));
    }

    #[test]
    fn test_deserializes_camel_case() {
        let json = r#"{
            "id": "lq3k9x2abc",
            "nombre": "Torre Norte",
            "cuit": "30-1",
            "direccion": "Calle 1",
            "telefono": "123",
            "email": "a@b.c",
            "administrador": "Ana",
            "createdAt": "2024-01-10T12:30:00.000Z"
        }"#;
        let c: Consorcio = serde_json::from_str(json).unwrap();
        assert_eq!(c.id, "lq3k9x2abc");
        assert_eq!(c.nombre, "Torre Norte");

        let back = serde_json::to_value(&c).unwrap();
        assert!(back.get("createdAt").is_some());
    }
}
