use super::admin::AdminService;
use crate::domain::unidad::{Unidad, UnidadForm};
use crate::error::{AdminError, Result};
use tracing::{info, warn};

/// A row that could not be imported.
#[derive(Debug)]
pub struct RowError {
    pub line: u64,
    pub error: AdminError,
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: Vec<Unidad>,
    pub rejected: Vec<RowError>,
}

impl AdminService {
    /// Creates one unit per row. Rows that fail to parse or break a rule
    /// (including the 100% cap) are collected and the rest still go in.
    pub async fn import_unidades<I>(&self, consorcio_id: &str, rows: I) -> Result<ImportReport>
    where
        I: IntoIterator<Item = (u64, Result<UnidadForm>)>,
    {
        self.consorcios().get(consorcio_id).await?;

        let mut report = ImportReport::default();
        for (line, row) in rows {
            let outcome = match row {
                Ok(form) => self.create_unidad(consorcio_id, form).await,
                Err(e) => Err(e),
            };
            match outcome {
                Ok(unidad) => report.imported.push(unidad),
                Err(
                    e @ (AdminError::IoError(_)
                    | AdminError::SerializationError(_)
                    | AdminError::InternalError(_)),
                ) => return Err(e),
                Err(error) => {
                    warn!(line, %error, "unidad row rejected");
                    report.rejected.push(RowError { line, error });
                }
            }
        }
        info!(
            consorcio_id,
            imported = report.imported.len(),
            rejected = report.rejected.len(),
            "unidades imported"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::admin::test_support::*;
    use crate::interfaces::csv::unidad_reader::UnidadReader;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_import_keeps_good_rows() {
        let svc = service();
        let c = svc.create_consorcio(consorcio_form("Torre")).await.unwrap();
        svc.create_unidad(&c.id, unidad_form("PB", dec!(10)))
            .await
            .unwrap();

        let data = "numero,piso,propietario,email,telefono,porcentaje\n\
                    1A,1,Ana,,,40\n\
                    1B,1,Juan,,,xx\n\
                    1C,1,Luis,,,45\n\
                    1D,1,Marta,,,50";
        let report = svc
            .import_unidades(&c.id, UnidadReader::new(data.as_bytes()).unidades())
            .await
            .unwrap();

        let imported: Vec<&str> = report.imported.iter().map(|u| u.numero.as_str()).collect();
        assert_eq!(imported, vec!["1A", "1C"]);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.rejected[0].line, 3);
        assert!(matches!(
            report.rejected[1].error,
            AdminError::PercentageExceeded { .. }
        ));
        assert_eq!(
            svc.list_unidades(Some(&c.id), None).await.unwrap().len(),
            3
        );
    }

    #[tokio::test]
    async fn test_import_unknown_consorcio() {
        let svc = service();
        let rows = vec![(2, Ok(unidad_form("1A", dec!(10))))];
        assert!(matches!(
            svc.import_unidades("missing", rows).await,
            Err(AdminError::NotFound { .. })
        ));
    }
}
