use super::ServiceOptions;
use super::collection::Collection;
use crate::domain::aviso::Aviso;
use crate::domain::consorcio::{Consorcio, ConsorcioForm};
use crate::domain::expensa::{Expensa, ExpensaFilter, distinct_periods};
use crate::domain::generate_id;
use crate::domain::money::Money;
use crate::domain::pago::{Pago, PagoForm};
use crate::domain::periodo::Periodo;
use crate::domain::ports::KeyValueStoreBox;
use crate::domain::unidad::{Unidad, UnidadForm, check_allocation};
use crate::error::{AdminError, Result};
use chrono::Utc;
use tracing::info;

/// Records removed as a side effect of deleting a parent record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub unidades: usize,
    pub expensas: usize,
    pub pagos: usize,
    pub avisos: usize,
}

/// The main entry point for administering consorcios.
///
/// `AdminService` owns the storage backend and applies every mutation with
/// its referential side effects (cascading deletes, the expensa paid flag,
/// the per-consorcio percentage cap). Operations await each read and write
/// in order, so they behave as one sequential user session.
pub struct AdminService {
    store: KeyValueStoreBox,
    options: ServiceOptions,
}

impl AdminService {
    /// Creates a service over `store` with default options.
    pub fn new(store: KeyValueStoreBox) -> Self {
        Self::with_options(store, ServiceOptions::default())
    }

    pub fn with_options(store: KeyValueStoreBox, options: ServiceOptions) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    pub(crate) fn consorcios(&self) -> Collection<'_, Consorcio> {
        Collection::new(self.store.as_ref())
    }

    pub(crate) fn unidades(&self) -> Collection<'_, Unidad> {
        Collection::new(self.store.as_ref())
    }

    pub(crate) fn expensas(&self) -> Collection<'_, Expensa> {
        Collection::new(self.store.as_ref())
    }

    pub(crate) fn pagos(&self) -> Collection<'_, Pago> {
        Collection::new(self.store.as_ref())
    }

    pub(crate) fn avisos(&self) -> Collection<'_, Aviso> {
        Collection::new(self.store.as_ref())
    }

    // Consorcios

    /// Lists consorcios, optionally narrowed by a search term.
    pub async fn list_consorcios(&self, search: Option<&str>) -> Result<Vec<Consorcio>> {
        let all = self.consorcios().all().await?;
        Ok(match search {
            Some(term) => all.into_iter().filter(|c| c.matches(term)).collect(),
            None => all,
        })
    }

    pub async fn get_consorcio(&self, id: &str) -> Result<Consorcio> {
        self.consorcios().get(id).await
    }

    pub async fn create_consorcio(&self, form: ConsorcioForm) -> Result<Consorcio> {
        form.validate()?;
        let consorcio = Consorcio::new(form);
        self.consorcios().upsert(consorcio.clone()).await?;
        info!(id = %consorcio.id, nombre = %consorcio.nombre, "consorcio created");
        Ok(consorcio)
    }

    pub async fn update_consorcio(&self, id: &str, form: ConsorcioForm) -> Result<Consorcio> {
        form.validate()?;
        let mut consorcio = self.consorcios().get(id).await?;
        consorcio.apply(form);
        self.consorcios().upsert(consorcio.clone()).await?;
        info!(id = %consorcio.id, "consorcio updated");
        Ok(consorcio)
    }

    /// Deletes a consorcio and everything that references it.
    pub async fn delete_consorcio(&self, id: &str) -> Result<CascadeReport> {
        let removed = self.consorcios().retain(|c| c.id != id).await?;
        if removed.is_empty() {
            return Err(AdminError::not_found("Consorcio", id));
        }

        let report = CascadeReport {
            unidades: self.unidades().retain(|u| u.consorcio_id != id).await?.len(),
            expensas: self.expensas().retain(|e| e.consorcio_id != id).await?.len(),
            pagos: self.pagos().retain(|p| p.consorcio_id != id).await?.len(),
            avisos: self.avisos().retain(|a| a.consorcio_id != id).await?.len(),
        };
        info!(id, ?report, "consorcio deleted");
        Ok(report)
    }

    // Unidades

    pub async fn list_unidades(
        &self,
        consorcio_id: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<Unidad>> {
        Ok(self
            .unidades()
            .all()
            .await?
            .into_iter()
            .filter(|u| consorcio_id.is_none_or(|id| u.consorcio_id == id))
            .filter(|u| search.is_none_or(|term| u.matches(term)))
            .collect())
    }

    pub async fn get_unidad(&self, id: &str) -> Result<Unidad> {
        self.unidades().get(id).await
    }

    /// Adds a unit, rejecting it if the consorcio's shares would pass 100%.
    pub async fn create_unidad(&self, consorcio_id: &str, form: UnidadForm) -> Result<Unidad> {
        form.validate()?;
        self.consorcios().get(consorcio_id).await?;

        let all = self.unidades().all().await?;
        check_allocation(&all, consorcio_id, None, form.porcentaje)?;

        let unidad = Unidad::new(consorcio_id, form);
        self.unidades().upsert(unidad.clone()).await?;
        info!(id = %unidad.id, consorcio_id, numero = %unidad.numero, "unidad created");
        Ok(unidad)
    }

    pub async fn update_unidad(&self, id: &str, form: UnidadForm) -> Result<Unidad> {
        form.validate()?;
        let all = self.unidades().all().await?;
        let mut unidad = all
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| AdminError::not_found("Unidad", id))?;
        check_allocation(&all, &unidad.consorcio_id, Some(id), form.porcentaje)?;

        unidad.apply(form);
        self.unidades().upsert(unidad.clone()).await?;
        info!(id, "unidad updated");
        Ok(unidad)
    }

    /// Deletes a unit with its expensas, pagos and avisos.
    pub async fn delete_unidad(&self, id: &str) -> Result<CascadeReport> {
        let removed = self.unidades().retain(|u| u.id != id).await?;
        if removed.is_empty() {
            return Err(AdminError::not_found("Unidad", id));
        }

        let report = CascadeReport {
            unidades: removed.len(),
            expensas: self.expensas().retain(|e| e.unidad_id != id).await?.len(),
            pagos: self.pagos().retain(|p| p.unidad_id != id).await?.len(),
            avisos: self.avisos().retain(|a| a.unidad_id != id).await?.len(),
        };
        info!(id, ?report, "unidad deleted");
        Ok(report)
    }

    // Expensas

    pub async fn list_expensas(&self, filter: &ExpensaFilter) -> Result<Vec<Expensa>> {
        Ok(self
            .expensas()
            .all()
            .await?
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect())
    }

    pub async fn get_expensa(&self, id: &str) -> Result<Expensa> {
        self.expensas().get(id).await
    }

    /// Distinct billing periods with at least one expensa, newest first.
    pub async fn periods(&self) -> Result<Vec<Periodo>> {
        Ok(distinct_periods(&self.expensas().all().await?))
    }

    /// Deletes an expensa and its pagos; returns how many pagos went with it.
    pub async fn delete_expensa(&self, id: &str) -> Result<usize> {
        let removed = self.expensas().retain(|e| e.id != id).await?;
        if removed.is_empty() {
            return Err(AdminError::not_found("Expensa", id));
        }
        let pagos = self.pagos().retain(|p| p.expensa_id != id).await?.len();
        info!(id, pagos, "expensa deleted");
        Ok(pagos)
    }

    // Pagos

    /// Lists pagos, optionally by consorcio and by a term matched against the
    /// paying unit's number or owner.
    pub async fn list_pagos(
        &self,
        consorcio_id: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<Pago>> {
        let pagos = self.pagos().all().await?;
        let Some(term) = search.filter(|t| !t.is_empty()) else {
            return Ok(pagos
                .into_iter()
                .filter(|p| consorcio_id.is_none_or(|id| p.consorcio_id == id))
                .collect());
        };

        let expensas = self.expensas().all().await?;
        let unidades = self.unidades().all().await?;
        let unit_matches = |pago: &Pago| {
            expensas
                .iter()
                .find(|e| e.id == pago.expensa_id)
                .and_then(|e| unidades.iter().find(|u| u.id == e.unidad_id))
                .is_some_and(|u| {
                    crate::domain::contains_ignore_case(&u.numero, term)
                        || crate::domain::contains_ignore_case(&u.propietario, term)
                })
        };

        Ok(pagos
            .into_iter()
            .filter(|p| consorcio_id.is_none_or(|id| p.consorcio_id == id))
            .filter(|p| unit_matches(p))
            .collect())
    }

    pub async fn pagos_by_expensa(&self, expensa_id: &str) -> Result<Vec<Pago>> {
        Ok(self
            .pagos()
            .all()
            .await?
            .into_iter()
            .filter(|p| p.expensa_id == expensa_id)
            .collect())
    }

    /// Logs a payment and marks its expensa as paid.
    pub async fn register_pago(&self, form: PagoForm) -> Result<Pago> {
        let monto = Money::positive(form.monto.value())?;
        let mut expensa = self.expensas().get(&form.expensa_id).await?;

        let pago = Pago {
            id: generate_id(),
            expensa_id: expensa.id.clone(),
            unidad_id: expensa.unidad_id.clone(),
            consorcio_id: expensa.consorcio_id.clone(),
            fecha: form.fecha,
            monto,
            metodo_pago: form.metodo_pago,
            comprobante: form.comprobante,
            created_at: Utc::now(),
        };
        self.pagos().upsert(pago.clone()).await?;

        expensa.pagada = true;
        self.expensas().upsert(expensa).await?;
        info!(id = %pago.id, expensa_id = %pago.expensa_id, monto = %pago.monto, "pago registered");
        Ok(pago)
    }

    /// Removes a payment. When it was the last one for its expensa the
    /// expensa reverts to unpaid. Unknown ids are ignored.
    pub async fn delete_pago(&self, id: &str) -> Result<Option<Pago>> {
        let removed = self.pagos().retain(|p| p.id != id).await?;
        let Some(pago) = removed.into_iter().next() else {
            return Ok(None);
        };

        let remaining = self.pagos_by_expensa(&pago.expensa_id).await?;
        if remaining.is_empty()
            && let Some(mut expensa) = self.expensas().find(&pago.expensa_id).await?
        {
            expensa.pagada = false;
            self.expensas().upsert(expensa).await?;
        }
        info!(id, expensa_id = %pago.expensa_id, "pago deleted");
        Ok(Some(pago))
    }

    // Avisos

    pub async fn list_avisos(&self, consorcio_id: Option<&str>) -> Result<Vec<Aviso>> {
        Ok(self
            .avisos()
            .all()
            .await?
            .into_iter()
            .filter(|a| consorcio_id.is_none_or(|id| a.consorcio_id == id))
            .collect())
    }
}
