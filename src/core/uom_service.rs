//! Uom use-case service.
//!
//! Every mutation checks existence through the repository before acting, so
//! callers can tell "already exists", "not found" and "validation failed"
//! apart. The check and the write are separate calls, not an atomic
//! check-and-set. Each operation issues at most one write.

use crate::core::{IdGenerator, UomRepository, UuidGenerator};
use crate::domain::model::{BaseUom, Uom, UomRules};
use crate::utils::error::{Result, UomError};
use std::sync::Arc;

pub struct UomService<R: UomRepository> {
    repo: R,
    ids: Arc<dyn IdGenerator>,
    rules: UomRules,
}

impl<R: UomRepository> UomService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            ids: Arc::new(UuidGenerator),
            rules: UomRules::default(),
        }
    }

    pub fn with_rules(mut self, rules: UomRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Validates `base`, assigns a fresh id and stores it if that id is absent.
    pub async fn create_uom(&self, base: BaseUom) -> Result<Uom> {
        if let Err(errors) = base.validate_with(&self.rules) {
            tracing::warn!("Rejected uom create: {}", errors);
            return Err(errors.into());
        }

        let uom = Uom::create(base, &self.rules, self.ids.as_ref())?;

        tracing::debug!("Checking for existing uom with id {}", uom.id);
        if self.repo.get_by_id(&uom.id).await?.is_some() {
            tracing::warn!("Generated uom id {} already exists", uom.id);
            return Err(UomError::Conflict { id: uom.id });
        }

        self.repo.save(&uom).await?;
        tracing::info!("Created uom {} ({})", uom.id, uom.base.label);
        Ok(uom)
    }

    pub async fn get_uom_by_id(&self, id: &str) -> Result<Uom> {
        tracing::debug!("Fetching uom {}", id);
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| UomError::NotFound { id: id.to_string() })
    }

    pub async fn get_all_uoms(&self) -> Result<Vec<Uom>> {
        let uoms = self.repo.get_all().await?;
        tracing::debug!("Fetched {} uoms", uoms.len());
        Ok(uoms)
    }

    /// Replaces the payload stored under `id`.
    ///
    /// The existence check runs first, so an absent id reports `NotFound`
    /// even when the payload is also invalid. Nothing is written on failure.
    pub async fn update_uom(&self, id: &str, base: BaseUom) -> Result<Uom> {
        if self.repo.get_by_id(id).await?.is_none() {
            tracing::warn!("Rejected update of missing uom {}", id);
            return Err(UomError::NotFound { id: id.to_string() });
        }

        let uom = Uom::from_parts(id, base);
        if let Err(errors) = uom.validate_with(&self.rules) {
            tracing::warn!("Rejected update of uom {}: {}", id, errors);
            return Err(errors.into());
        }

        self.repo.save(&uom).await?;
        tracing::info!("Updated uom {}", id);
        Ok(uom)
    }

    pub async fn delete_uom(&self, id: &str) -> Result<()> {
        if self.repo.get_by_id(id).await?.is_none() {
            tracing::warn!("Rejected delete of missing uom {}", id);
            return Err(UomError::NotFound { id: id.to_string() });
        }

        self.repo.delete(id).await?;
        tracing::info!("Deleted uom {}", id);
        Ok(())
    }
}
