//! Canonical read/write service for one record kind
//!
//! Reads load local records, map them to wire shells and enrich them.
//! Writes map the wire object back to a local record and persist it; the
//! returned wire object is the shell, not enriched.

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, info};

use crate::application::dto::WireObject;
use crate::application::enrichment::EnrichmentPipeline;
use crate::domain::{DomainError, DomainResult, Record, Repository, RepositoryProvider};

pub struct RecordService<W> {
    repos: Arc<dyn RepositoryProvider>,
    pipeline: Arc<EnrichmentPipeline>,
    _wire: PhantomData<fn() -> W>,
}

impl<W> Clone for RecordService<W> {
    fn clone(&self) -> Self {
        Self {
            repos: self.repos.clone(),
            pipeline: self.pipeline.clone(),
            _wire: PhantomData,
        }
    }
}

impl<W: WireObject> RecordService<W> {
    pub fn new(repos: Arc<dyn RepositoryProvider>, pipeline: Arc<EnrichmentPipeline>) -> Self {
        Self {
            repos,
            pipeline,
            _wire: PhantomData,
        }
    }

    fn repository(&self) -> &dyn Repository<W::Local> {
        W::Local::repository(self.repos.as_ref())
    }

    pub async fn find_all(&self) -> DomainResult<Vec<W>> {
        let records = self.repository().find_all().await?;
        debug!(entity = W::Local::ENTITY, count = records.len(), "Enriching collection");
        let shells = records.into_iter().map(W::to_wire).collect();
        Ok(self.pipeline.enrich_all(shells).await)
    }

    pub async fn find_by_id(&self, id: i32) -> DomainResult<W> {
        let record = self
            .repository()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(W::Local::ENTITY, id))?;
        Ok(self.pipeline.enrich_one(W::to_wire(record)).await)
    }

    pub async fn save(&self, wire: W) -> DomainResult<W> {
        let saved = self.repository().save(wire.to_local()?).await?;
        info!(entity = W::Local::ENTITY, id = ?saved.id(), "Record saved");
        Ok(W::to_wire(saved))
    }

    /// Overwrite an existing record; the body must carry its identity.
    pub async fn update(&self, wire: W) -> DomainResult<W> {
        let record = wire.to_local()?;
        let id = record.id().ok_or_else(|| {
            DomainError::Validation(format!("{} id is required for update", W::Local::ENTITY))
        })?;
        self.overwrite(id, record).await
    }

    /// Overwrite the record at `id`; the path identity wins over the body's.
    pub async fn update_by_id(&self, id: i32, wire: W) -> DomainResult<W> {
        let record = wire.to_local()?.with_id(id);
        self.overwrite(id, record).await
    }

    pub async fn delete_by_id(&self, id: i32) -> DomainResult<()> {
        self.ensure_exists(id).await?;
        self.repository().delete_by_id(id).await?;
        info!(entity = W::Local::ENTITY, id, "Record deleted");
        Ok(())
    }

    async fn overwrite(&self, id: i32, record: W::Local) -> DomainResult<W> {
        self.ensure_exists(id).await?;
        let saved = self.repository().save(record).await?;
        info!(entity = W::Local::ENTITY, id, "Record updated");
        Ok(W::to_wire(saved))
    }

    async fn ensure_exists(&self, id: i32) -> DomainResult<()> {
        match self.repository().find_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found(W::Local::ENTITY, id)),
        }
    }
}
