//! Table-level access to the lake

use polars::prelude::DataFrame;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::paths::{latest_partition_objects, LOAD_DATE_KEY};
use super::store::ObjectStore;
use crate::table::{frame::concat_diagonal, parquet, IntoFrame};
use crate::{error::LakeError, Result};

/// Reads and writes Parquet tables on an [`ObjectStore`].
#[derive(Clone)]
pub struct Lake {
    store: Arc<dyn ObjectStore>,
}

impl Lake {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    pub fn uri(&self, name: &str) -> String {
        self.store.uri(name)
    }

    /// Read a Parquet table; a missing object is an error.
    pub async fn read_table(&self, name: &str) -> Result<DataFrame> {
        self.read_table_opt(name)
            .await?
            .ok_or_else(|| LakeError::ObjectNotFound {
                path: self.uri(name),
            })
    }

    /// Read a Parquet table, `None` when the object does not exist.
    pub async fn read_table_opt(&self, name: &str) -> Result<Option<DataFrame>> {
        match self.store.get(name).await? {
            Some(bytes) => {
                let table = parquet::read_parquet(bytes)?;
                debug!(path = %self.uri(name), rows = table.height(), "read table");
                Ok(Some(table))
            }
            None => Ok(None),
        }
    }

    /// Concatenate every Parquet file in the newest `load_date=` partition.
    pub async fn read_latest_bronze(&self, entity: &str, source: &str) -> Result<DataFrame> {
        self.read_latest_partition(entity, source, LOAD_DATE_KEY)
            .await
    }

    /// Concatenate every Parquet file in the newest `{key}=` partition.
    pub async fn read_latest_partition(
        &self,
        entity: &str,
        source: &str,
        key: &str,
    ) -> Result<DataFrame> {
        let (partition, objects) = latest_partition_objects(self.store(), entity, source, key).await?;
        let mut tables = Vec::with_capacity(objects.len());
        for object in &objects {
            tables.push(self.read_table(&object.name).await?);
        }
        let table = concat_diagonal(tables)?;
        info!(
            source,
            entity,
            partition = %format!("{key}={partition}"),
            files = objects.len(),
            rows = table.height(),
            "loaded latest bronze partition"
        );
        Ok(table)
    }

    /// Write a table as Parquet. Empty tables are skipped and yield `None`.
    pub async fn write_table<T: IntoFrame + ?Sized>(
        &self,
        name: &str,
        table: &T,
    ) -> Result<Option<String>> {
        let table = table.to_frame()?;
        if table.height() == 0 {
            warn!(path = %self.uri(name), "no rows to write, skipping");
            return Ok(None);
        }
        let bytes = parquet::write_parquet(&table)?;
        self.store.put(name, bytes).await?;
        let uri = self.uri(name);
        info!(path = %uri, rows = table.height(), "wrote table");
        Ok(Some(uri))
    }

    /// Write any serializable value as pretty JSON.
    pub async fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<String> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.put_bytes(name, bytes).await
    }

    pub async fn put_bytes(&self, name: &str, bytes: Vec<u8>) -> Result<String> {
        self.store.put(name, bytes).await?;
        Ok(self.uri(name))
    }
}

impl std::fmt::Debug for Lake {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lake").field("root", &self.store.uri("")).finish()
    }
}
