use crate::vector::client::to_body;
use crate::vector::schema::{IdsRequest, MutationResult, Vector, VectorsRequest};
use crate::vector::transformation::batch_vectors;
use crate::vector::validator::{validate_ids, validate_index_name, validate_vectors};
use crate::vector::{ConnectionConfig, VectorizeClient, VectorizeResult};
use reqwest::Method;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Insert,
    Upsert,
}

impl WriteMode {
    fn path(self) -> &'static str {
        match self {
            WriteMode::Insert => "insert",
            WriteMode::Upsert => "upsert",
        }
    }
}

impl VectorizeClient {
    /// Inserts vectors in one request. Ids that already exist are left untouched by the service.
    #[instrument(skip(self, config, vectors), fields(count = vectors.len()))]
    pub async fn insert_vectors(
        &self,
        config: &ConnectionConfig,
        index_name: &str,
        vectors: &[Vector],
        expected_dimensions: Option<usize>,
    ) -> VectorizeResult<MutationResult> {
        self.write(config, index_name, vectors, expected_dimensions, WriteMode::Insert)
            .await
    }

    /// Inserts vectors in one request, replacing any with the same id.
    #[instrument(skip(self, config, vectors), fields(count = vectors.len()))]
    pub async fn upsert_vectors(
        &self,
        config: &ConnectionConfig,
        index_name: &str,
        vectors: &[Vector],
        expected_dimensions: Option<usize>,
    ) -> VectorizeResult<MutationResult> {
        self.write(config, index_name, vectors, expected_dimensions, WriteMode::Upsert)
            .await
    }

    /// Validates the whole set, then sends it as sequential chunks of at most
    /// `batch_size`, stopping at the first failed chunk.
    #[instrument(skip(self, config, vectors), fields(count = vectors.len()))]
    pub async fn insert_vectors_batched(
        &self,
        config: &ConnectionConfig,
        index_name: &str,
        vectors: &[Vector],
        expected_dimensions: Option<usize>,
        batch_size: usize,
    ) -> VectorizeResult<Vec<MutationResult>> {
        self.write_batched(
            config,
            index_name,
            vectors,
            expected_dimensions,
            batch_size,
            WriteMode::Insert,
        )
        .await
    }

    #[instrument(skip(self, config, vectors), fields(count = vectors.len()))]
    pub async fn upsert_vectors_batched(
        &self,
        config: &ConnectionConfig,
        index_name: &str,
        vectors: &[Vector],
        expected_dimensions: Option<usize>,
        batch_size: usize,
    ) -> VectorizeResult<Vec<MutationResult>> {
        self.write_batched(
            config,
            index_name,
            vectors,
            expected_dimensions,
            batch_size,
            WriteMode::Upsert,
        )
        .await
    }

    #[instrument(skip(self, config, ids), fields(count = ids.len()))]
    pub async fn get_vectors_by_ids(
        &self,
        config: &ConnectionConfig,
        index_name: &str,
        ids: &[String],
    ) -> VectorizeResult<Vec<Vector>> {
        validate_index_name(index_name)?;
        validate_ids(ids)?;
        let found: Option<Vec<Vector>> = self
            .execute(
                config,
                &format!("indexes/{}/get_by_ids", index_name),
                Method::POST,
                Some(to_body(&IdsRequest { ids })?),
            )
            .await?;
        Ok(found.unwrap_or_default())
    }

    #[instrument(skip(self, config, ids), fields(count = ids.len()))]
    pub async fn delete_vectors_by_ids(
        &self,
        config: &ConnectionConfig,
        index_name: &str,
        ids: &[String],
    ) -> VectorizeResult<MutationResult> {
        validate_index_name(index_name)?;
        validate_ids(ids)?;
        self.execute(
            config,
            &format!("indexes/{}/delete_by_ids", index_name),
            Method::POST,
            Some(to_body(&IdsRequest { ids })?),
        )
        .await
    }

    async fn write(
        &self,
        config: &ConnectionConfig,
        index_name: &str,
        vectors: &[Vector],
        expected_dimensions: Option<usize>,
        mode: WriteMode,
    ) -> VectorizeResult<MutationResult> {
        validate_index_name(index_name)?;
        validate_vectors(vectors, expected_dimensions)?;
        self.send_vectors(config, index_name, vectors, mode).await
    }

    async fn write_batched(
        &self,
        config: &ConnectionConfig,
        index_name: &str,
        vectors: &[Vector],
        expected_dimensions: Option<usize>,
        batch_size: usize,
        mode: WriteMode,
    ) -> VectorizeResult<Vec<MutationResult>> {
        validate_index_name(index_name)?;
        validate_vectors(vectors, expected_dimensions)?;
        let chunks = batch_vectors(vectors, batch_size)?;

        let mut results = Vec::with_capacity(chunks.len());
        for (batch, chunk) in chunks.enumerate() {
            debug!(batch = batch, size = chunk.len(), "Sending vector batch");
            results.push(self.send_vectors(config, index_name, chunk, mode).await?);
        }
        Ok(results)
    }

    async fn send_vectors(
        &self,
        config: &ConnectionConfig,
        index_name: &str,
        vectors: &[Vector],
        mode: WriteMode,
    ) -> VectorizeResult<MutationResult> {
        self.execute(
            config,
            &format!("indexes/{}/{}", index_name, mode.path()),
            Method::POST,
            Some(to_body(&VectorsRequest { vectors })?),
        )
        .await
    }
}
