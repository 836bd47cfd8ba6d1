use crate::vector::client::to_body;
use crate::vector::schema::{CreateIndexRequest, IndexDescription, IndexInfo};
use crate::vector::validator::{validate_index_config, validate_index_name};
use crate::vector::{ConnectionConfig, VectorizeClient, VectorizeResult};
use reqwest::Method;
use serde_json::Value;
use tracing::instrument;

impl VectorizeClient {
    #[instrument(skip(self, config, request), fields(index = %request.name))]
    pub async fn create_index(
        &self,
        config: &ConnectionConfig,
        request: &CreateIndexRequest,
    ) -> VectorizeResult<IndexDescription> {
        validate_index_name(&request.name)?;
        validate_index_config(&request.config)?;
        self.execute(config, "indexes", Method::POST, Some(to_body(request)?))
            .await
    }

    #[instrument(skip(self, config))]
    pub async fn list_indexes(
        &self,
        config: &ConnectionConfig,
    ) -> VectorizeResult<Vec<IndexDescription>> {
        let listed: Option<Vec<IndexDescription>> =
            self.execute(config, "indexes", Method::GET, None).await?;
        Ok(listed.unwrap_or_default())
    }

    #[instrument(skip(self, config))]
    pub async fn get_index(
        &self,
        config: &ConnectionConfig,
        index_name: &str,
    ) -> VectorizeResult<IndexDescription> {
        validate_index_name(index_name)?;
        self.execute(config, &format!("indexes/{}", index_name), Method::GET, None)
            .await
    }

    /// Same request and result as [`get_index`](Self::get_index); the service has no
    /// separate describe call.
    pub async fn describe_index(
        &self,
        config: &ConnectionConfig,
        index_name: &str,
    ) -> VectorizeResult<IndexDescription> {
        self.get_index(config, index_name).await
    }

    #[instrument(skip(self, config))]
    pub async fn delete_index(
        &self,
        config: &ConnectionConfig,
        index_name: &str,
    ) -> VectorizeResult<()> {
        validate_index_name(index_name)?;
        let _: Value = self
            .execute(config, &format!("indexes/{}", index_name), Method::DELETE, None)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, config))]
    pub async fn index_info(
        &self,
        config: &ConnectionConfig,
        index_name: &str,
    ) -> VectorizeResult<IndexInfo> {
        validate_index_name(index_name)?;
        self.execute(config, &format!("indexes/{}/info", index_name), Method::GET, None)
            .await
    }
}
