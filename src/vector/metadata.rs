use crate::vector::client::to_body;
use crate::vector::schema::{
    ListVectorsOptions, MetadataIndexList, MetadataIndexSpec, MutationResult, PropertyNameRequest,
    VectorListing,
};
use crate::vector::validator::{validate_index_name, validate_list_limit, validate_property_name};
use crate::vector::{ConnectionConfig, VectorizeClient, VectorizeResult};
use reqwest::Method;
use tracing::instrument;
use url::form_urlencoded;

impl VectorizeClient {
    #[instrument(skip(self, config, spec), fields(property = %spec.property_name))]
    pub async fn create_metadata_index(
        &self,
        config: &ConnectionConfig,
        index_name: &str,
        spec: &MetadataIndexSpec,
    ) -> VectorizeResult<MutationResult> {
        validate_index_name(index_name)?;
        validate_property_name(&spec.property_name)?;
        self.execute(
            config,
            &format!("indexes/{}/metadata_index/create", index_name),
            Method::POST,
            Some(to_body(spec)?),
        )
        .await
    }

    #[instrument(skip(self, config))]
    pub async fn delete_metadata_index(
        &self,
        config: &ConnectionConfig,
        index_name: &str,
        property_name: &str,
    ) -> VectorizeResult<MutationResult> {
        validate_index_name(index_name)?;
        validate_property_name(property_name)?;
        self.execute(
            config,
            &format!("indexes/{}/metadata_index/delete", index_name),
            Method::POST,
            Some(to_body(&PropertyNameRequest { property_name })?),
        )
        .await
    }

    #[instrument(skip(self, config))]
    pub async fn list_metadata_indexes(
        &self,
        config: &ConnectionConfig,
        index_name: &str,
    ) -> VectorizeResult<MetadataIndexList> {
        validate_index_name(index_name)?;
        let listed: Option<MetadataIndexList> = self
            .execute(
                config,
                &format!("indexes/{}/metadata_index/list", index_name),
                Method::GET,
                None,
            )
            .await?;
        Ok(listed.unwrap_or_default())
    }

    /// Pages through vector ids. Pass the previous `next_cursor` to continue.
    #[instrument(skip(self, config))]
    pub async fn list_vectors(
        &self,
        config: &ConnectionConfig,
        index_name: &str,
        options: &ListVectorsOptions,
    ) -> VectorizeResult<VectorListing> {
        validate_index_name(index_name)?;
        if let Some(limit) = options.limit {
            validate_list_limit(limit)?;
        }
        let listed: Option<VectorListing> = self
            .execute(config, &list_vectors_path(index_name, options), Method::GET, None)
            .await?;
        Ok(listed.unwrap_or_default())
    }
}

fn list_vectors_path(index_name: &str, options: &ListVectorsOptions) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if let Some(cursor) = options.cursor.as_deref().filter(|c| !c.is_empty()) {
        query.append_pair("cursor", cursor);
    }
    if let Some(limit) = options.limit {
        query.append_pair("limit", &limit.to_string());
    }
    let query = query.finish();

    if query.is_empty() {
        format!("indexes/{}/list", index_name)
    } else {
        format!("indexes/{}/list?{}", index_name, query)
    }
}
