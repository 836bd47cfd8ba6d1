use crate::vector::client::to_body;
use crate::vector::schema::{QueryByIdRequest, QueryRequest, QueryResult, QueryVector};
use crate::vector::validator::{validate_index_name, validate_top_k, validate_vectors};
use crate::vector::{ConnectionConfig, Vector, VectorizeClient, VectorizeError, VectorizeResult};
use reqwest::Method;
use tracing::instrument;

impl VectorizeClient {
    /// Nearest-neighbour search. `expected_dimensions` is checked against a literal
    /// query vector when given.
    #[instrument(skip(self, config, request), fields(top_k = request.top_k))]
    pub async fn query_vectors(
        &self,
        config: &ConnectionConfig,
        index_name: &str,
        request: &QueryRequest,
        expected_dimensions: Option<usize>,
    ) -> VectorizeResult<QueryResult> {
        validate_index_name(index_name)?;
        validate_query(request, expected_dimensions)?;
        self.send_query(config, index_name, request).await
    }

    /// Searches around a stored vector. The service reuses the query endpoint with
    /// the id in place of the coordinates.
    #[instrument(skip(self, config, request), fields(id = %request.id, top_k = request.top_k))]
    pub async fn query_vector_by_id(
        &self,
        config: &ConnectionConfig,
        index_name: &str,
        request: QueryByIdRequest,
    ) -> VectorizeResult<QueryResult> {
        validate_index_name(index_name)?;
        let query = QueryRequest::from(request);
        validate_query(&query, None)?;
        self.send_query(config, index_name, &query).await
    }

    async fn send_query(
        &self,
        config: &ConnectionConfig,
        index_name: &str,
        request: &QueryRequest,
    ) -> VectorizeResult<QueryResult> {
        self.execute(
            config,
            &format!("indexes/{}/query", index_name),
            Method::POST,
            Some(to_body(request)?),
        )
        .await
    }
}

fn validate_query(
    request: &QueryRequest,
    expected_dimensions: Option<usize>,
) -> VectorizeResult<()> {
    match &request.vector {
        QueryVector::Id(id) if id.trim().is_empty() => {
            return Err(VectorizeError::invalid("query vector id must not be empty"));
        }
        QueryVector::Id(_) => {}
        QueryVector::Values(values) => {
            // Reuse the vector checks so the error names the query.
            let probe = Vector::new("query", values.clone());
            validate_vectors(std::slice::from_ref(&probe), expected_dimensions)?;
        }
    }
    validate_top_k(request.top_k, request.return_values, request.return_metadata)
}
