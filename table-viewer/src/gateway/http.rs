//! reqwest implementation of [`Gateway`]

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{Gateway, GatewayError};
use crate::config::GatewayConfig;
use crate::schema::{
    value_text, AddRowRequest, ColumnSchema, DatabasesResponse, ErrorResponse,
    MutationResponse, Relation, RelationsResponse, Row, SchemaResponse, StatusResponse,
    TableData, TablesResponse, UpdateRowRequest,
};

/// Gateway client over HTTP
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
}

impl HttpGateway {
    /// Build a client for the gateway described by `config`
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|error| GatewayError::InvalidUrl(format!("{}: {}", config.base_url, error)))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(config.base_url.clone()));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    /// Base URL every endpoint is resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Decode a read endpoint's body, turning error statuses into [`GatewayError::Status`]
    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let reported = response
            .json::<ErrorResponse>()
            .await
            .ok()
            .and_then(|body| body.error);
        Err(GatewayError::Status {
            status: status.as_u16(),
            reported: reported.is_some(),
            message: reported.unwrap_or_else(|| status.to_string()),
        })
    }

    /// Interpret a mutation endpoint's `{success, error}` body
    async fn read_mutation(response: Response) -> Result<(), GatewayError> {
        let status = response.status();
        let body = response.json::<MutationResponse>().await;

        match body {
            Ok(MutationResponse { success: true, .. }) if status.is_success() => Ok(()),
            Ok(MutationResponse {
                error: Some(reason),
                ..
            }) => Err(GatewayError::Rejected(reason)),
            Ok(_) if status.is_success() => Err(GatewayError::Rejected(
                "the server did not confirm the change".to_string(),
            )),
            Ok(_) => Err(GatewayError::Status {
                status: status.as_u16(),
                message: status.to_string(),
                reported: false,
            }),
            Err(_) if !status.is_success() => Err(GatewayError::Status {
                status: status.as_u16(),
                message: status.to_string(),
                reported: false,
            }),
            Err(error) => Err(error.into()),
        }
    }
}

/// Text of a row identifier as it appears in the URL path
fn id_segment(id: &Value) -> String {
    value_text(id)
        .map(|text| text.into_owned())
        .unwrap_or_else(|| "null".to_string())
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn status(&self) -> Result<(), GatewayError> {
        let response = self.client.get(self.endpoint(&["status"])?).send().await?;
        let body: StatusResponse = Self::read_json(response).await?;

        if body.status == "ok" {
            Ok(())
        } else {
            Err(GatewayError::Unhealthy(body.status))
        }
    }

    async fn list_databases(&self) -> Result<Vec<String>, GatewayError> {
        let response = self.client.get(self.endpoint(&["databases"])?).send().await?;
        let body: DatabasesResponse = Self::read_json(response).await?;
        Ok(body.databases)
    }

    async fn list_tables(&self, database: &str) -> Result<Vec<String>, GatewayError> {
        let response = self
            .client
            .get(self.endpoint(&["tables"])?)
            .query(&[("database", database)])
            .send()
            .await?;
        let body: TablesResponse = Self::read_json(response).await?;
        Ok(body.tables)
    }

    async fn fetch_rows(&self, database: &str, table: &str) -> Result<TableData, GatewayError> {
        let response = self
            .client
            .get(self.endpoint(&["tables", table, "data"])?)
            .query(&[("database", database)])
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn fetch_schema(
        &self,
        database: &str,
        table: &str,
    ) -> Result<Vec<ColumnSchema>, GatewayError> {
        let response = self
            .client
            .get(self.endpoint(&["tables", table, "schema-details"])?)
            .query(&[("database", database)])
            .send()
            .await?;
        let body: SchemaResponse = Self::read_json(response).await?;
        Ok(body.schema)
    }

    async fn list_relations(&self, database: &str) -> Result<Vec<Relation>, GatewayError> {
        let response = self
            .client
            .get(self.endpoint(&["relations"])?)
            .query(&[("database", database)])
            .send()
            .await?;
        let body: RelationsResponse = Self::read_json(response).await?;
        Ok(body.relations)
    }

    async fn add_row(&self, database: &str, table: &str, record: &Row) -> Result<(), GatewayError> {
        let request = AddRowRequest {
            database: Some(database.to_string()),
            record: record.clone(),
        };
        let response = self
            .client
            .post(self.endpoint(&["tables", table, "add"])?)
            .json(&request)
            .send()
            .await?;
        Self::read_mutation(response).await
    }

    async fn update_row(
        &self,
        database: &str,
        table: &str,
        id: &Value,
        record: &Row,
        id_column: &str,
    ) -> Result<(), GatewayError> {
        let id = id_segment(id);
        let request = UpdateRowRequest {
            database: Some(database.to_string()),
            record: record.clone(),
            id_column: id_column.to_string(),
        };
        let response = self
            .client
            .put(self.endpoint(&["tables", table, "update", id.as_str()])?)
            .json(&request)
            .send()
            .await?;
        Self::read_mutation(response).await
    }

    async fn delete_row(
        &self,
        database: &str,
        table: &str,
        id: &Value,
        id_column: &str,
    ) -> Result<(), GatewayError> {
        let id = id_segment(id);
        let response = self
            .client
            .delete(self.endpoint(&["tables", table, "delete", id.as_str()])?)
            .query(&[("database", database), ("id_column", id_column)])
            .send()
            .await?;
        Self::read_mutation(response).await
    }
}
