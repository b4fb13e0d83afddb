use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;

use super::http::{rejected, ProviderHttp};
use super::retry::with_read_retries;
use super::{ProviderError, RecordStore};
use crate::filter::Filter;

const REST_PREFIX: &str = "rest/v1/";

/// Postgres `invalid_text_representation`: a filter value that cannot be cast
/// to the column type (e.g. a non-uuid string compared against a uuid `id`)
const INVALID_TEXT_REPRESENTATION: &str = "22P02";

/// Record store backed by the hosted table REST API
#[derive(Debug, Clone)]
pub struct HttpRecordStore {
    http: ProviderHttp,
}

impl HttpRecordStore {
    pub fn new(http: ProviderHttp) -> Self {
        Self { http }
    }

    fn table_url(&self, table: &str, filter: Option<&Filter>) -> Result<url::Url, ProviderError> {
        Filter::validate_table_name(table)?;
        let mut url = self.http.endpoint(&format!("{}{}", REST_PREFIX, table))?;
        if let Some(filter) = filter {
            let pairs = filter.to_query_pairs()?;
            let mut query = url.query_pairs_mut();
            for (key, value) in &pairs {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn fetch_rows(&self, table: &str, filter: &Filter, access_token: &str) -> Result<Vec<Value>, ProviderError> {
        let mut url = self.table_url(table, Some(filter))?;
        url.query_pairs_mut().append_pair("select", "*");
        let response = self
            .http
            .send(self.http.request(Method::GET, url, Some(access_token)))
            .await?;
        ProviderHttp::decode(response).await
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn insert(&self, table: &str, row: Value, access_token: &str) -> Result<Value, ProviderError> {
        let url = self.table_url(table, None)?;
        let response = self
            .http
            .send(
                self.http
                    .request(Method::POST, url, Some(access_token))
                    .header("Prefer", "return=representation")
                    .json(&row),
            )
            .await?;
        let rows: Vec<Value> = ProviderHttp::decode(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ProviderError::Decode(format!("insert into {} returned no rows", table)))
    }

    async fn select(&self, table: &str, filter: &Filter, access_token: &str) -> Result<Vec<Value>, ProviderError> {
        with_read_retries("select", self.http.read_retries, self.http.retry_backoff, || {
            self.fetch_rows(table, filter, access_token)
        })
        .await
    }

    async fn delete(&self, table: &str, filter: &Filter, access_token: &str) -> Result<Vec<Value>, ProviderError> {
        if filter.conditions().is_empty() {
            return Err(ProviderError::InvalidRequest(format!(
                "refusing unfiltered delete on {}",
                table
            )));
        }
        let url = self.table_url(table, Some(filter))?;
        let response = self
            .http
            .send(
                self.http
                    .request(Method::DELETE, url, Some(access_token))
                    .header("Prefer", "return=representation"),
            )
            .await?;

        // A key that cannot be cast to the column type matches no row
        if response.status() == StatusCode::BAD_REQUEST {
            let status = response.status();
            let body = response.text().await?;
            if postgres_error_code(&body).as_deref() == Some(INVALID_TEXT_REPRESENTATION) {
                tracing::debug!("Delete on {} matched nothing: filter value not castable", table);
                return Ok(Vec::new());
            }
            return Err(rejected(status, &body));
        }
        ProviderHttp::decode(response).await
    }
}

fn postgres_error_code(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("code")?
        .as_str()
        .map(str::to_string)
}
