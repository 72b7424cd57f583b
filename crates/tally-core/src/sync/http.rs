//! `RemoteSyncClient` over the service of record's JSON API.

use reqwest::{RequestBuilder, Response, StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::RemoteConfig;
use crate::models::{RemoteTransaction, Transaction, TransactionKind};
use crate::session::SessionProvider;
use crate::util::{error_excerpt, utc_date};

use super::{RemoteSyncClient, SyncError, SyncResult};

const TRANSACTIONS_PATH: &str = "transactions";
const NEW_TRANSACTIONS_PATH: &str = "transactions/new-transactions";

/// HTTP client for the transactions API
#[derive(Clone)]
pub struct HttpSyncClient<P> {
    config: RemoteConfig,
    client: reqwest::Client,
    session: P,
}

impl<P: SessionProvider> HttpSyncClient<P> {
    pub fn new(config: RemoteConfig, session: P) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            config,
            client,
            session,
        })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// Attach credentials; both the token and the principal are required.
    fn authorize(&self, request: RequestBuilder) -> SyncResult<RequestBuilder> {
        let token = self.session.auth_header().ok_or(SyncError::AuthMissing)?;
        let email = self
            .session
            .principal_identifier()
            .ok_or(SyncError::AuthMissing)?;
        Ok(request
            .header("Authorization", token)
            .header("email", email)
            .header("Accept", "application/json"))
    }
}

impl<P: SessionProvider> RemoteSyncClient for HttpSyncClient<P> {
    async fn batch_create(&self, records: &[Transaction]) -> SyncResult<Vec<RemoteTransaction>> {
        let request = self.authorize(self.client.post(self.config.endpoint(TRANSACTIONS_PATH)))?;
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let body: Vec<TransactionRequest> = records.iter().map(TransactionRequest::from).collect();
        let response = check_status(request.json(&body).send().await?).await?;
        let payload = response.json::<Vec<TransactionResponse>>().await?;
        payload.into_iter().map(RemoteTransaction::try_from).collect()
    }

    async fn update(&self, remote_id: i64, record: &Transaction) -> SyncResult<()> {
        let url = self
            .config
            .endpoint(&format!("{TRANSACTIONS_PATH}/{remote_id}"));
        let request = self.authorize(self.client.patch(url))?;
        check_status(request.json(&TransactionRequest::from(record)).send().await?).await?;
        Ok(())
    }

    async fn delete(&self, remote_id: i64) -> SyncResult<()> {
        let url = self
            .config
            .endpoint(&format!("{TRANSACTIONS_PATH}/{remote_id}"));
        let request = self.authorize(self.client.delete(url))?;
        check_status(request.send().await?).await?;
        Ok(())
    }

    async fn fetch_since(&self, cursor: i64) -> SyncResult<Vec<RemoteTransaction>> {
        let request = self
            .authorize(self.client.get(self.config.endpoint(NEW_TRANSACTIONS_PATH)))?
            .query(&[("updatedTime", cursor)]);
        let response = check_status(request.send().await?).await?;
        let payload = response.json::<Vec<TransactionResponse>>().await?;
        payload.into_iter().map(RemoteTransaction::try_from).collect()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransactionRequest {
    title: String,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    category: String,
    transaction_type: TransactionKind,
    transaction_date: String,
    description: String,
    created_on: i64,
    updated_on: i64,
}

impl From<&Transaction> for TransactionRequest {
    fn from(record: &Transaction) -> Self {
        Self {
            title: record.title.clone(),
            amount: record.amount,
            category: record.category.clone(),
            transaction_type: record.kind,
            transaction_date: utc_date(record.created_at),
            description: record.notes.clone(),
            created_on: record.created_at,
            updated_on: record.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionResponse {
    id: Option<i64>,
    title: String,
    amount: Decimal,
    #[serde(default)]
    category: String,
    #[serde(default)]
    transaction_type: TransactionKind,
    #[serde(default)]
    description: Option<String>,
    created_on: i64,
    updated_on: i64,
}

impl TryFrom<TransactionResponse> for RemoteTransaction {
    type Error = SyncError;

    fn try_from(value: TransactionResponse) -> SyncResult<Self> {
        let remote_id = value.id.filter(|id| *id != 0).ok_or_else(|| {
            SyncError::InvalidPayload(format!(
                "transaction created at {} has no remote id",
                value.created_on
            ))
        })?;

        Ok(Self {
            remote_id,
            title: value.title,
            amount: value.amount,
            kind: value.transaction_type,
            category: value.category,
            notes: value.description.unwrap_or_default(),
            created_at: value.created_on,
            updated_at: value.updated_on,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

async fn check_status(response: Response) -> SyncResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(classify_failure(status, &body))
}

fn classify_failure(status: StatusCode, body: &str) -> SyncError {
    let message = parse_api_error(status, body);
    match status {
        StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => SyncError::Conflict(message),
        _ => SyncError::Server {
            status: status.as_u16(),
            message,
        },
    }
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return error_excerpt(&message);
        }
    }

    let trimmed = error_excerpt(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        trimmed
    }
}
