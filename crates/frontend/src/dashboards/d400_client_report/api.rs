use contracts::dashboards::d400_client_report::{Branch, ReportContext, ReportParams};
use gloo_net::http::Request;
use thiserror::Error;

const API_BASE: &str = "/api";

/// Ошибка обращения к backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Request(String),
    #[error("HTTP error: {0}")]
    Status(u16),
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

/// Филиалы клиента: `[{codigo, fantasia}]`
pub async fn get_branches(client_id: &str) -> Result<Vec<Branch>, ApiError> {
    let url = format!("{}/branches/{}", API_BASE, urlencoding::encode(client_id));
    fetch_json(&url).await
}

/// Данные отчёта для текущего фильтра
pub async fn get_report(client_id: &str, params: &ReportParams) -> Result<ReportContext, ApiError> {
    let query = serde_qs::to_string(params).map_err(|e| ApiError::Request(e.to_string()))?;
    let mut url = format!("{}/report/{}", API_BASE, urlencoding::encode(client_id));
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query);
    }
    fetch_json(&url).await
}

async fn fetch_json<T: serde::de::DeserializeOwned>(url: &str) -> Result<T, ApiError> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(|e| ApiError::Request(e.to_string()))?;

    if !response.ok() {
        return Err(ApiError::Status(response.status()));
    }

    response
        .json()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}
