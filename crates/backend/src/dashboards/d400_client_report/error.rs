use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use contracts::dashboards::d400_client_report::PeriodQueryError;
use thiserror::Error;

/// Ошибки формирования отчёта
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Cliente {0} não encontrado")]
    UnknownClient(String),

    #[error("Filtro inválido: {0}")]
    InvalidQuery(#[from] PeriodQueryError),

    #[error("{0}")]
    BadRequest(String),

    #[error("Falha ao gerar PDF: {0}")]
    Pdf(String),

    #[error("Falha ao gerar arquivo ZIP: {0}")]
    Archive(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ReportError {
    pub fn status(&self) -> StatusCode {
        match self {
            ReportError::UnknownClient(_) => StatusCode::NOT_FOUND,
            ReportError::InvalidQuery(_) | ReportError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ReportError::Pdf(_) | ReportError::Archive(_) | ReportError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("D400 Report: {:#}", self);
        } else {
            tracing::warn!("D400 Report: {}", self);
        }
        (status, self.to_string()).into_response()
    }
}
