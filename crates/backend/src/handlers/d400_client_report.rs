use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use contracts::dashboards::d400_client_report::{Branch, ReportContext, ReportParams};
use serde::Deserialize;

use crate::dashboards::d400_client_report::archive::{build_zip, parse_batch_ids, pdf_file_name};
use crate::dashboards::d400_client_report::{pdf, service, ReportError};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct BatchParams {
    pub ids: Option<String>,
}

/// GET /api/clients
pub async fn list_clients(State(state): State<AppState>) -> Result<Json<Vec<String>>, ReportError> {
    let clients = state.provider.list_clients().await?;
    tracing::info!("D400 Report: Returning {} clients", clients.len());
    Ok(Json(clients))
}

/// GET /api/branches/:client_id
///
/// Unknown clients get an empty list, not 404.
pub async fn get_branches(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<Json<Vec<Branch>>, ReportError> {
    let branches = state.provider.list_branches(&client_id).await?;
    tracing::info!(
        "D400 Report: Returning {} branches for client {}",
        branches.len(),
        client_id
    );
    Ok(Json(branches))
}

/// GET /api/report/:client_id?year=2024&months=1,2&branches=01
pub async fn get_report(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Query(params): Query<ReportParams>,
) -> Result<Json<ReportContext>, ReportError> {
    tracing::info!("D400 Report: Building report for client {}", client_id);
    let context = service::build_context(state.provider.as_ref(), &client_id, &params).await?;
    tracing::info!(
        "D400 Report: Report for client {} covers {}",
        client_id,
        context.period
    );
    Ok(Json(context))
}

/// GET /report/pdf/:client_id
pub async fn download_pdf(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Query(params): Query<ReportParams>,
) -> Result<impl IntoResponse, ReportError> {
    tracing::info!("D400 Report: Rendering PDF for client {}", client_id);
    let context = service::build_context(state.provider.as_ref(), &client_id, &params).await?;
    let bytes = render_pdf_blocking(context).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", pdf_file_name(&client_id)),
            ),
        ],
        bytes,
    ))
}

/// GET /report/pdf-batch?ids=1001,1002
///
/// Every report in the batch uses the default (current) period.
pub async fn download_batch(
    State(state): State<AppState>,
    Query(batch): Query<BatchParams>,
) -> Result<impl IntoResponse, ReportError> {
    let ids = parse_batch_ids(batch.ids.as_deref())?;
    tracing::info!("D400 Report: Rendering batch of {} PDFs", ids.len());

    let params = ReportParams::default();
    let mut files = Vec::with_capacity(ids.len());
    for id in ids {
        let context = service::build_context(state.provider.as_ref(), &id, &params).await?;
        let bytes = render_pdf_blocking(context).await?;
        files.push((pdf_file_name(&id), bytes));
    }

    let archive = tokio::task::spawn_blocking(move || build_zip(files))
        .await
        .map_err(|e| ReportError::Internal(e.into()))??;
    tracing::info!("D400 Report: Batch archive is {} bytes", archive.len());

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=relatorios.zip".to_string(),
            ),
        ],
        archive,
    ))
}

// printpdf держит документ в Rc, поэтому рендер целиком уходит в blocking-поток
async fn render_pdf_blocking(context: ReportContext) -> Result<Vec<u8>, ReportError> {
    tokio::task::spawn_blocking(move || pdf::render_pdf(&context))
        .await
        .map_err(|e| ReportError::Internal(e.into()))?
}
