use axum::extract::{Path, RawQuery, State};
use axum::response::{Html, Redirect};

use crate::dashboards::d400_client_report::ReportError;
use crate::state::AppState;

const COLOR_PRIMARY: &str = "#2d5a3d";

/// GET /
pub async fn home(State(state): State<AppState>) -> Result<Html<String>, ReportError> {
    let clients = state.provider.list_clients().await?;
    Ok(Html(render_home(&clients)))
}

fn render_home(clients: &[String]) -> String {
    let links: String = clients
        .iter()
        .map(|id| {
            format!(
                "<li><a href='/report/view/{id}'>Cliente {id} (Visualizar)</a> | \
                 <a href='/report/pdf/{id}'>PDF</a></li>"
            )
        })
        .collect();

    format!(
        "<h1 style='font-family: sans-serif; color: {COLOR_PRIMARY};'>Sistema de Relatórios RPS</h1>\
         <ul>{links}</ul>\
         <p><a href='/report/pdf-batch?ids={}'>Baixar ZIP em lote</a></p>",
        clients.join(",")
    )
}

/// GET /report/view/:client_id
///
/// Serves the SPA shell; the page itself reads the client id and the
/// filter from the URL and loads everything through `/api`.
pub async fn report_view(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<Html<String>, ReportError> {
    let clients = state.provider.list_clients().await?;
    if !clients.contains(&client_id) {
        return Err(ReportError::UnknownClient(client_id));
    }

    let index = state.static_dir.join("index.html");
    let html = tokio::fs::read_to_string(&index).await.map_err(|e| {
        ReportError::Internal(anyhow::anyhow!("cannot read {}: {}", index.display(), e))
    })?;
    tracing::info!("D400 Report: Serving report page for client {}", client_id);
    Ok(Html(html))
}

/// GET /relatorio/:client_id
pub async fn legacy_view(Path(client_id): Path<String>, RawQuery(query): RawQuery) -> Redirect {
    Redirect::to(&with_query(format!("/report/view/{}", client_id), query))
}

/// GET /pdf/:client_id
pub async fn legacy_pdf(Path(client_id): Path<String>, RawQuery(query): RawQuery) -> Redirect {
    Redirect::to(&with_query(format!("/report/pdf/{}", client_id), query))
}

fn with_query(path: String, query: Option<String>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!("{}?{}", path, q),
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_lists_clients_and_batch_link() {
        let html = render_home(&["1001".to_string(), "1002".to_string()]);
        assert!(html.contains("<a href='/report/view/1001'>Cliente 1001 (Visualizar)</a>"));
        assert!(html.contains("<a href='/report/pdf/1002'>PDF</a>"));
        assert!(html.contains("/report/pdf-batch?ids=1001,1002"));
    }

    #[test]
    fn test_with_query() {
        assert_eq!(with_query("/a".into(), None), "/a");
        assert_eq!(with_query("/a".into(), Some(String::new())), "/a");
        assert_eq!(with_query("/a".into(), Some("periodo=x".into())), "/a?periodo=x");
    }
}
