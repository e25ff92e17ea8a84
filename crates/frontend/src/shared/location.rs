//! Доступ к адресу текущей страницы
//!
//! The report page is `/report/view/{clientId}?…`: the client id is the last
//! path segment and the period filter travels in the query string.

use contracts::dashboards::d400_client_report::ReportParams;
use leptos::prelude::window;

/// Last non-empty segment of a path, `/report/view/1001` -> `1001`
pub fn client_id_from_path(path: &str) -> Option<String> {
    path.split('/')
        .rev()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parses `?year=…&months=…&branches=…&periodo=…`; unknown or broken
/// parameters are ignored.
pub fn report_params_from_search(search: &str) -> ReportParams {
    let query = search.trim_start_matches('?');
    if query.is_empty() {
        return ReportParams::default();
    }
    serde_qs::from_str(query).unwrap_or_else(|e| {
        log::warn!("Cannot parse report query '{}': {}", query, e);
        ReportParams::default()
    })
}

pub fn current_path() -> String {
    window().location().pathname().unwrap_or_default()
}

pub fn current_search() -> String {
    window().location().search().unwrap_or_default()
}

pub fn current_origin() -> String {
    window().location().origin().unwrap_or_default()
}

pub fn current_client_id() -> Option<String> {
    client_id_from_path(&current_path())
}

pub fn current_report_params() -> ReportParams {
    report_params_from_search(&current_search())
}

/// Full page navigation
pub fn navigate(url: &str) {
    if let Err(e) = window().location().set_href(url) {
        log::error!("Navigation to {} failed: {:?}", url, e);
    }
}
