use crate::dashboards::d400_client_report::ui::ReportPage;
use leptos::prelude::*;

/// Корневой компонент. Backend отдаёт этот bundle только на
/// `/report/view/{clientId}`, поэтому роутер не нужен.
#[component]
pub fn App() -> impl IntoView {
    view! {
        <ReportPage />
    }
}
