use chrono::{Datelike, Utc};
use contracts::dashboards::d400_client_report::{ReportContext, RoeRow};
use gloo_timers::callback::Timeout;
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{EventTarget, KeyboardEvent};

use crate::dashboards::d400_client_report::fullscreen::{self, FullscreenControls};
use crate::dashboards::d400_client_report::period_filter::{FilterTarget, PeriodFilter, PeriodFilterModal};
use crate::dashboards::d400_client_report::slides::{self, SlideNavigator, PAGE_IDS};
use crate::dashboards::d400_client_report::{api, charts, qr};
use crate::shared::location;

/// Страница отчёта клиента: слайды, навигация, фильтр, полноэкранный режим
#[component]
pub fn ReportPage() -> impl IntoView {
    let Some(client_id) = location::current_client_id() else {
        return view! { <div class="report-error">"Cliente não informado"</div> }.into_any();
    };
    let params = location::current_report_params();
    let current_year = Utc::now().year();

    // Data state
    let (report, set_report) = signal(None::<ReportContext>);
    let (loading, set_loading) = signal(true);
    let (error, set_error) = signal(None::<String>);

    // UI state
    let filter = RwSignal::new(PeriodFilter::new(current_year));
    let filter_open = RwSignal::new(false);
    let navigator = RwSignal::new(SlideNavigator::default());
    let presentation = RwSignal::new(FullscreenControls::default());
    let hide_timer = StoredValue::new_local(None::<Timeout>);
    let pages_observed = StoredValue::new(false);
    let pdf_href = RwSignal::new(format!(
        "/report/pdf/{}{}",
        urlencoding::encode(&client_id),
        location::current_search()
    ));

    let main_ref = NodeRef::<html::Main>::new();
    let qr_ref = NodeRef::<html::Canvas>::new();

    // Load report once
    {
        let client_id = client_id.clone();
        let params = params.clone();
        Effect::new(move |_| {
            let client_id = client_id.clone();
            let params = params.clone();
            spawn_local(async move {
                match api::get_report(&client_id, &params).await {
                    Ok(ctx) => {
                        log::info!("Report for client {} loaded: {}", client_id, ctx.period);
                        if let Some(query) = &ctx.filter {
                            filter.update(|f| f.seed_from_query(query));
                        }
                        set_report.set(Some(ctx));
                    }
                    Err(e) => {
                        log::error!("Failed to load report for client {}: {}", client_id, e);
                        set_error.set(Some(e.to_string()));
                    }
                }
                set_loading.set(false);
            });
        });
    }

    // Charts, QR code and scroll spy need the slides in the DOM
    {
        let qr_url = qr::pdf_qr_url(
            &location::current_origin(),
            &client_id,
            params.periodo.as_deref().unwrap_or_default(),
        );
        Effect::new(move |_| {
            let Some(ctx) = report.get() else {
                return;
            };
            let qr_url = qr_url.clone();
            request_animation_frame(move || {
                let year = ctx.filter.as_ref().map(|f| f.year).unwrap_or(current_year);
                let drawn = charts::render_charts(&ctx.charts, year);
                log::debug!("{} charts rendered", drawn);

                if let Some(canvas) = qr_ref.get_untracked() {
                    qr::render_qr(&canvas, &qr_url);
                }

                if !pages_observed.get_value() {
                    observe_slides(main_ref, navigator);
                    pages_observed.set_value(true);
                }
            });
        });
    }

    let arm_hide_timer = move |ticket: u64| {
        let timeout = Timeout::new(fullscreen::HIDE_CONTROLS_DELAY_MS, move || {
            presentation.update(|f| {
                f.timer_elapsed(ticket);
            });
        });
        // предыдущий таймер отменяется при drop
        hide_timer.set_value(Some(timeout));
    };

    let leave_fullscreen = move || {
        presentation.update(|f| f.exit());
        hide_timer.set_value(None);
    };

    let toggle_fullscreen = move |_| {
        if presentation.with_untracked(|f| f.is_active()) {
            fullscreen::exit_browser_fullscreen();
            leave_fullscreen();
        } else {
            fullscreen::request_browser_fullscreen();
            if let Some(ticket) = presentation.try_update(|f| f.enter()) {
                arm_hide_timer(ticket);
            }
        }
    };

    // Page-level listeners, registered once
    Effect::new(move |_| {
        let document = document();

        listen(&window(), "keydown", move |event| {
            if filter_open.get_untracked() {
                return;
            }
            let Some(key_event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if let Some(key) = slides::slide_key(&key_event.key()) {
                event.prevent_default();
                if let Some(target) = navigator.try_update(|n| n.step(key)).flatten() {
                    slides::scroll_to(target);
                }
            }
        });

        for name in ["mousemove", "click"] {
            listen(&document, name, move |_| {
                if !presentation.with_untracked(|f| f.is_active()) {
                    return;
                }
                if let Some(Some(ticket)) = presentation.try_update(|f| f.activity()) {
                    arm_hide_timer(ticket);
                }
            });
        }

        listen(&document, "fullscreenchange", move |_| {
            if !fullscreen::browser_is_fullscreen() && presentation.with_untracked(|f| f.is_active()) {
                leave_fullscreen();
            }
        });
    });

    Effect::new(move |_| {
        fullscreen::apply_body_classes(&presentation.get());
    });

    let open_filters = {
        let client_id = client_id.clone();
        move |_| {
            filter_open.set(true);
            let generation = filter.try_update(|f| f.begin_branch_load()).unwrap_or_default();
            let client_id = client_id.clone();
            spawn_local(async move {
                let result = api::get_branches(&client_id).await;
                if let Err(e) = &result {
                    log::error!("Erro ao carregar filiais: {}", e);
                }
                filter.update(|f| {
                    if !f.finish_branch_load(generation, result) {
                        log::debug!("Stale branch response {} dropped", generation);
                    }
                });
            });
        }
    };

    let on_applied = Callback::new(move |target: FilterTarget| {
        pdf_href.set(target.pdf_url.clone());
        location::navigate(&target.view_url);
    });

    view! {
        <div class="report-viewer">
            <nav class="nav-dots">
                {PAGE_IDS
                    .into_iter()
                    .map(|id| {
                        view! {
                            <div
                                id=slides::nav_dot_id(id)
                                class="nav-dot-container"
                                class:active=move || navigator.with(|n| n.current_id() == id)
                                on:click=move |_| slides::scroll_to(id)
                            >
                                <span class="nav-dot"></span>
                                <span class="nav-label">{page_title(id)}</span>
                            </div>
                        }
                    })
                    .collect_view()}
            </nav>

            <main id="mainScroll" class="main-scroll" node_ref=main_ref>
                {move || {
                    if loading.get() {
                        view! {
                            <div class="report-loading">
                                <span>"Carregando relatório..."</span>
                            </div>
                        }.into_any()
                    } else if let Some(err) = error.get() {
                        view! {
                            <div class="report-error">
                                <strong>"⚠ Erro: "</strong>
                                {err}
                            </div>
                        }.into_any()
                    } else {
                        report.get().map(|ctx| report_slides(ctx, qr_ref)).into_any()
                    }
                }}
            </main>

            <div class="fab-group">
                <button class="fab" title="Filtrar período" on:click=open_filters>
                    "Filtros"
                </button>
                <a id="fabDownload" class="fab" title="Baixar PDF" href=move || pdf_href.get()>
                    "PDF"
                </a>
                <button class="fab" title="Tela cheia" on:click=toggle_fullscreen>
                    {move || if presentation.with(|f| f.is_active()) { "Sair" } else { "Tela cheia" }}
                </button>
            </div>

            <PeriodFilterModal
                filter=filter
                open=filter_open
                client_id=client_id
                on_applied=on_applied
            />
        </div>
    }
    .into_any()
}

/// Addresses every slide once and feeds the navigator from the observer
fn observe_slides(main_ref: NodeRef<html::Main>, navigator: RwSignal<SlideNavigator>) {
    let Some(root) = main_ref.get_untracked() else {
        return;
    };
    let document = document();
    let pages: Vec<web_sys::Element> = PAGE_IDS
        .iter()
        .filter_map(|id| document.get_element_by_id(id))
        .collect();

    let result = slides::observe_pages(&root, &pages, move |id| {
        navigator.update(|n| {
            n.set_visible(&id);
        });
    });
    if let Err(e) = result {
        log::error!("Scroll spy unavailable: {:?}", e);
    }
}

fn listen(target: &EventTarget, event: &str, handler: impl FnMut(web_sys::Event) + 'static) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
    let _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    closure.forget();
}

fn page_title(id: &str) -> &'static str {
    match id {
        "capa" => "Capa",
        "resumo" => "Resumo",
        "ativos" => "Ativos",
        "passivos" => "Passivos",
        "custos" => "Custos",
        "rentabilidade" => "Rentabilidade",
        "vendas" => "Vendas",
        "tributario" => "Tributário",
        "distribuicao" => "Distribuição",
        "conclusao" => "Conclusão",
        "agradecimentos" => "Agradecimentos",
        _ => "",
    }
}

fn kpi(label: &'static str, value: String) -> impl IntoView {
    view! {
        <div class="kpi-card">
            <span class="kpi-label">{label}</span>
            <span class="kpi-value">{value}</span>
        </div>
    }
}

fn chart(id: &'static str, title: &'static str) -> impl IntoView {
    view! {
        <div class="chart-card">
            <h3>{title}</h3>
            <div id=id class="chart-container"></div>
        </div>
    }
}

fn roe_row(row: RoeRow) -> impl IntoView {
    let delta_class = if row.delta >= 0.0 { "positive" } else { "negative" };
    view! {
        <tr>
            <td>{row.periodo}</td>
            <td>{format!("{:.1}", row.roe)}</td>
            <td>{format!("{:.1}", row.cdi)}</td>
            <td class=delta_class>{format!("{:+.1}", row.delta)}</td>
        </tr>
    }
}

fn report_slides(ctx: ReportContext, qr_ref: NodeRef<html::Canvas>) -> impl IntoView {
    let k = ctx.kpis.clone();
    let i = ctx.indicators.clone();
    let branches = ctx
        .filter
        .as_ref()
        .map(|f| f.branches.join(", "))
        .unwrap_or_else(|| "Todas".to_string());
    let conclusion = if ctx.kpis.lucro_liquido_raw >= 0.0 {
        format!(
            "O período encerrou com lucro líquido de {} e margem líquida de {}.",
            k.lucro_liquido, i.margem_liquida
        )
    } else {
        format!(
            "O período encerrou com prejuízo de {}. Recomenda-se revisar a estrutura de custos.",
            k.lucro_liquido
        )
    };

    view! {
        <section id="capa" class="page-container page-cover">
            <h1>"Relatório Financeiro"</h1>
            <h2>{ctx.client_name.clone()}</h2>
            <p class="cover-period">{format!("Período: {}", ctx.period)}</p>
            <p class="cover-branches">{format!("Filiais: {}", branches)}</p>
            <div class="qr-block">
                <canvas id="qrCodeContainer" node_ref=qr_ref></canvas>
                <span>"Escaneie para baixar o PDF"</span>
            </div>
        </section>

        <section id="resumo" class="page-container">
            <h2>"Resumo"</h2>
            <div class="kpi-grid">
                {kpi("Vendas líquidas", k.vendas_liquidas.clone())}
                {kpi("Carga tributária", k.carga_tributaria.clone())}
                {kpi("Compras", k.compras.clone())}
                {kpi("CAPEX", k.capex.clone())}
                {kpi("OPEX", k.opex.clone())}
                {kpi("FINEX", k.finex.clone())}
                {kpi("Outros", k.outros.clone())}
                {kpi("Lucro líquido", k.lucro_liquido.clone())}
            </div>
        </section>

        <section id="ativos" class="page-container">
            <h2>"Ativos"</h2>
            <div class="chart-grid">
                {chart("chart-ativos-evolucao", "Evolução dos ativos")}
                {chart("chart-ativos-composicao", "Composição")}
            </div>
        </section>

        <section id="passivos" class="page-container">
            <h2>"Passivos"</h2>
            {chart("chart-passivos", "Circulante x Não circulante")}
            <div class="kpi-grid">
                {kpi("Liquidez corrente", i.liquidez_corrente.clone())}
                {kpi("Endividamento", i.endividamento.clone())}
            </div>
        </section>

        <section id="custos" class="page-container">
            <h2>"Custos"</h2>
            <div class="chart-grid">
                {chart("chart-custos", "Estrutura de custos")}
                {chart("chart-fornecedores", "Fornecedores")}
            </div>
        </section>

        <section id="rentabilidade" class="page-container">
            <h2>"Rentabilidade"</h2>
            <div class="chart-grid">
                {chart("chart-rentabilidade", "RPS x CDI")}
                {chart("chart-equity", "Patrimônio x Ativos")}
            </div>
            <table class="roe-table">
                <thead>
                    <tr>
                        <th>"Período"</th>
                        <th>"ROE (%)"</th>
                        <th>"CDI (%)"</th>
                        <th>"Delta (p.p.)"</th>
                    </tr>
                </thead>
                <tbody>{ctx.roe_table.clone().into_iter().map(roe_row).collect_view()}</tbody>
            </table>
        </section>

        <section id="vendas" class="page-container">
            <h2>"Vendas"</h2>
            {chart("chart-vendas-yoy", "Vendas mensais (R$ mil)")}
            <div class="chart-grid">
                {chart("chart-top-fat", "Top produtos por faturamento")}
                {chart("chart-top-qtd", "Top produtos por quantidade")}
            </div>
        </section>

        <section id="tributario" class="page-container">
            <h2>"Tributário"</h2>
            <div class="kpi-grid">
                {kpi("Carga tributária", k.carga_tributaria.clone())}
                {kpi("EBITDA", i.ebitda.clone())}
                {kpi("NCG", i.ncg.clone())}
            </div>
        </section>

        <section id="distribuicao" class="page-container">
            <h2>"Distribuição"</h2>
            <div class="kpi-grid">
                {kpi("Lucro líquido", k.lucro_liquido.clone())}
                {kpi("Margem líquida", i.margem_liquida.clone())}
                {kpi("ROA", i.roa.clone())}
            </div>
        </section>

        <section id="conclusao" class="page-container">
            <h2>"Conclusão"</h2>
            <p class="conclusion">{conclusion}</p>
        </section>

        <section id="agradecimentos" class="page-container page-cover">
            <h2>"Obrigado!"</h2>
            <p>{format!("Relatório preparado para {}", ctx.client_name)}</p>
        </section>
    }
}
