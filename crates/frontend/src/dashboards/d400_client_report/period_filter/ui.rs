use chrono::{Datelike, Utc};
use leptos::ev;
use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::KeyboardEvent;

use super::state::{year_options, BranchOptions, FilterTarget, PeriodFilter};

const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Which dropdown is expanded; at most one at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dropdown {
    Months,
    Branches,
}

/// Модальное окно фильтра периода.
///
/// Mounted once per page and shown through `open`. Branch loading is started
/// by whoever opens it; this component only renders `filter`.
#[component]
pub fn PeriodFilterModal(
    filter: RwSignal<PeriodFilter>,
    open: RwSignal<bool>,
    client_id: String,
    /// Called with the accepted filter after the modal has closed
    on_applied: Callback<FilterTarget>,
) -> impl IntoView {
    let (dropdown, set_dropdown) = signal(None::<Dropdown>);
    let current_year = Utc::now().year();
    let selected_year = Memo::new(move |_| filter.with(|f| f.year));

    let close = move || {
        open.set(false);
        set_dropdown.set(None);
    };

    let toggle_dropdown = move |which: Dropdown| {
        set_dropdown.update(|current| {
            *current = if *current == Some(which) { None } else { Some(which) };
        });
    };

    // Escape закрывает окно
    Effect::new(move |_| {
        let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
            if let Some(keyboard_event) = event.dyn_ref::<KeyboardEvent>() {
                if keyboard_event.key() == "Escape" && open.get_untracked() {
                    close();
                }
            }
        }) as Box<dyn FnMut(_)>);

        let _ = window().add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    });

    let apply = move |_| {
        match filter.with_untracked(|f| f.apply(&client_id)) {
            Ok(target) => {
                close();
                on_applied.run(target);
            }
            Err(e) => {
                let _ = window().alert_with_message(&e.to_string());
            }
        }
    };

    // Клик внутри окна, но вне dropdown, сворачивает оба списка
    let modal_click = move |ev: ev::MouseEvent| {
        ev.stop_propagation();
        set_dropdown.set(None);
    };

    view! {
        <div
            id="periodFilterModal"
            class="modal-overlay filter-modal-overlay"
            class:active=move || open.get()
            on:click=move |_| close()
        >
            <div class="modal filter-modal" on:click=modal_click>
                <div class="modal-header">
                    <h2 class="modal-title">"Filtrar Período"</h2>
                    <button class="button button--icon modal__close" on:click=move |_| close()>
                        "×"
                    </button>
                </div>

                <div class="modal-body">
                    <div class="filter-group">
                        <label for="filterYear">"Ano"</label>
                        <select
                            id="filterYear"
                            prop:value=move || selected_year.get().to_string()
                            on:change=move |ev| {
                                if let Ok(year) = event_target_value(&ev).parse::<i32>() {
                                    filter.update(|f| f.year = year);
                                }
                            }
                        >
                            // год из адреса может быть вне стандартного диапазона
                            {move || {
                                year_options(current_year, selected_year.get())
                                    .into_iter()
                                    .map(|year| {
                                        view! {
                                            <option
                                                value=year.to_string()
                                                prop:selected=move || selected_year.get() == year
                                            >
                                                {year}
                                            </option>
                                        }
                                    })
                                    .collect_view()
                            }}
                        </select>
                    </div>

                    <div class="filter-group">
                        <label>"Meses"</label>
                        <div id="monthsDropdown" class="dropdown" on:click=|ev| ev.stop_propagation()>
                            <button
                                class="dropdown-toggle"
                                class:active=move || dropdown.get() == Some(Dropdown::Months)
                                on:click=move |_| toggle_dropdown(Dropdown::Months)
                            >
                                <span id="monthsLabel">{move || filter.with(|f| f.months_label())}</span>
                            </button>
                            <div
                                id="monthsMenu"
                                class="dropdown-menu"
                                class:active=move || dropdown.get() == Some(Dropdown::Months)
                            >
                                <div class="dropdown-actions">
                                    <button on:click=move |_| filter.update(|f| f.select_all_months())>
                                        "Selecionar todos"
                                    </button>
                                    <button on:click=move |_| filter.update(|f| f.clear_all_months())>
                                        "Limpar"
                                    </button>
                                </div>
                                {(1..=12u32)
                                    .map(|month| {
                                        let id = format!("month{}", month);
                                        view! {
                                            <div
                                                class="dropdown-item"
                                                on:click=move |_| filter.update(|f| f.toggle_month(month))
                                            >
                                                <input
                                                    type="checkbox"
                                                    id=id.clone()
                                                    value=month.to_string()
                                                    prop:checked=move || filter.with(|f| f.is_month_selected(month))
                                                    on:click=move |ev| {
                                                        ev.stop_propagation();
                                                        filter.update(|f| f.toggle_month(month));
                                                    }
                                                />
                                                <label for=id on:click=|ev| ev.stop_propagation()>
                                                    {MONTH_NAMES[(month - 1) as usize]}
                                                </label>
                                            </div>
                                        }
                                    })
                                    .collect_view()}
                            </div>
                        </div>
                    </div>

                    <div class="filter-group">
                        <label>"Filiais"</label>
                        <div id="branchesDropdown" class="dropdown" on:click=|ev| ev.stop_propagation()>
                            <button
                                class="dropdown-toggle"
                                class:active=move || dropdown.get() == Some(Dropdown::Branches)
                                on:click=move |_| toggle_dropdown(Dropdown::Branches)
                            >
                                <span id="branchesLabel">{move || filter.with(|f| f.branches_label())}</span>
                            </button>
                            <div
                                id="branchesMenu"
                                class="dropdown-menu"
                                class:active=move || dropdown.get() == Some(Dropdown::Branches)
                            >
                                <div class="dropdown-actions">
                                    <button
                                        disabled=move || !filter.with(|f| f.branch_selection_enabled())
                                        on:click=move |_| filter.update(|f| f.select_all_branches())
                                    >
                                        "Selecionar todas"
                                    </button>
                                    <button
                                        disabled=move || !filter.with(|f| f.branch_selection_enabled())
                                        on:click=move |_| filter.update(|f| f.clear_all_branches())
                                    >
                                        "Limpar"
                                    </button>
                                </div>
                                <div id="branchesMenuItems">
                                    {move || branch_items(filter)}
                                </div>
                            </div>
                        </div>
                    </div>
                </div>

                <div class="modal-footer">
                    <button class="button button--secondary" on:click=move |_| close()>
                        "Cancelar"
                    </button>
                    <button class="button button--primary" on:click=apply>
                        "Aplicar filtro"
                    </button>
                </div>
            </div>
        </div>
    }
}

fn branch_items(filter: RwSignal<PeriodFilter>) -> AnyView {
    match filter.with(|f| f.branches().clone()) {
        BranchOptions::Idle | BranchOptions::Loading => {
            view! { <div class="dropdown-status">"Carregando..."</div> }.into_any()
        }
        BranchOptions::Empty => {
            view! { <div class="dropdown-status">"Nenhuma filial encontrada"</div> }.into_any()
        }
        BranchOptions::Failed(_) => view! {
            <div class="dropdown-status dropdown-status--error">"Erro ao carregar filiais"</div>
        }
        .into_any(),
        BranchOptions::Ready(options) => options
            .into_iter()
            .map(|option| {
                let id = format!("branch{}", option.branch.code);
                let label = option.branch.display_label();
                let code = StoredValue::new(option.branch.code);
                view! {
                    <div
                        class="dropdown-item"
                        on:click=move |_| filter.update(|f| f.toggle_branch(&code.get_value()))
                    >
                        <input
                            type="checkbox"
                            id=id.clone()
                            value=code.get_value()
                            prop:checked=option.checked
                            on:click=move |ev| {
                                ev.stop_propagation();
                                filter.update(|f| f.toggle_branch(&code.get_value()));
                            }
                        />
                        <label for=id on:click=|ev| ev.stop_propagation()>
                            {label}
                        </label>
                    </div>
                }
            })
            .collect_view()
            .into_any(),
    }
}
