use super::api;
use crate::shared::icons::icon;
use crate::shared::page_frame::PageFrame;
use crate::shared::page_standard::PAGE_CAT_USECASE;
use contracts::usecases::u501_import_products::{
    file_rules::ACCEPT_ATTRIBUTE, Completion, FieldUpdate, ImportProductsUseCase, ImportSession,
    PreviewProduct, ProductField, SelectedFile,
};
use contracts::usecases::common::UseCaseMetadata;
use leptos::prelude::*;
use leptos::task::spawn_local;
use thaw::*;
use wasm_bindgen::JsCast;

#[component]
pub fn ImportProductsPage() -> impl IntoView {
    let session = RwSignal::new(ImportSession::new());
    // The browser File behind the accepted SelectedFile
    let file_handle = StoredValue::new_local(None::<web_sys::File>);
    let file_input = NodeRef::<leptos::html::Input>::new();
    let (edit_error, set_edit_error) = signal(None::<String>);

    // Categories for resolving detected names to ids
    Effect::new(move || {
        spawn_local(async move {
            match api::fetch_categories().await {
                Ok(categories) => {
                    log::debug!("Loaded {} categories", categories.len());
                    session.update(|s| s.set_categories(categories));
                }
                Err(e) => log::warn!("Categories unavailable: {}", e),
            }
        });
    });

    // Rejection, reset and a successful import drop the file; the input goes with it
    Effect::new(move || {
        if session.with(|s| s.selected_file().is_none()) {
            file_handle.set_value(None);
            if let Some(input) = file_input.get() {
                input.set_value("");
            }
        }
    });

    let on_file_change = move |ev: web_sys::Event| {
        let file = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
            .and_then(|i| i.files())
            .and_then(|files| files.get(0));

        let selected = file.as_ref().map(|f| {
            let selected = SelectedFile::new(f.name(), f.size() as u64);
            let mime_type = f.type_();
            if mime_type.is_empty() {
                selected
            } else {
                selected.with_mime_type(mime_type)
            }
        });

        let mut accepted = false;
        session.update(|s| accepted = matches!(s.select_file(selected), Ok(Some(_))));
        if accepted {
            file_handle.set_value(file);
        }
    };

    let on_load_preview = move |_| {
        let Some(file) = file_handle.get_value() else {
            return;
        };
        let Some(ticket) = session.try_update(|s| s.begin_preview()).flatten() else {
            return;
        };
        set_edit_error.set(None);

        spawn_local(async move {
            let outcome = api::load_preview(file).await;
            if let Err(e) = &outcome {
                log::warn!("Preview failed: {}", e);
            }
            let completion = session
                .try_update(|s| s.finish_preview(ticket, outcome))
                .unwrap_or(Completion::Stale);
            if completion == Completion::Stale {
                log::debug!("Preview answer dropped, a newer upload is pending");
            }
        });
    };

    let on_confirm = move |_| {
        let Some((ticket, request)) = session.try_update(|s| s.begin_confirm()).flatten() else {
            return;
        };

        spawn_local(async move {
            let outcome = api::confirm_import(&request).await;
            match &outcome {
                Ok(result) => log::info!("{}", result.message),
                Err(e) => log::warn!("Confirm failed: {}", e),
            }
            let completion = session
                .try_update(|s| s.finish_confirm(ticket, outcome))
                .unwrap_or(Completion::Stale);
            if completion == Completion::Stale {
                log::debug!("Confirm answer dropped, the session moved on");
            }
        });
    };

    let on_reset = move |_| {
        session.update(|s| s.reset());
        set_edit_error.set(None);
    };

    let preview_disabled = Signal::derive(move || {
        session.with(|s| s.selected_file().is_none() || s.is_loading_preview())
    });
    let confirm_disabled =
        Signal::derive(move || session.with(|s| s.grid().is_empty() || s.is_confirming()));

    view! {
        <PageFrame page_id="u501_import_products--usecase" category=PAGE_CAT_USECASE class="page--wide">
            <div class="page__header">
                <h2 class="section-title">
                    {icon("products")} " " {ImportProductsUseCase::display_name()}
                </h2>
                <Button appearance=ButtonAppearance::Secondary on_click=on_reset>
                    "Nueva importación"
                </Button>
            </div>

            <div class="page__content">
                <div class="card">
                    <div class="card__body">
                        <div class="form__group">
                            <label class="form__label" for="u501-file-input">
                                {icon("file")} " Archivo CSV o Excel (máx. 10 MB)"
                            </label>
                            <input
                                id="u501-file-input"
                                node_ref=file_input
                                class="form__input"
                                type="file"
                                accept=ACCEPT_ATTRIBUTE
                                on:change=on_file_change
                            />
                        </div>

                        {move || session.with(|s| {
                            s.selected_file().map(|f| {
                                let size_kb = f.size as f64 / 1024.0;
                                view! {
                                    <div class="info-box">
                                        {f.name.clone()} " · " {format!("{size_kb:.1} KB")}
                                    </div>
                                }
                            })
                        })}
                        {move || session.with(|s| {
                            s.file_error().map(|e| error_box(e.to_string()))
                        })}

                        <Button
                            appearance=ButtonAppearance::Primary
                            on_click=on_load_preview
                            disabled=preview_disabled
                        >
                            {icon("upload")}
                            {move || if session.with(|s| s.is_loading_preview()) {
                                " Cargando..."
                            } else {
                                " Cargar vista previa"
                            }}
                        </Button>

                        {move || session.with(|s| s.preview_error().map(|e| error_box(e.to_string())))}
                    </div>
                </div>

                <Show when=move || session.with(|s| !s.grid().is_empty())>
                    <StatsPanel session=session />

                    {move || edit_error.get().map(error_box)}

                    <div class="table-container">
                        <table class="table">
                            <thead>
                                <tr>
                                    <th>"#"</th>
                                    <th>"Nombre"</th>
                                    <th>"SKU"</th>
                                    <th>"Código de barras"</th>
                                    <th>"Precio"</th>
                                    <th>"Stock"</th>
                                    <th>"Stock mínimo"</th>
                                    <th>"Categoría"</th>
                                    <th>"Talles"</th>
                                </tr>
                            </thead>
                            <tbody>
                                {move || {
                                    let rows = session.with(|s| s.grid().rows().to_vec());
                                    rows.into_iter()
                                        .enumerate()
                                        .map(|(index, row)| preview_row(session, set_edit_error, index, row))
                                        .collect_view()
                                }}
                            </tbody>
                        </table>
                    </div>

                    <Button
                        appearance=ButtonAppearance::Primary
                        on_click=on_confirm
                        disabled=confirm_disabled
                    >
                        {icon("check")}
                        {move || if session.with(|s| s.is_confirming()) {
                            " Importando..."
                        } else {
                            " Confirmar importación"
                        }}
                    </Button>
                </Show>

                {move || session.with(|s| s.confirm_error().map(|e| error_box(e.to_string())))}
                <ResultPanel session=session />
            </div>
        </PageFrame>
    }
}

fn error_box(message: String) -> impl IntoView {
    view! {
        <div class="warning-box warning-box--error">
            <span class="warning-box__icon">"⚠"</span>
            <span class="warning-box__text">{message}</span>
        </div>
    }
}

#[component]
fn StatsPanel(session: RwSignal<ImportSession>) -> impl IntoView {
    let stats = Memo::new(move |_| session.with(|s| s.stats()));

    view! {
        <div class="stats-row">
            <div class="stat">
                <span class="stat__label">"Productos"</span>
                <span class="stat__value">{move || stats.get().total}</span>
            </div>
            <div class="stat">
                <span class="stat__label">"Con talles"</span>
                <span class="stat__value">{move || stats.get().with_sizes}</span>
            </div>
            <div class="stat">
                <span class="stat__label">"Con categoría detectada"</span>
                <span class="stat__value">{move || stats.get().with_detected_category}</span>
            </div>
            <div class="stat">
                <span class="stat__label">"Stock total"</span>
                <span class="stat__value">{move || stats.get().total_stock}</span>
            </div>
        </div>
    }
}

/// Text cell that writes back through the typed field parser
fn text_cell(
    session: RwSignal<ImportSession>,
    set_edit_error: WriteSignal<Option<String>>,
    index: usize,
    field: ProductField,
    value: String,
    input_type: &'static str,
) -> impl IntoView {
    view! {
        <td>
            <input
                class="form__input form__input--compact"
                type=input_type
                prop:value=value
                on:change=move |ev| {
                    let raw = event_target_value(&ev);
                    let mut outcome = Ok(());
                    session.update(|s| outcome = s.update_field_raw(index, field.as_str(), &raw));
                    match outcome {
                        Ok(()) => set_edit_error.set(None),
                        Err(e) => {
                            log::warn!("Row {} edit rejected: {}", index + 1, e);
                            set_edit_error.set(Some(e.to_string()));
                        }
                    }
                }
            />
        </td>
    }
}

fn preview_row(
    session: RwSignal<ImportSession>,
    set_edit_error: WriteSignal<Option<String>>,
    index: usize,
    row: PreviewProduct,
) -> impl IntoView {
    let categories = session.with_untracked(|s| s.categories().to_vec());
    let selected_category = row.category_id.map(|id| id.to_string()).unwrap_or_default();
    let detected = row.detected_category.clone().unwrap_or_default();
    let row_class = if row.id.is_some() {
        "table__row table__row--existing"
    } else {
        "table__row"
    };

    view! {
        <tr class=row_class>
            <td>{index + 1}</td>
            {text_cell(session, set_edit_error, index, ProductField::Name, row.name.clone(), "text")}
            {text_cell(session, set_edit_error, index, ProductField::Sku, row.sku.clone(), "text")}
            {text_cell(session, set_edit_error, index, ProductField::Barcode, row.barcode.clone().unwrap_or_default(), "text")}
            {text_cell(session, set_edit_error, index, ProductField::Price, row.price.to_string(), "text")}
            {text_cell(session, set_edit_error, index, ProductField::StockQuantity, row.stock_quantity.to_string(), "number")}
            {text_cell(session, set_edit_error, index, ProductField::MinStock, row.min_stock.to_string(), "number")}
            <td>
                <select
                    class="form__select"
                    title=detected
                    prop:value=selected_category
                    on:change=move |ev| {
                        let raw = event_target_value(&ev);
                        let mut outcome = Ok(());
                        session.update(|s| {
                            outcome = s.update_field_raw(index, ProductField::CategoryId.as_str(), &raw)
                        });
                        if let Err(e) = outcome {
                            set_edit_error.set(Some(e.to_string()));
                        }
                    }
                >
                    <option value="">"Sin categoría"</option>
                    {categories
                        .into_iter()
                        .map(|c| view! { <option value=c.id.to_string()>{c.name}</option> })
                        .collect_view()}
                </select>
            </td>
            <td>
                <input
                    class="form__checkbox"
                    type="checkbox"
                    prop:checked=row.has_sizes
                    on:change=move |ev| {
                        let checked = event_target_checked(&ev);
                        let mut outcome = Ok(());
                        session.update(|s| outcome = s.update_field(index, FieldUpdate::HasSizes(checked)));
                        if let Err(e) = outcome {
                            set_edit_error.set(Some(e.to_string()));
                        }
                    }
                />
            </td>
        </tr>
    }
}

#[component]
fn ResultPanel(session: RwSignal<ImportSession>) -> impl IntoView {
    let on_close = move |_| session.update(|s| s.clear_result());

    view! {
        {move || session.with(|s| s.result().cloned()).map(|result| {
            let class = if !result.is_success() {
                "result-box result-box--error"
            } else if result.is_partial() {
                "result-box result-box--warning"
            } else {
                "result-box result-box--success"
            };
            view! {
                <div class=class>
                    <div class="result-box__header">
                        <strong>{result.message.clone()}</strong>
                        <Button appearance=ButtonAppearance::Subtle on_click=on_close>
                            {icon("x")}
                        </Button>
                    </div>
                    <div class="result-box__counts">
                        {format!(
                            "Total: {} · Correctos: {} · Con errores: {}",
                            result.total_rows, result.successful_rows, result.failed_rows
                        )}
                    </div>
                    <ul class="result-box__errors">
                        {result.errors.into_iter().map(|e| view! {
                            <li>{format!("Fila {}: {}", e.row, e.error)}</li>
                        }).collect_view()}
                    </ul>
                </div>
            }
        })}
    }
}
