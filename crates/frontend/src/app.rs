use crate::usecases::u501_import_products::ImportProductsPage;
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    view! {
        <main class="app-main">
            <ImportProductsPage />
        </main>
    }
}
