use crate::domain::a001_device::ui::list::DeviceList;
use crate::shared::components::PageHeader;
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
fn DevicesPage() -> impl IntoView {
    view! {
        <div class="page-frame">
            <PageHeader title="Biomedical Equipment Inventory" />
            <DeviceList />
        </div>
    }
}

#[component]
pub fn AppRoutes() -> impl IntoView {
    view! {
        <Router>
            <Routes fallback=|| view! { <DevicesPage /> }>
                <Route path=path!("/") view=DevicesPage />
            </Routes>
        </Router>
    }
}
