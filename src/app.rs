use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::{
    components::{Route, Router, Routes},
    path,
};

use crate::components::Nav;
use crate::pages::*;

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Stylesheet id="leptos" href="/pkg/patient_portal.css"/>
        <Title text="Patient Portal"/>
        <Meta name="description" content="Sign in to your clinic's patient portal"/>

        <Router>
            <Nav/>
            <main>
                <Routes fallback=|| view! { <h1>"404 - Page Not Found"</h1> }>
                    <Route path=path!("/") view=HomePage/>
                    <Route path=path!("/login") view=PatientAccessPage/>
                    <Route path=path!("/auth/confirm") view=ConfirmEmailPage/>
                    <Route path=path!("/patient") view=PatientHomePage/>
                </Routes>
            </main>
        </Router>
    }
}
