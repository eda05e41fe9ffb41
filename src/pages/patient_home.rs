use chrono::Utc;
use leptos::{prelude::*, task::spawn_local};
use leptos_router::hooks::use_navigate;

use crate::components::PatientGuard;
use crate::flow::{AuthService, LocalSession, PlatformSessionStorage, ServerAuthClient, SessionStorage};

/// Landing page for an admitted patient.
#[component]
pub fn PatientHomePage() -> impl IntoView {
    let navigate = use_navigate();
    let (session, set_session) = signal(Option::<LocalSession>::None);
    let (checked, set_checked) = signal(false);

    // Local storage only exists in the browser.
    Effect::new(move |_| {
        set_session.set(PlatformSessionStorage::default().load_active(Utc::now()));
        set_checked.set(true);
    });

    Effect::new(move |_| {
        if checked.get() && session.get().is_none() {
            navigate("/login", Default::default());
        }
    });

    let sign_out = move |_| {
        spawn_local(async move {
            if let Err(err) = ServerAuthClient::default().sign_out().await {
                tracing::warn!("sign-out failed: {err}");
            }
            PlatformSessionStorage::default().clear();
            #[cfg(feature = "hydrate")]
            {
                if let Some(window) = web_sys::window() {
                    let _ = window.location().set_href("/login");
                }
            }
        });
    };

    view! {
        <PatientGuard>
            <div class="patient-home">
                {move || session.get().map(|s| view! {
                    <h1>{format!("Hello, {}", s.name)}</h1>
                    <p class="subtitle">{s.email}</p>
                })}
                <button class="btn btn-secondary" on:click=sign_out>"Sign Out"</button>
            </div>
        </PatientGuard>
    }
}
