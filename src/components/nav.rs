use leptos::prelude::*;
#[cfg(feature = "hydrate")]
use leptos::web_sys;
use leptos_router::components::A;

use crate::flow::{PlatformSessionStorage, SessionStorage};
use crate::server_fns::{get_current_user, SignOut};

#[component]
pub fn Nav() -> impl IntoView {
    let user = Resource::new(|| (), |_| get_current_user());
    let sign_out_action = ServerAction::<SignOut>::new();

    // After signing out, drop the local patient session and reload
    Effect::new(move |_| {
        if let Some(Ok(_)) = sign_out_action.value().get() {
            PlatformSessionStorage::default().clear();
            #[cfg(feature = "hydrate")]
            {
                if let Some(window) = web_sys::window() {
                    let _ = window.location().set_href("/");
                }
            }
        }
    });

    view! {
        <nav class="main-nav">
            <div class="nav-brand">
                <A href="/">"Patient Portal"</A>
            </div>

            <div class="nav-links">
                <Suspense fallback=|| ()>
                    {move || {
                        user.get().map(|result| {
                            match result {
                                Ok(Some(u)) => view! {
                                    <A href="/patient">"My Portal"</A>
                                    <span class="user-email">{u.email}</span>
                                    <ActionForm action=sign_out_action attr:class="logout-form">
                                        <button type="submit" class="btn btn-small">"Sign Out"</button>
                                    </ActionForm>
                                }.into_any(),
                                _ => view! {
                                    <A href="/login">"Sign In"</A>
                                }.into_any(),
                            }
                        })
                    }}
                </Suspense>
            </div>
        </nav>
    }
}
