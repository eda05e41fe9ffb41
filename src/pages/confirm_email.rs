use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_query_map;

use crate::server_fns::confirm_email;

#[component]
pub fn ConfirmEmailPage() -> impl IntoView {
    let query = use_query_map();
    let token = move || query.read().get("token").unwrap_or_default();

    let confirm_result = Resource::new(token, |t| async move {
        if t.is_empty() {
            return Err("No confirmation token provided".to_string());
        }
        confirm_email(t).await.map_err(|e| e.to_string())
    });

    view! {
        <div class="auth-page">
            <div class="auth-card">
                <h1>"Email Confirmation"</h1>

                <Suspense fallback=|| view! { <p>"Confirming your email..."</p> }>
                    {move || {
                        confirm_result.get().map(|result| {
                            match result {
                                Ok(_) => view! {
                                    <div class="success-message">
                                        <h2>"Email Confirmed!"</h2>
                                        <p>"Your patient account is ready."</p>
                                        <A href="/login" attr:class="btn btn-primary">"Sign In"</A>
                                    </div>
                                }.into_any(),
                                Err(e) => view! {
                                    <div class="error-message">
                                        <h2>"Confirmation Failed"</h2>
                                        <p>{e}</p>
                                        <p>"The link may have expired or already been used."</p>
                                        <A href="/login" attr:class="btn btn-secondary">"Back to Sign In"</A>
                                    </div>
                                }.into_any(),
                            }
                        })
                    }}
                </Suspense>
            </div>
        </div>
    }
}
