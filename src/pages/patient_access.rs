use std::sync::Arc;

use leptos::{ev::SubmitEvent, prelude::*, task::spawn_local};
use leptos_router::hooks::use_navigate;

use crate::flow::{
    Notice, PatientForm, PlatformSessionStorage, ServerAuthClient, ServerPatientDirectory,
    SessionEstablisher, StatusResolver, StatusUpdate, Submission,
};
use crate::models::FormMode;

/// Target of the confirmation link sent after a sign-up.
fn confirmation_redirect() -> String {
    #[cfg(feature = "hydrate")]
    {
        if let Some(origin) = web_sys::window().and_then(|w| w.location().origin().ok()) {
            return format!("{origin}/auth/confirm");
        }
    }
    "/auth/confirm".to_string()
}

/// Single email form that turns into registration or login depending on
/// what the clinic knows about the email.
#[component]
pub fn PatientAccessPage() -> impl IntoView {
    let navigate = use_navigate();
    let form = RwSignal::new(PatientForm::default());
    let (notice, set_notice) = signal(Option::<Notice>::None);

    let auth = Arc::new(ServerAuthClient::default());
    let directory = Arc::new(ServerPatientDirectory);
    let resolver = StatusResolver::new(Arc::clone(&directory));
    let establisher = SessionEstablisher::new(
        Arc::clone(&auth),
        directory,
        Arc::new(PlatformSessionStorage::default()),
        confirmation_redirect(),
    );

    // Session transitions are handled on their own task, after the call
    // that caused them has returned.
    #[cfg(feature = "hydrate")]
    {
        use crate::flow::AuthService;
        use futures::StreamExt;

        let (unmounted, on_unmount) = futures::channel::oneshot::channel::<()>();
        on_cleanup(move || {
            let _ = unmounted.send(());
        });
        let events = auth.subscribe().take_until(on_unmount);
        let listener = establisher.clone();
        spawn_local(async move {
            listener
                .listen(events, || form.try_with_untracked(PatientForm::mode))
                .await;
        });
    }
    #[cfg(not(feature = "hydrate"))]
    let _ = auth;

    let submit_action = Action::new_local(move |submission: &Submission| {
        let establisher = establisher.clone();
        let submission = submission.clone();
        async move { establisher.submit(submission).await }
    });

    Effect::new(move |_| {
        if let Some(report) = submit_action.value().get() {
            if report.registration_completed {
                form.update(PatientForm::complete_registration);
            }
            if let Some(admission) = &report.admission {
                navigate(admission.destination, Default::default());
            }
            set_notice.set(Some(report.notice));
        }
    });

    let on_email = move |ev| {
        let email = event_target_value(&ev);
        form.update(|f| f.set_email(email.clone()));
        let resolver = resolver.clone();
        spawn_local(async move {
            if let StatusUpdate::Applied(status) = resolver.resolve(&email).await {
                form.update(|f| f.apply_status(status));
            }
        });
    };

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        if submit_action.pending().get_untracked() || !form.with_untracked(PatientForm::can_submit) {
            return;
        }
        set_notice.set(None);
        submit_action.dispatch(form.with_untracked(PatientForm::submission));
    };

    let registering = move || form.with(PatientForm::mode) == FormMode::Registration;

    view! {
        <div class="auth-page">
            <div class="auth-card">
                <h1>{move || if registering() { "Create Your Account" } else { "Patient Sign In" }}</h1>

                <form on:submit=on_submit>
                    <div class="form-group">
                        <label for="email">"Email"</label>
                        <input
                            type="email"
                            id="email"
                            name="email"
                            required
                            placeholder="your@email.com"
                            prop:value=move || form.with(|f| f.email().to_string())
                            on:input=on_email
                        />
                        <Show when=move || form.with(PatientForm::shows_not_found_hint)>
                            <p class="field-hint error">
                                "We couldn't find a patient with this email. Ask your psychologist to enroll you."
                            </p>
                        </Show>
                    </div>

                    <div class="form-group">
                        <label for="password">"Password"</label>
                        <input
                            type="password"
                            id="password"
                            name="password"
                            required
                            placeholder="••••••••"
                            prop:value=move || form.with(|f| f.password().to_string())
                            on:input=move |ev| form.update(|f| f.set_password(event_target_value(&ev)))
                        />
                    </div>

                    <Show when=registering>
                        <div class="form-group">
                            <label for="confirm-password">"Confirm Password"</label>
                            <input
                                type="password"
                                id="confirm-password"
                                name="confirm_password"
                                required
                                minlength="6"
                                placeholder="Minimum 6 characters"
                                prop:value=move || form.with(|f| f.confirm_password().to_string())
                                on:input=move |ev| {
                                    form.update(|f| f.set_confirm_password(event_target_value(&ev)))
                                }
                            />
                        </div>
                    </Show>

                    <button
                        type="submit"
                        class="btn btn-primary"
                        disabled=move || submit_action.pending().get() || !form.with(PatientForm::can_submit)
                    >
                        {move || match (submit_action.pending().get(), registering()) {
                            (true, true) => "Creating account...",
                            (true, false) => "Signing in...",
                            (false, true) => "Create Account",
                            (false, false) => "Sign In",
                        }}
                    </button>

                    {move || notice.get().map(|n| {
                        let class = if n.is_error() { "error" } else { "success" };
                        view! { <p class=class>{n.message()}</p> }
                    })}
                </form>
            </div>
        </div>
    }
}
