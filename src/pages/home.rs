use leptos::prelude::*;
use leptos_router::components::A;

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <div class="home-page">
            <section class="hero">
                <h1>"Patient Portal"</h1>
                <p class="subtitle">"Your sessions, notes and appointments with your psychologist"</p>
                <p class="description">
                    "Your clinic enrolls you with the email you gave them. "
                    "Enter that email to sign in, or to create your account the first time."
                </p>
                <div class="cta-buttons">
                    <A href="/login" attr:class="btn btn-primary">"Get Started"</A>
                </div>
            </section>
        </div>
    }
}
