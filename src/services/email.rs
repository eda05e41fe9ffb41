use reqwest::Client;
use serde_json::json;
use tracing::{error, info};

pub struct Email {
    pub api_key: String,
    pub from: String,
}

impl Email {
    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), String> {
        if self.api_key.is_empty() {
            info!(to, subject, "email delivery disabled, not sending");
            return Ok(());
        }

        let res = Client::new()
            .post("https://api.resend.com/emails")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "from": self.from,
                "to": to,
                "subject": subject,
                "html": html
            }))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if res.status().is_success() {
            Ok(())
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            error!(%status, "email provider rejected message");
            Err(body)
        }
    }

    pub async fn send_confirmation(&self, to: &str, url: &str) -> Result<(), String> {
        if self.api_key.is_empty() {
            info!(to, url, "confirmation link");
        }
        self.send(
            to,
            "Confirm your patient portal account",
            &format!(
                r#"
                <div style="font-family: sans-serif; max-width: 600px; margin: 0 auto;">
                    <h2>Welcome to the patient portal</h2>
                    <p>Your clinic has enrolled you. Confirm your email address to finish creating your account:</p>
                    <p style="margin: 30px 0;">
                        <a href="{url}" style="background: #2563eb; color: white; padding: 12px 24px; text-decoration: none; border-radius: 6px;">
                            Confirm Email
                        </a>
                    </p>
                    <p style="color: #666; font-size: 14px;">
                        Or copy this link: <a href="{url}">{url}</a>
                    </p>
                    <p style="color: #666; font-size: 14px;">This link expires in 24 hours.</p>
                </div>
                "#
            ),
        )
        .await
    }
}
