//! Outbound mail
//!
//! Password reset delivery. No SMTP relay is wired up in this deployment,
//! so the reset link is written to the log where an operator can hand it
//! to the customer. The token itself is never logged at error level or
//! returned over the API.

#[derive(Clone)]
pub struct Mailer {
    frontend_url: String,
}

impl Mailer {
    pub fn new(frontend_url: String) -> Self {
        Self { frontend_url }
    }

    pub fn send_password_reset(&self, email: &str, token: &str) {
        let link = format!("{}/reset-password?token={token}", self.frontend_url);
        tracing::info!(
            target: "mailer",
            email = %email,
            link = %link,
            "Password reset link issued"
        );
    }
}
