use crate::models::UsageRecord;
use once_cell::sync::OnceCell;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_ALERT_ENDPOINT: &str = "https://app.nooko.ai/internal/email/send";
const ALERT_TIMEOUT: Duration = Duration::from_secs(10);

/// Injected notification capability for models the pricing table cannot
/// resolve. Implementations must never fail the estimation call; anything
/// that goes wrong stays inside `notify_unknown_model`.
pub trait UnknownModelAlert {
    fn notify_unknown_model(&self, model: &str, record: &UsageRecord);
}

#[derive(Debug, Clone)]
pub struct AlertSettings {
    pub base_url: String,
    pub internal_token: Option<String>,
    pub recipients: Vec<String>,
    pub dry_run: bool,
    pub debug: bool,
    pub timeout: Duration,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ALERT_ENDPOINT.to_string(),
            internal_token: None,
            recipients: Vec::new(),
            // Dry-run unless explicitly switched off.
            dry_run: true,
            debug: false,
            timeout: ALERT_TIMEOUT,
        }
    }
}

impl AlertSettings {
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Some(url) = env_var("AI_COST_ALERT_BASE_URL") {
            settings.base_url = url;
        }
        settings.internal_token = env_var("AI_COST_INTERNAL_TOKEN");
        settings.recipients = parse_recipient_list(env_var("AI_COST_ALERT_TO").as_deref());
        settings.dry_run = parse_bool_flag(env_var("AI_COST_ALERT_DRY_RUN").as_deref(), true);
        settings.debug = parse_bool_flag(env_var("AI_COST_ALERT_DEBUG").as_deref(), false);
        settings
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn parse_bool_flag(raw: Option<&str>, default: bool) -> bool {
    match raw {
        Some(raw) => matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "y" | "on"
        ),
        None => default,
    }
}

pub fn parse_recipient_list(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    raw.replace(';', ",")
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Posts an unknown-model alert email per recipient through the internal
/// email API. Best effort end to end: delivery failures are logged and
/// swallowed, and the outbound call is bounded by a fixed timeout.
pub struct EmailAlertDispatcher {
    settings: AlertSettings,
    // Built on first live send; dry-run dispatch never needs it.
    client: OnceCell<reqwest::blocking::Client>,
}

impl EmailAlertDispatcher {
    pub fn new(settings: AlertSettings) -> Self {
        Self {
            settings,
            client: OnceCell::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(AlertSettings::from_env())
    }

    fn client(&self) -> Result<&reqwest::blocking::Client, String> {
        self.client.get_or_try_init(|| {
            reqwest::blocking::Client::builder()
                .timeout(self.settings.timeout)
                .build()
                .map_err(|e| format!("cannot build alert HTTP client: {e}"))
        })
    }

    fn build_email(model: &str, record: &UsageRecord) -> (String, String) {
        let subject = format!("[AI Cost Calculator] Unknown model: {model}");
        let excerpt = serde_json::to_string_pretty(record)
            .unwrap_or_else(|_| "<unserializable record>".to_string());
        let body = format!(
            "<p>Hello,</p>\
             <p>The <strong>AI Cost Calculator</strong> could not compute cost for an AI usage \
             record because the model name was not found in the pricing table.</p>\
             <p><strong>Action needed:</strong> add pricing (or an alias mapping) for \
             <code>{model}</code> so future transactions can be priced correctly.</p>\
             <p><strong>Details (record excerpt):</strong></p>\
             <pre style='background:#f6f8fa;padding:12px;border-radius:6px;overflow:auto;\
             white-space:pre;'>{excerpt}</pre>\
             <p>Thank you.</p>"
        );
        (subject, body)
    }

    fn send_one(&self, to_email: &str, subject: &str, body_html: &str) -> Result<(), String> {
        if self.settings.dry_run {
            if self.settings.debug {
                debug!(
                    url = %self.settings.base_url,
                    to = %to_email,
                    subject = %subject,
                    "dry-run: alert email not sent"
                );
            }
            return Ok(());
        }

        let Some(token) = self.settings.internal_token.as_deref() else {
            return Err("missing internal token for live alert delivery".to_string());
        };

        let payload = json!({
            "to_email": to_email,
            "subject": subject,
            "template": "generic",
            "context": { "subject": subject, "body": body_html },
        });

        let response = self
            .client()?
            .post(&self.settings.base_url)
            .header("Content-Type", "application/json")
            .header("X-Internal-Token", token)
            .json(&payload)
            .send()
            .map_err(|e| format!("alert API connection error: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("alert API returned HTTP {status}"));
        }
        Ok(())
    }
}

impl UnknownModelAlert for EmailAlertDispatcher {
    fn notify_unknown_model(&self, model: &str, record: &UsageRecord) {
        if self.settings.recipients.is_empty() {
            if self.settings.debug {
                debug!(model, "no alert recipients configured, skipping unknown-model alert");
            }
            return;
        }

        let (subject, body) = Self::build_email(model, record);
        for to_email in &self.settings.recipients {
            if let Err(reason) = self.send_one(to_email, &subject, &body) {
                warn!(to = %to_email, model, %reason, "unknown-model alert delivery failed");
            }
        }
    }
}
