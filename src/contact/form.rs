use serde_json::{Map, Value};

use crate::config::{ContactSettings, FormEncoding};
use crate::error::SubmitError;
use crate::http::{HttpClient, RequestBody};
use crate::storage::{StoreHandle, read_key, write_key};

pub const COOLDOWN_KEY: &str = "vault_ticket_cooldown";

const MINUTE_MS: i64 = 60_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    CaptchaMissing,
    Required,
    /// No endpoint is configured.
    Unavailable,
    /// The backend explained why it refused.
    Server(String),
    /// Transport failure or a refusal without a readable reason.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStatus {
    Idle,
    RateLimited { remaining_minutes: u64 },
    Submitting,
    Success,
    Error(FormError),
}

/// Why `begin_submit` produced no request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    /// The hidden field was filled in. Nothing visible changes.
    Honeypot,
    /// A submission is in flight, already succeeded, or is rate limited.
    Busy,
    /// A local check failed; the status says which.
    Invalid,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Field {
    Alias,
    Message,
    Captcha,
    /// Hidden bot trap, submitted as `_gotcha`.
    Honeypot,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    pub alias: String,
    pub message: String,
    pub captcha: String,
    pub honeypot: String,
}

impl Fields {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Alias => &self.alias,
            Field::Message => &self.message,
            Field::Captcha => &self.captcha,
            Field::Honeypot => &self.honeypot,
        }
    }

    pub fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Alias => &mut self.alias,
            Field::Message => &mut self.message,
            Field::Captcha => &mut self.captcha,
            Field::Honeypot => &mut self.honeypot,
        }
    }
}

/// One POST, ready to send from a worker thread.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub endpoint: String,
    pub body: RequestBody,
}

impl Submission {
    pub fn send(&self, http: &dyn HttpClient) -> Result<(), SubmitError> {
        let response = http.post(&self.endpoint, self.body.clone())?;
        if response.is_success() {
            return Ok(());
        }
        Err(SubmitError::Rejected {
            status: response.status,
            message: server_message(&response.body),
        })
    }
}

/// `errors[].message` joined, else `error`, from a rejection body.
pub fn server_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let joined = value
        .get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e.get("message").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .filter(|s| !s.is_empty());
    joined.or_else(|| {
        value
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .filter(|s| !s.is_empty())
    })
}

pub struct ContactForm {
    settings: ContactSettings,
    store: StoreHandle,
    fields: Fields,
    status: FormStatus,
    succeeded_at: Option<i64>,
}

impl ContactForm {
    pub fn new(settings: ContactSettings, store: StoreHandle) -> Self {
        Self {
            settings,
            store,
            fields: Fields::default(),
            status: FormStatus::Idle,
            succeeded_at: None,
        }
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn captcha_enabled(&self) -> bool {
        self.settings.captcha
    }

    /// Edit a field; ignored while a submission is in flight.
    pub fn field_mut(&mut self, field: Field) -> Option<&mut String> {
        match self.status {
            FormStatus::Submitting => None,
            _ => Some(self.fields.get_mut(field)),
        }
    }

    /// Minutes left before another ticket may be sent, rounded up.
    pub fn remaining_minutes(&self, now_ms: i64) -> Option<u64> {
        let last: i64 = read_key(&self.store, COOLDOWN_KEY)?.trim().parse().ok()?;
        let window = i64::try_from(self.settings.cooldown_minutes)
            .unwrap_or(i64::MAX / MINUTE_MS)
            .saturating_mul(MINUTE_MS);
        let elapsed = now_ms.saturating_sub(last).max(0);
        if elapsed >= window {
            return None;
        }
        let left = window - elapsed;
        Some(((left + MINUTE_MS - 1) / MINUTE_MS) as u64)
    }

    /// Reset the modal for display.
    pub fn open(&mut self, now_ms: i64) {
        self.succeeded_at = None;
        self.status = match self.remaining_minutes(now_ms) {
            Some(remaining_minutes) => FormStatus::RateLimited { remaining_minutes },
            None => FormStatus::Idle,
        };
    }

    pub fn begin_submit(&mut self, now_ms: i64) -> Result<Submission, Rejected> {
        if !matches!(self.status, FormStatus::Idle | FormStatus::Error(_)) {
            return Err(Rejected::Busy);
        }
        if !self.fields.honeypot.is_empty() {
            tracing::info!("honeypot filled; dropping ticket");
            return Err(Rejected::Honeypot);
        }
        if let Some(remaining_minutes) = self.remaining_minutes(now_ms) {
            self.status = FormStatus::RateLimited { remaining_minutes };
            return Err(Rejected::Invalid);
        }
        if self.settings.captcha && self.fields.captcha.trim().is_empty() {
            return self.invalid(FormError::CaptchaMissing);
        }
        if self.fields.alias.trim().is_empty() || self.fields.message.trim().is_empty() {
            return self.invalid(FormError::Required);
        }
        let endpoint = self.settings.endpoint.trim();
        if endpoint.is_empty() {
            return self.invalid(FormError::Unavailable);
        }

        self.status = FormStatus::Submitting;
        tracing::info!(endpoint, encoding = ?self.settings.encoding, "submitting ticket");
        Ok(Submission {
            endpoint: endpoint.to_string(),
            body: self.body(),
        })
    }

    fn invalid(&mut self, error: FormError) -> Result<Submission, Rejected> {
        self.status = FormStatus::Error(error);
        Err(Rejected::Invalid)
    }

    fn body(&self) -> RequestBody {
        let mut pairs = vec![
            ("alias", self.fields.alias.trim().to_string()),
            ("message", self.fields.message.trim().to_string()),
            ("_gotcha", self.fields.honeypot.clone()),
        ];
        if self.settings.captcha {
            pairs.push(("g-recaptcha-response", self.fields.captcha.trim().to_string()));
        }
        match self.settings.encoding {
            FormEncoding::Multipart => RequestBody::Multipart(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
            ),
            FormEncoding::Json => {
                let map: Map<String, Value> = pairs
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), Value::String(v)))
                    .collect();
                RequestBody::Json(Value::Object(map))
            }
        }
    }

    /// Apply the outcome of a `Submission::send`.
    pub fn finish(&mut self, result: Result<(), SubmitError>, now_ms: i64) {
        match result {
            Ok(()) => {
                tracing::info!("ticket accepted");
                write_key(&self.store, COOLDOWN_KEY, &now_ms.to_string());
                self.fields = Fields::default();
                self.status = FormStatus::Success;
                self.succeeded_at = Some(now_ms);
            }
            Err(error) => {
                tracing::warn!(%error, "ticket failed");
                let error = match error {
                    SubmitError::Rejected {
                        message: Some(message),
                        ..
                    } => FormError::Server(message),
                    _ => FormError::Failed,
                };
                self.status = FormStatus::Error(error);
            }
        }
    }

    /// Whether a success message has been shown long enough to close the modal.
    pub fn should_auto_close(&self, now_ms: i64) -> bool {
        let delay = i64::try_from(self.settings.auto_close_ms).unwrap_or(i64::MAX);
        matches!(self.status, FormStatus::Success)
            && self
                .succeeded_at
                .is_some_and(|at| now_ms.saturating_sub(at) >= delay)
    }
}
