use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::config::AppConfiguration;
use crate::mail::message::MailMessage;
use gantry_core::{GantryError, GantryResult, SecretStore};

/// Delivery backend for rendered messages
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &MailMessage) -> GantryResult<()>;
}

/// Writes one `.eml` file per message. The delivery mode for
/// development setups and the flight recorder for tests.
pub struct PickupDirectoryTransport {
    directory: PathBuf,
    sequence: AtomicU64,
}

impl PickupDirectoryTransport {
    pub fn new(directory: impl Into<PathBuf>) -> GantryResult<Self> {
        let directory = directory.into();
        gantry_core::path::ensure_dir(&directory)?;
        Ok(Self {
            directory,
            sequence: AtomicU64::new(0),
        })
    }

    pub fn directory(&self) -> &PathBuf {
        &self.directory
    }
}

fn render_eml(message: &MailMessage) -> String {
    let join = |addresses: &[crate::mail::message::EmailAddress]| {
        addresses
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut eml = String::new();
    eml.push_str(&format!("From: {}\r\n", message.from));
    eml.push_str(&format!("To: {}\r\n", join(&message.to)));
    if !message.cc.is_empty() {
        eml.push_str(&format!("Cc: {}\r\n", join(&message.cc)));
    }
    if !message.reply_to.is_empty() {
        eml.push_str(&format!("Reply-To: {}\r\n", join(&message.reply_to)));
    }
    eml.push_str(&format!("Subject: {}\r\n", message.subject));
    eml.push_str(&format!("Date: {}\r\n", Utc::now().to_rfc2822()));
    eml.push_str("MIME-Version: 1.0\r\n");
    eml.push_str("Content-Type: text/plain; charset=utf-8\r\n");
    eml.push_str("\r\n");
    eml.push_str(&message.body);
    eml
}

#[async_trait]
impl MailTransport for PickupDirectoryTransport {
    async fn send(&self, message: &MailMessage) -> GantryResult<()> {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let name = format!(
            "{}-{:04}.eml",
            Utc::now().format("%Y%m%dT%H%M%S%.3f"),
            sequence
        );
        let path = self.directory.join(name);
        std::fs::write(&path, render_eml(message))?;
        // Reset links and invite confirmations travel through these files
        SecretStore::set_secure_permissions(&path)?;
        Ok(())
    }
}

/// Hands messages to an HTTP relay as JSON
pub struct HttpRelayTransport {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpRelayTransport {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl MailTransport for HttpRelayTransport {
    async fn send(&self, message: &MailMessage) -> GantryResult<()> {
        let mut request = self.client.post(&self.url).json(message);
        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(GantryError::Mail(format!(
                "mail relay at {} returned status {}",
                self.url,
                response.status()
            )));
        }
        Ok(())
    }
}

/// Relay when one is configured, pickup directory otherwise
pub fn transport_from_config(config: &AppConfiguration) -> GantryResult<Arc<dyn MailTransport>> {
    match config
        .mail
        .relay_url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
    {
        Some(url) => Ok(Arc::new(HttpRelayTransport::new(
            url,
            config.mail.relay_api_key.clone(),
        ))),
        None => Ok(Arc::new(PickupDirectoryTransport::new(
            config.mail_pickup_directory()?,
        )?)),
    }
}
