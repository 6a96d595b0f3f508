// Simulated platform login used when an account is connected or reconnected.
use rand::Rng;
use std::time::Duration;

use crate::config::ConnectorConfig;
use crate::models::{ConnectionOutcome, Platform};

#[derive(Debug, Clone)]
pub struct AccountConnector {
    min_delay: Duration,
    max_delay: Duration,
    failure_markers: Vec<String>,
}

impl AccountConnector {
    pub fn new(config: &ConnectorConfig) -> Self {
        Self {
            min_delay: Duration::from_millis(config.min_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            failure_markers: config
                .failure_markers
                .iter()
                .map(|m| m.trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    fn delay(&self) -> Duration {
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        rand::thread_rng().gen_range(self.min_delay..=self.max_delay)
    }

    /// Decides the outcome without waiting.
    pub fn evaluate(&self, platform: Platform, email: &str, password: &str) -> ConnectionOutcome {
        if password.is_empty() {
            return ConnectionOutcome::failed("Password is required");
        }

        let email = email.to_lowercase();
        match self.failure_markers.iter().find(|m| email.contains(m.as_str())) {
            Some(_) => ConnectionOutcome::failed(format!(
                "{} rejected the login for {}",
                platform_name(platform),
                email
            )),
            None => ConnectionOutcome::connected(),
        }
    }

    /// Waits for the simulated login round-trip, then reports the outcome.
    pub async fn connect(&self, platform: Platform, email: &str, password: &str) -> ConnectionOutcome {
        let delay = self.delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let outcome = self.evaluate(platform, email, password);
        tracing::info!(
            platform = %platform,
            status = %outcome.status,
            delay_ms = delay.as_millis() as u64,
            "Simulated account connection finished"
        );
        outcome
    }
}

fn platform_name(platform: Platform) -> &'static str {
    match platform {
        Platform::Facebook => "Facebook",
        Platform::Instagram => "Instagram",
        Platform::Linkedin => "LinkedIn",
        Platform::Email => "The mail server",
    }
}
