// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generation backends a diagram can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gemini,
    Groq,
    OpenAi,
    Ollama,
    Webhook,
}

impl Provider {
    /// Whether this backend can be asked for a follow-up repair. Webhook
    /// endpoints are fire-and-forget and cannot take a second turn.
    pub fn is_escalatable(self) -> bool {
        !matches!(self, Provider::Webhook)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::Gemini => "gemini",
            Provider::Groq => "groq",
            Provider::OpenAi => "openai",
            Provider::Ollama => "ollama",
            Provider::Webhook => "webhook",
        };
        f.write_str(name)
    }
}

/// What we remember about the most recent generation.
///
/// Remote repair is only offered for text that still matches what the backend
/// last produced; user edits invalidate the memory for escalation purposes.
/// Each fresh generation resets the repair-attempt budget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationMemory {
    provider: Option<Provider>,
    model: String,
    base_url: Option<String>,
    last_generated: Option<String>,
    attempts_used: u32,
}

impl GenerationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember(
        &mut self,
        provider: Provider,
        model: impl Into<String>,
        base_url: Option<String>,
        generated: impl Into<String>,
    ) {
        self.provider = Some(provider);
        self.model = model.into();
        self.base_url = base_url;
        self.last_generated = Some(generated.into());
        self.attempts_used = 0;
    }

    pub fn provider(&self) -> Option<Provider> {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn last_generated(&self) -> Option<&str> {
        self.last_generated.as_deref()
    }

    pub fn set_last_generated(&mut self, generated: impl Into<String>) {
        self.last_generated = Some(generated.into());
    }

    pub fn attempts_used(&self) -> u32 {
        self.attempts_used
    }

    pub fn record_attempt(&mut self) {
        self.attempts_used += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::{GenerationMemory, Provider};

    #[test]
    fn webhook_cannot_escalate() {
        assert!(!Provider::Webhook.is_escalatable());
        assert!(Provider::Gemini.is_escalatable());
        assert!(Provider::Ollama.is_escalatable());
    }

    #[test]
    fn remember_resets_attempt_budget() {
        let mut memory = GenerationMemory::new();
        memory.remember(Provider::Groq, "llama-3.3-70b", None, "flowchart TD\nA");
        memory.record_attempt();
        memory.record_attempt();
        assert_eq!(memory.attempts_used(), 2);

        memory.remember(Provider::Groq, "llama-3.3-70b", None, "flowchart TD\nB");
        assert_eq!(memory.attempts_used(), 0);
        assert_eq!(memory.last_generated(), Some("flowchart TD\nB"));
    }

    #[test]
    fn provider_names_round_trip_through_serde() {
        let json = serde_json::to_string(&Provider::OpenAi).unwrap();
        assert_eq!(json, "\"openai\"");
        let back: Provider = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Provider::OpenAi);
    }
}
