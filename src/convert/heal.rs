// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

use crate::format::mermaid::{extract_mermaid, local_repair, normalize_mermaid};
use crate::model::GenerationMemory;
use crate::remote::{Generator, Renderer, RepairRequest};

/// Remote repair attempts allowed per generation before giving up.
pub const MAX_REPAIR_ATTEMPTS: u32 = 3;

/// Result of running diagram text through the self-healing validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealOutcome {
    /// The text renders. `repaired` is set when it differs from the input.
    Accepted { text: String, repaired: bool },
    /// The text still fails after local repair and the attempt budget.
    Exhausted { text: String, last_error: String },
}

impl HealOutcome {
    pub fn text(&self) -> &str {
        match self {
            HealOutcome::Accepted { text, .. } => text,
            HealOutcome::Exhausted { text, .. } => text,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, HealOutcome::Accepted { .. })
    }
}

/// Whether a remote repair may be attempted for this text.
///
/// Only text that still matches what the backend last produced qualifies;
/// once the user edits the diagram, escalation would fight their changes.
/// Webhook generations cannot take a second turn, and the per-generation
/// attempt budget is final.
fn should_escalate(memory: &GenerationMemory, normalized: &str) -> bool {
    let Some(provider) = memory.provider() else {
        return false;
    };
    if !provider.is_escalatable() {
        return false;
    }
    if memory.attempts_used() >= MAX_REPAIR_ATTEMPTS {
        return false;
    }
    let Some(last) = memory.last_generated() else {
        return false;
    };
    normalize_mermaid(last) == normalized
}

/// Validate diagram text, repairing it when the renderer rejects it.
///
/// The cheap path is a local normalization-only repair, which consumes no
/// attempt. When that is not enough the backend that produced the text is
/// asked to fix it, up to [`MAX_REPAIR_ATTEMPTS`] times per generation,
/// feeding each round the latest parser error. A remote answer that does
/// not change the text falls back to local repair before the round is
/// written off.
pub async fn heal<G: Generator, R: Renderer>(
    generator: &G,
    renderer: &R,
    memory: &mut GenerationMemory,
    code: &str,
) -> HealOutcome {
    let normalized = normalize_mermaid(code);
    let first_error = match renderer.validate(&normalized).await {
        Ok(()) => {
            return HealOutcome::Accepted {
                repaired: normalized != code,
                text: normalized,
            }
        }
        Err(err) => err.message,
    };

    let locally_repaired = local_repair(&normalized);
    if locally_repaired != normalized && renderer.validate(&locally_repaired).await.is_ok() {
        memory.set_last_generated(locally_repaired.clone());
        return HealOutcome::Accepted {
            text: locally_repaired,
            repaired: true,
        };
    }

    if !should_escalate(memory, &normalized) {
        return HealOutcome::Exhausted {
            text: normalized,
            last_error: first_error,
        };
    }

    let original = memory.last_generated().unwrap_or(normalized.as_str()).to_owned();
    let model = memory.model().to_owned();
    let base_url = memory.base_url().map(str::to_owned);
    let mut working = normalized;
    let mut last_error = first_error;
    while memory.attempts_used() < MAX_REPAIR_ATTEMPTS {
        memory.record_attempt();
        let request = RepairRequest {
            mermaid: working.clone(),
            error_message: last_error.clone(),
            original: (original != working).then(|| original.clone()),
            model: model.clone(),
            base_url: base_url.clone(),
        };
        let response = match generator.repair(request).await {
            Ok(response) => response,
            // A failed call is treated as an unchanged answer; the local
            // fallback below still gets its chance this round.
            Err(_) => working.clone(),
        };

        let mut candidate = normalize_mermaid(&extract_mermaid(&response));
        if candidate.is_empty() || candidate == working {
            let local = local_repair(&working);
            if !local.is_empty() && local != working {
                candidate = local;
            }
        }
        if candidate.is_empty() || candidate == working {
            continue;
        }

        match renderer.validate(&candidate).await {
            Ok(()) => {
                memory.set_last_generated(candidate.clone());
                return HealOutcome::Accepted {
                    text: candidate,
                    repaired: true,
                };
            }
            Err(err) => {
                last_error = err.message;
                working = candidate;
            }
        }
    }

    HealOutcome::Exhausted {
        text: working,
        last_error,
    }
}
