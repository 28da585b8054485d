// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

//! The sketch-to-diagram pipeline: prompt assembly, generation, extraction,
//! normalization, and the bounded self-healing validation loop.

mod heal;
mod prompt;
mod refresh;

use std::fmt;

pub use heal::{heal, HealOutcome, MAX_REPAIR_ATTEMPTS};
pub use prompt::{
    draft_prompt, final_check_prompt, recognition_context, repair_prompt, single_shot_prompt,
    structure_prompt, DiagramHint,
};
pub use refresh::{channel, RefreshCoalescer, RefreshHandle, DEFAULT_QUIET};

use crate::format::mermaid::{extract_json, extract_mermaid, normalize_mermaid};
use crate::model::{GenerationMemory, Provider, RecognitionSession};
use crate::query::AdjacencyOptions;
use crate::remote::{GenerateRequest, Generator, ImagePayload, RemoteError, Renderer};

/// One conversion job: what to generate from and how.
#[derive(Debug, Clone)]
pub struct ConvertRequest {
    /// Free-form user constraints appended to every prompt.
    pub prompt: String,
    pub image: Option<ImagePayload>,
    pub hint: DiagramHint,
    /// Analyze into a JSON structure first, then author Mermaid from it.
    pub two_stage: bool,
    /// Run a syntax-checker turn over the draft before validating.
    pub final_check: bool,
    pub provider: Provider,
    pub model: String,
    pub base_url: Option<String>,
}

/// What happened during a conversion, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertEvent {
    StructureParsed,
    StructureFallback,
    FinalCheckApplied,
    Repaired,
    RepairExhausted { last_error: String },
}

impl fmt::Display for ConvertEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertEvent::StructureParsed => f.write_str("structure stage parsed"),
            ConvertEvent::StructureFallback => {
                f.write_str("structure stage unusable, fell back to single shot")
            }
            ConvertEvent::FinalCheckApplied => f.write_str("final syntax check applied"),
            ConvertEvent::Repaired => f.write_str("diagram repaired"),
            ConvertEvent::RepairExhausted { last_error } => {
                write!(f, "repair attempts exhausted: {last_error}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    Remote(RemoteError),
    /// The backend answered, but no diagram text survived extraction.
    EmptyDiagram,
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Remote(err) => write!(f, "{err}"),
            ConvertError::EmptyDiagram => f.write_str("backend returned no diagram text"),
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConvertError::Remote(err) => Some(err),
            ConvertError::EmptyDiagram => None,
        }
    }
}

impl From<RemoteError> for ConvertError {
    fn from(err: RemoteError) -> Self {
        ConvertError::Remote(err)
    }
}

/// A finished conversion. `text` always holds the best diagram produced,
/// even when validation never succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOutcome {
    pub text: String,
    pub render_ok: bool,
    pub last_error: Option<String>,
}

/// Drives the conversion pipeline and remembers generations so failed
/// renders can escalate back to the backend that produced them.
#[derive(Debug)]
pub struct Converter<G, R> {
    generator: G,
    renderer: R,
    memory: GenerationMemory,
    adjacency: AdjacencyOptions,
    events: Vec<ConvertEvent>,
}

impl<G: Generator, R: Renderer> Converter<G, R> {
    pub fn new(generator: G, renderer: R) -> Self {
        Self {
            generator,
            renderer,
            memory: GenerationMemory::new(),
            adjacency: AdjacencyOptions::default(),
            events: Vec::new(),
        }
    }

    pub fn memory(&self) -> &GenerationMemory {
        &self.memory
    }

    /// Events recorded by the most recent `convert` call.
    pub fn events(&self) -> &[ConvertEvent] {
        &self.events
    }

    /// Convert a sketch (image and/or recognized content) into validated
    /// diagram text.
    pub async fn convert(
        &mut self,
        request: ConvertRequest,
        session: Option<&RecognitionSession>,
    ) -> Result<ConvertOutcome, ConvertError> {
        self.events.clear();
        let context = session.and_then(|s| recognition_context(s, self.adjacency));

        let draft = if request.two_stage {
            self.generate_two_stage(&request, context.as_deref()).await?
        } else {
            self.generate_single_shot(&request, context.as_deref()).await?
        };

        let draft = if request.final_check {
            self.run_final_check(&request, draft).await?
        } else {
            draft
        };

        let text = normalize_mermaid(&extract_mermaid(&draft));
        if text.is_empty() {
            return Err(ConvertError::EmptyDiagram);
        }
        self.memory.remember(
            request.provider,
            request.model.clone(),
            request.base_url.clone(),
            text.clone(),
        );

        let outcome = heal(&self.generator, &self.renderer, &mut self.memory, &text).await;
        Ok(match outcome {
            HealOutcome::Accepted { text, repaired } => {
                if repaired {
                    self.events.push(ConvertEvent::Repaired);
                }
                ConvertOutcome {
                    text,
                    render_ok: true,
                    last_error: None,
                }
            }
            HealOutcome::Exhausted { text, last_error } => {
                self.events.push(ConvertEvent::RepairExhausted {
                    last_error: last_error.clone(),
                });
                ConvertOutcome {
                    text,
                    render_ok: false,
                    last_error: Some(last_error),
                }
            }
        })
    }

    async fn generate_single_shot(
        &mut self,
        request: &ConvertRequest,
        context: Option<&str>,
    ) -> Result<String, ConvertError> {
        let prompt = single_shot_prompt(&request.prompt, context, &request.hint);
        Ok(self.generate(request, prompt).await?)
    }

    /// Two-stage generation: structure as JSON first, then Mermaid authored
    /// from that structure. An unusable structure falls back to single shot.
    async fn generate_two_stage(
        &mut self,
        request: &ConvertRequest,
        context: Option<&str>,
    ) -> Result<String, ConvertError> {
        let prompt = structure_prompt(&request.prompt, context, &request.hint);
        let response = self.generate(request, prompt).await?;
        let Some(structure) = extract_json(&response) else {
            self.events.push(ConvertEvent::StructureFallback);
            return self.generate_single_shot(request, context).await;
        };
        self.events.push(ConvertEvent::StructureParsed);
        let prompt = draft_prompt(&structure, &request.prompt, &request.hint);
        Ok(self.generate(request, prompt).await?)
    }

    /// Syntax-checker turn over the draft. An empty answer keeps the draft.
    async fn run_final_check(
        &mut self,
        request: &ConvertRequest,
        draft: String,
    ) -> Result<String, ConvertError> {
        let current = extract_mermaid(&draft);
        let prompt = final_check_prompt(&current);
        let response = self.generate(request, prompt).await?;
        let checked = extract_mermaid(&response);
        if checked.is_empty() {
            return Ok(draft);
        }
        if checked != current {
            self.events.push(ConvertEvent::FinalCheckApplied);
        }
        Ok(checked)
    }

    async fn generate(
        &self,
        request: &ConvertRequest,
        prompt: String,
    ) -> Result<String, RemoteError> {
        self.generator
            .generate(GenerateRequest {
                prompt,
                image: request.image.clone(),
                model: request.model.clone(),
                base_url: request.base_url.clone(),
            })
            .await
    }
}
