// ABOUTME: Incremental parser for delimiter-framed streaming program output
// ABOUTME: Buffers deltas, extracts complete phases, and captures program metadata
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::generation::prompts::{META_DELIMITER, PHASE_DELIMITER};
use crate::generation::schema::validate_phase;
use crate::generation::types::GeneratedPhase;
use serde::{Deserialize, Serialize};

/// Program-level metadata the model emits after the last phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramMeta {
    /// Program name
    pub name: String,
    /// Program description
    pub description: String,
    /// Total program length in weeks
    pub total_weeks: u32,
}

impl ProgramMeta {
    /// Metadata used when the model never emitted a parseable meta document.
    #[must_use]
    pub fn fallback_for(phases: &[GeneratedPhase]) -> Self {
        Self {
            name: "Custom Fitness Program".to_owned(),
            description: "A personalized fitness program designed for your goals.".to_owned(),
            total_weeks: phases.iter().map(|phase| phase.duration_weeks).sum(),
        }
    }
}

/// One outcome of feeding a delta into the parser
#[derive(Debug)]
pub enum ParseEvent {
    /// A complete, valid phase was extracted
    Phase(Box<GeneratedPhase>),
    /// The program metadata document was parsed
    Meta(ProgramMeta),
    /// A delimited segment was dropped (bad JSON or failed validation)
    Skipped {
        /// Why the segment was dropped
        reason: String,
    },
}

/// Strip a leading/trailing markdown code fence from model output.
///
/// Models occasionally wrap JSON in ```` ```json ```` fences despite the
/// prompt forbidding it. Only the outermost fence markers are removed so
/// content inside JSON strings stays untouched.
#[must_use]
pub fn strip_markdown_fences(content: &str) -> &str {
    let mut cleaned = content.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

/// Accumulates streamed text and extracts phases as their delimiters arrive.
///
/// Phase documents are framed by the phase delimiter; the trailing unframed
/// remainder stays buffered until more text arrives. Once the meta delimiter
/// is seen, everything before it is final and the parser switches to
/// collecting the metadata document.
#[derive(Debug, Default)]
pub struct PhaseStreamParser {
    buffer: String,
    completed: Vec<GeneratedPhase>,
    meta: Option<ProgramMeta>,
    meta_mode: bool,
}

impl PhaseStreamParser {
    /// Create an empty parser
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one streamed delta and collect whatever completed because of it.
    pub fn add_chunk(&mut self, chunk: &str) -> Vec<ParseEvent> {
        self.buffer.push_str(chunk);
        let mut events = Vec::new();

        if !self.meta_mode && self.buffer.contains(META_DELIMITER) {
            let buffer = std::mem::take(&mut self.buffer);
            let (phase_text, meta_text) = buffer
                .split_once(META_DELIMITER)
                .unwrap_or((buffer.as_str(), ""));

            // Everything before the meta delimiter is final, so the trailing
            // segment is parsed even without its own phase delimiter.
            for segment in phase_text.split(PHASE_DELIMITER) {
                let segment = segment.trim();
                if !segment.is_empty() {
                    events.push(self.parse_phase(segment));
                }
            }

            self.meta_mode = true;
            self.buffer = meta_text.to_owned();
        }

        if self.meta_mode {
            if self.meta.is_none() {
                if let Some(event) = self.try_parse_meta() {
                    events.push(event);
                }
            }
        } else if self.buffer.contains(PHASE_DELIMITER) {
            let buffer = std::mem::take(&mut self.buffer);
            let mut segments: Vec<&str> = buffer.split(PHASE_DELIMITER).collect();
            let remainder = segments.pop().unwrap_or("");

            for segment in segments {
                let segment = segment.trim();
                if !segment.is_empty() {
                    events.push(self.parse_phase(segment));
                }
            }

            self.buffer = remainder.to_owned();
        }

        events
    }

    /// All phases successfully parsed so far, in arrival order
    #[must_use]
    pub fn completed_phases(&self) -> &[GeneratedPhase] {
        &self.completed
    }

    /// Program metadata, if the model emitted a parseable meta document
    #[must_use]
    pub fn program_meta(&self) -> Option<&ProgramMeta> {
        self.meta.as_ref()
    }

    /// Unconsumed buffer contents
    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Whether the meta delimiter has been seen
    #[must_use]
    pub const fn is_in_meta_mode(&self) -> bool {
        self.meta_mode
    }

    /// Consume the parser, yielding the collected phases and metadata
    #[must_use]
    pub fn finish(self) -> (Vec<GeneratedPhase>, Option<ProgramMeta>) {
        (self.completed, self.meta)
    }

    /// Clear all parser state
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.completed.clear();
        self.meta = None;
        self.meta_mode = false;
    }

    fn parse_phase(&mut self, segment: &str) -> ParseEvent {
        let cleaned = strip_markdown_fences(segment);
        match serde_json::from_str::<GeneratedPhase>(cleaned) {
            Ok(phase) => {
                let report = validate_phase(&phase);
                if report.ok {
                    self.completed.push(phase.clone());
                    ParseEvent::Phase(Box::new(phase))
                } else {
                    ParseEvent::Skipped {
                        reason: format!("phase validation failed: {}", report.describe()),
                    }
                }
            }
            Err(e) => ParseEvent::Skipped {
                reason: format!("phase JSON parse failed: {e}"),
            },
        }
    }

    fn try_parse_meta(&mut self) -> Option<ParseEvent> {
        let cleaned = strip_markdown_fences(&self.buffer);
        if cleaned.is_empty() {
            return None;
        }

        // Incomplete JSON keeps buffering until more deltas arrive
        let parsed: ProgramMeta = serde_json::from_str(cleaned).ok()?;
        if parsed.name.is_empty() || parsed.description.is_empty() {
            return None;
        }

        self.meta = Some(parsed.clone());
        self.buffer.clear();
        Some(ParseEvent::Meta(parsed))
    }
}
