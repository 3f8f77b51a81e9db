// ABOUTME: Ordered prompt-injection rule table and structural neutralizers
// ABOUTME: Declares regex patterns grouped into five attack families
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use regex::Regex;
use std::sync::LazyLock;

/// Replacement marker for filtered pattern matches.
///
/// Single brackets on purpose: the marker itself matches none of the rules
/// below, so re-sanitizing already-filtered text is a no-op.
pub const FILTERED_MARKER: &str = "[FILTERED]";

/// Attack family a detection rule belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternCategory {
    /// Attempts to cancel or replace earlier instructions
    InstructionOverride,
    /// Attempts to reassign the assistant's role or persona
    RoleHijack,
    /// Attempts to force a specific output shape or phrase
    OutputManipulation,
    /// Attempts to extract the system prompt or hidden instructions
    PromptExtraction,
    /// Attempts to smuggle conversation-structure delimiters into user data
    DelimiterInjection,
}

impl PatternCategory {
    /// Stable label for logs and reports
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InstructionOverride => "instruction_override",
            Self::RoleHijack => "role_hijack",
            Self::OutputManipulation => "output_manipulation",
            Self::PromptExtraction => "prompt_extraction",
            Self::DelimiterInjection => "delimiter_injection",
        }
    }
}

/// One compiled entry of the injection rule table
#[derive(Debug)]
pub struct InjectionRule {
    /// Attack family this rule detects
    pub category: PatternCategory,
    /// Compiled case-insensitive pattern
    pub pattern: Regex,
}

// ============================================================================
// Rule Table
// ============================================================================

/// Source table for the injection rules; rules apply top to bottom
const RULE_PATTERNS: &[(PatternCategory, &str)] = &[
    // Instruction override
    (
        PatternCategory::InstructionOverride,
        r"(?i)ignore\s+(all\s+)?(previous|prior|above|earlier)\s+(instructions?|prompts?|rules?)",
    ),
    (
        PatternCategory::InstructionOverride,
        r"(?i)ignore\s+(your\s+)?(previous\s+)?instructions",
    ),
    (
        PatternCategory::InstructionOverride,
        r"(?i)disregard\s+(all\s+)?(previous|prior|above|earlier)",
    ),
    (
        PatternCategory::InstructionOverride,
        r"(?i)forget\s+(everything|all|what)",
    ),
    (PatternCategory::InstructionOverride, r"(?i)new\s+instructions?:"),
    (
        PatternCategory::InstructionOverride,
        r"(?i)override\s+(instructions?|rules?|system)",
    ),
    // Role hijack
    (
        PatternCategory::RoleHijack,
        r"(?i)you\s+are\s+(now|actually|really)\s+(a|an)",
    ),
    (PatternCategory::RoleHijack, r"(?i)act\s+as\s+(a|an|if)"),
    (
        PatternCategory::RoleHijack,
        r"(?i)pretend\s+(to\s+be|you('re| are))",
    ),
    (
        PatternCategory::RoleHijack,
        r"(?i)role\s*:\s*(system|assistant|user)",
    ),
    (PatternCategory::RoleHijack, r"(?i)\[system\]"),
    (PatternCategory::RoleHijack, r"(?i)\[assistant\]"),
    // Output manipulation
    (
        PatternCategory::OutputManipulation,
        r"(?i)respond\s+(only\s+)?with\s+(json|xml|code|the\s+following|exactly|the\s+word|only)",
    ),
    (
        PatternCategory::OutputManipulation,
        r"(?i)output\s+(only\s+)?the\s+following",
    ),
    (
        PatternCategory::OutputManipulation,
        r"(?i)say\s+(exactly|only)\s+(this|what|the)",
    ),
    // Prompt extraction
    (
        PatternCategory::PromptExtraction,
        r"(?i)print\s+(your|the)\s+(system|prompt|instructions)",
    ),
    (
        PatternCategory::PromptExtraction,
        r"(?i)what('s| is| are)\s+(your|the)\s+(system\s+)?prompt",
    ),
    (
        PatternCategory::PromptExtraction,
        r"(?i)show\s+(me\s+)?(your|the)\s+(system\s+)?(prompt|instructions)",
    ),
    (
        PatternCategory::PromptExtraction,
        r"(?i)reveal\s+(your|the)\s+(system|instructions|prompt)",
    ),
    (
        PatternCategory::PromptExtraction,
        r"(?i)repeat\s+(your|the)\s+(system|instructions|prompt)",
    ),
    // Delimiter injection
    (
        PatternCategory::DelimiterInjection,
        r"(?i)```\s*(system|assistant|user)",
    ),
    (
        PatternCategory::DelimiterInjection,
        r"(?i)<\|?(system|im_start|im_end)\|?>",
    ),
    (PatternCategory::DelimiterInjection, r"(?i)\[\[.*\]\]"),
    (
        PatternCategory::DelimiterInjection,
        r#"(?i)"role"\s*:\s*"(system|assistant)""#,
    ),
    (
        PatternCategory::DelimiterInjection,
        r#"(?i)"content"\s*:\s*""#,
    ),
];

/// Compiled rule table, preserving source order
/// Failed compilations are dropped (should never happen for static patterns)
pub static INJECTION_RULES: LazyLock<Vec<InjectionRule>> = LazyLock::new(|| {
    RULE_PATTERNS
        .iter()
        .filter_map(|&(category, pattern)| {
            Regex::new(pattern).ok().map(|compiled| InjectionRule {
                category,
                pattern: compiled,
            })
        })
        .collect()
});

/// Phrases checked as substrings of the lowercased original input
///
/// Two or more distinct hits raise the risk assessment to medium even when
/// no rule in the table matched.
pub const SUSPICIOUS_PHRASES: &[&str] = &[
    "ignore",
    "disregard",
    "forget",
    "override",
    "bypass",
    "jailbreak",
    "dan mode",
    "developer mode",
    "sudo",
    "admin",
    "root access",
];

// ============================================================================
// Structural Neutralizers
// ============================================================================

/// Code fences that open a conversation-role or JSON block
/// Stored as Option to handle compilation failures gracefully (should never fail for static patterns)
static FENCE_NEUTRALIZER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)```(system|assistant|user|json)").ok());

/// Angle-bracket openings of role-like tags
static TAG_NEUTRALIZER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)<(system|assistant|user|prompt|instruction)").ok());

/// Quoted message-structure keys immediately followed by a colon
static KEY_NEUTRALIZER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"(?i)"(role|content|system|assistant)"\s*:"#).ok());

/// Break up structural tokens that could be parsed as conversation markup.
///
/// Unlike the rule table, neutralization rewrites every occurrence and never
/// flags anything. The rewritten forms no longer match their own patterns,
/// so repeated application leaves the text unchanged.
#[must_use]
pub fn neutralize_structure(input: &str) -> String {
    let mut output = input.to_owned();
    if let Some(pattern) = FENCE_NEUTRALIZER.as_ref() {
        output = pattern.replace_all(&output, "``` $1").into_owned();
    }
    if let Some(pattern) = TAG_NEUTRALIZER.as_ref() {
        output = pattern.replace_all(&output, "&lt;$1").into_owned();
    }
    if let Some(pattern) = KEY_NEUTRALIZER.as_ref() {
        output = pattern.replace_all(&output, "\"$1\" :").into_owned();
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rules_compile() {
        assert_eq!(INJECTION_RULES.len(), RULE_PATTERNS.len());
    }

    #[test]
    fn test_rule_table_order_matches_source() {
        for (rule, &(category, _)) in INJECTION_RULES.iter().zip(RULE_PATTERNS.iter()) {
            assert_eq!(rule.category, category);
        }
    }

    #[test]
    fn test_filtered_marker_matches_no_rule() {
        for rule in INJECTION_RULES.iter() {
            assert!(
                !rule.pattern.is_match(FILTERED_MARKER),
                "{} matched the filtered marker",
                rule.pattern.as_str()
            );
        }
    }

    #[test]
    fn test_category_families_present() {
        let count = |category: PatternCategory| {
            INJECTION_RULES
                .iter()
                .filter(|r| r.category == category)
                .count()
        };
        assert_eq!(count(PatternCategory::InstructionOverride), 6);
        assert_eq!(count(PatternCategory::RoleHijack), 6);
        assert_eq!(count(PatternCategory::OutputManipulation), 3);
        assert_eq!(count(PatternCategory::PromptExtraction), 5);
        assert_eq!(count(PatternCategory::DelimiterInjection), 5);
    }

    #[test]
    fn test_neutralize_fence_and_tag() {
        assert_eq!(neutralize_structure("```system"), "``` system");
        assert_eq!(neutralize_structure("<instruction>"), "&lt;instruction>");
        assert_eq!(neutralize_structure("\"role\": \"user\""), "\"role\" : \"user\"");
    }

    #[test]
    fn test_neutralize_is_stable() {
        let once = neutralize_structure("```json {\"content\": 1}");
        let twice = neutralize_structure(&once);
        assert_eq!(once, twice);
    }
}
