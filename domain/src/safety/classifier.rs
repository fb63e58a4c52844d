//! SAFE / NON-SAFE classification of a user intent.
//!
//! The classifier is a pure rule cascade; the first matching rule wins:
//!
//! | # | Condition | Result |
//! |---|-----------|--------|
//! | 1 | project state is DEBT | NON-SAFE, validation required |
//! | 2 | intent contains a structural keyword | NON-SAFE, validation required |
//! | 3 | intent contains a simple-action phrase | SAFE |
//! | 4 | project state is NEW | SAFE |
//! | 5 | anything else | NON-SAFE, validation required |
//!
//! Matching is a case-insensitive substring search. A simple-action phrase
//! never overrides a structural keyword found in the same intent.

use crate::session::state::{Phase, ProjectState};
use serde::{Deserialize, Serialize};

/// Keywords that mark an intent as structural (NON-SAFE).
pub const DEFAULT_NON_SAFE_KEYWORDS: &[&str] = &[
    "delete",
    "refactor",
    "rename",
    "move",
    "modify structure",
    "change architecture",
    "migration",
    "database",
    "security",
    "authentication",
];

/// Phrases that mark an intent as a simple action (SAFE).
pub const DEFAULT_SAFE_PHRASES: &[&str] = &[
    "create simple file",
    "add function",
    "add class",
    "add test",
    "fix typo",
    "add docstring",
    "format code",
];

/// Why an intent was classified the way it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "matched", rename_all = "snake_case")]
pub enum SafetyReason {
    /// The project carries technical debt.
    TechnicalDebt,
    /// A structural keyword was found in the intent.
    StructuralKeyword(String),
    /// A simple-action phrase was found in the intent.
    SimpleAction(String),
    /// Initial creation in a new project.
    NewProject,
    /// Nothing matched; precautionary default.
    Ambiguous,
}

impl SafetyReason {
    /// Structural and ambiguous intents get the clarification challenge.
    pub fn needs_clarification(&self) -> bool {
        matches!(
            self,
            SafetyReason::StructuralKeyword(_) | SafetyReason::Ambiguous
        )
    }
}

impl std::fmt::Display for SafetyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SafetyReason::TechnicalDebt => write!(f, "Project with detected technical debt"),
            SafetyReason::StructuralKeyword(kw) => write!(f, "Structural action detected: {}", kw),
            SafetyReason::SimpleAction(phrase) => write!(f, "Simple action detected: {}", phrase),
            SafetyReason::NewProject => write!(f, "New project, initial creation"),
            SafetyReason::Ambiguous => write!(f, "Ambiguous action, clarification needed"),
        }
    }
}

/// Outcome of classifying one intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub is_safe: bool,
    pub reason: SafetyReason,
    pub requires_validation: bool,
}

impl Classification {
    fn safe(reason: SafetyReason) -> Self {
        Self {
            is_safe: true,
            reason,
            requires_validation: false,
        }
    }

    fn non_safe(reason: SafetyReason) -> Self {
        Self {
            is_safe: false,
            reason,
            requires_validation: true,
        }
    }

    /// Whether this classification pauses the orchestration.
    pub fn blocks(&self) -> bool {
        !self.is_safe && self.requires_validation
    }
}

/// Keyword and phrase lists consulted by the classifier.
///
/// Entries are stored lowercase. Additions extend the defaults; defaults are
/// never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyRules {
    non_safe_keywords: Vec<String>,
    safe_phrases: Vec<String>,
}

impl Default for SafetyRules {
    fn default() -> Self {
        Self {
            non_safe_keywords: DEFAULT_NON_SAFE_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            safe_phrases: DEFAULT_SAFE_PHRASES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SafetyRules {
    pub fn with_extra_non_safe_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        extend_unique(&mut self.non_safe_keywords, keywords);
        self
    }

    pub fn with_extra_safe_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        extend_unique(&mut self.safe_phrases, phrases);
        self
    }

    pub fn non_safe_keywords(&self) -> &[String] {
        &self.non_safe_keywords
    }

    pub fn safe_phrases(&self) -> &[String] {
        &self.safe_phrases
    }
}

fn extend_unique<I, S>(target: &mut Vec<String>, items: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for item in items {
        let item = item.as_ref().trim().to_lowercase();
        if !item.is_empty() && !target.contains(&item) {
            target.push(item);
        }
    }
}

/// Pure classifier over a set of [`SafetyRules`].
#[derive(Debug, Clone, Default)]
pub struct SafetyClassifier {
    rules: SafetyRules,
}

impl SafetyClassifier {
    pub fn new(rules: SafetyRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &SafetyRules {
        &self.rules
    }

    /// Classify an intent against the project state.
    ///
    /// The phase is accepted for completeness of the gate's inputs; no rule
    /// of the cascade depends on it.
    pub fn classify(&self, intent: &str, project_state: ProjectState, _phase: Phase) -> Classification {
        if project_state == ProjectState::Debt {
            return Classification::non_safe(SafetyReason::TechnicalDebt);
        }

        let intent = intent.to_lowercase();

        if let Some(kw) = self
            .rules
            .non_safe_keywords
            .iter()
            .find(|kw| intent.contains(kw.as_str()))
        {
            return Classification::non_safe(SafetyReason::StructuralKeyword(kw.clone()));
        }

        if let Some(phrase) = self
            .rules
            .safe_phrases
            .iter()
            .find(|p| intent.contains(p.as_str()))
        {
            return Classification::safe(SafetyReason::SimpleAction(phrase.clone()));
        }

        if project_state == ProjectState::New {
            return Classification::safe(SafetyReason::NewProject);
        }

        Classification::non_safe(SafetyReason::Ambiguous)
    }
}
