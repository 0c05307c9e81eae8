//! Active-student classification
//!
//! Rules are evaluated in order and the first one with evidence decides:
//!
//! 1. a student-typed affiliation: allowed unless its status is inactive
//! 2. an affiliation carrying a course or campus: allowed unless inactive
//! 3. no recognizable evidence: governed by [`ClassificationPolicy`]
//!
//! Only the provider's `vinculo` field and the top-level `tipo_vinculo` count
//! as evidence. An explicit inactive status is final; the fallback rule never
//! overrides it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::normalize::{normalize, Affiliation, NormalizedProfile};
use crate::utils::text::contains_any;

const STUDENT_MARKERS: &[&str] = &["aluno", "estudante", "student"];

const INACTIVE_MARKERS: &[&str] = &[
    "inativo",
    "cancelado",
    "trancado",
    "desligado",
    "concluído",
    "concluido",
];

/// How to treat callers whose affiliation data could not be classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationPolicy {
    /// Admit callers with unrecognized affiliation data. Provider schema
    /// changes must not lock out real students, so this defaults to `true`.
    pub allow_unrecognized: bool,
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self {
            allow_unrecognized: true,
        }
    }
}

/// Which rule produced the decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecidingRule {
    StudentAffiliation,
    Placement,
    Unrecognized,
}

impl DecidingRule {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DecidingRule::StudentAffiliation => "student affiliation",
            DecidingRule::Placement => "course/campus affiliation",
            DecidingRule::Unrecognized => "unrecognized affiliation",
        }
    }
}

/// Decision plus the rule that made it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub is_student: bool,
    pub rule: DecidingRule,
}

/// Whether the profile belongs to an active student
#[must_use]
pub fn classify(profile: &NormalizedProfile, policy: &ClassificationPolicy) -> bool {
    explain(profile, policy).is_student
}

/// Classify a raw provider profile under the default policy
#[must_use]
pub fn classify_raw(raw: &Value) -> bool {
    classify(&normalize(raw), &ClassificationPolicy::default())
}

/// Classify and report the deciding rule
#[must_use]
pub fn explain(profile: &NormalizedProfile, policy: &ClassificationPolicy) -> Classification {
    let entries = profile.affiliation.entries();
    let top_level_type = profile.affiliation_type.as_deref();

    if let Some(is_student) = student_affiliation_rule(entries, top_level_type) {
        return Classification {
            is_student,
            rule: DecidingRule::StudentAffiliation,
        };
    }

    if let Some(is_student) = placement_rule(entries) {
        return Classification {
            is_student,
            rule: DecidingRule::Placement,
        };
    }

    Classification {
        is_student: policy.allow_unrecognized,
        rule: DecidingRule::Unrecognized,
    }
}

fn student_affiliation_rule(entries: &[Affiliation], top_level_type: Option<&str>) -> Option<bool> {
    let top_level_student = top_level_type.is_some_and(is_student_type);

    if entries.is_empty() {
        return top_level_student.then_some(true);
    }

    combine(
        entries
            .iter()
            .filter(|entry| entry.kind.as_deref().or(top_level_type).is_some_and(is_student_type))
            .map(|entry| !is_inactive(entry.status.as_deref())),
    )
}

fn placement_rule(entries: &[Affiliation]) -> Option<bool> {
    combine(
        entries
            .iter()
            .filter(|entry| entry.has_placement)
            .map(|entry| !is_inactive(entry.status.as_deref())),
    )
}

/// Any allowing entry wins; `None` when no entry had evidence
fn combine(verdicts: impl Iterator<Item = bool>) -> Option<bool> {
    verdicts.fold(None, |acc, allowed| Some(acc.unwrap_or(false) || allowed))
}

fn is_student_type(kind: &str) -> bool {
    contains_any(kind, STUDENT_MARKERS)
}

fn is_inactive(status: Option<&str>) -> bool {
    status.is_some_and(|s| contains_any(s, INACTIVE_MARKERS))
}
