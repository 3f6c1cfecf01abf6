use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::id::{EvidenceId, FacetId, PersonId};
use crate::model::entity::Entity;
use crate::model::timestamp::SimTimestamp;

/// Fieldless evidence tag; keys the base-strength table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum EvidenceType {
    Reflection,
    Observation,
    Statement,
    Lie,
    Eavesdropping,
    Declaration,
    Confabulation,
    Mutation,
    Transference,
    Forgetting,
    Implant,
}

string_enum!(EvidenceType {
    Reflection => "reflection",
    Observation => "observation",
    Statement => "statement",
    Lie => "lie",
    Eavesdropping => "eavesdropping",
    Declaration => "declaration",
    Confabulation => "confabulation",
    Mutation => "mutation",
    Transference => "transference",
    Forgetting => "forgetting",
    Implant => "implant",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EvidenceKind {
    /// The subject observing itself.
    Reflection,
    /// Perceiving a co-located person or the building one is in.
    Observation,
    Statement { recipient: PersonId },
    /// A statement the source believes to be false.
    Lie { recipient: PersonId },
    /// An overheard statement or lie.
    Eavesdropping {
        recipient: PersonId,
        eavesdropper: PersonId,
    },
    /// The source reinforcing its own belief by uttering it.
    Declaration { recipient: PersonId },
    Confabulation,
    Mutation { mutated_from: String },
    Transference { transferred_from: FacetId },
    Forgetting,
    /// Knowledge seeded at the start of high-fidelity simulation.
    Implant,
}

impl EvidenceKind {
    pub fn evidence_type(&self) -> EvidenceType {
        match self {
            EvidenceKind::Reflection => EvidenceType::Reflection,
            EvidenceKind::Observation => EvidenceType::Observation,
            EvidenceKind::Statement { .. } => EvidenceType::Statement,
            EvidenceKind::Lie { .. } => EvidenceType::Lie,
            EvidenceKind::Eavesdropping { .. } => EvidenceType::Eavesdropping,
            EvidenceKind::Declaration { .. } => EvidenceType::Declaration,
            EvidenceKind::Confabulation => EvidenceType::Confabulation,
            EvidenceKind::Mutation { .. } => EvidenceType::Mutation,
            EvidenceKind::Transference { .. } => EvidenceType::Transference,
            EvidenceKind::Forgetting => EvidenceType::Forgetting,
            EvidenceKind::Implant => EvidenceType::Implant,
        }
    }

    /// Statements, lies and eavesdroppings move beliefs between minds.
    pub fn is_propagation(&self) -> bool {
        matches!(
            self,
            EvidenceKind::Statement { .. } | EvidenceKind::Lie { .. } | EvidenceKind::Eavesdropping { .. }
        )
    }
}

/// A first-class provenance record backing one or more facets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub id: EvidenceId,
    /// Shared with events; totally orders everything that happened at one timestamp.
    pub number: u64,
    pub kind: EvidenceKind,
    pub subject: Entity,
    /// Observer, speaker, or the owner for endogenous kinds.
    pub source: PersonId,
    pub location: Option<Entity>,
    pub timestamp: SimTimestamp,
    pub beliefs_evidenced: BTreeSet<FacetId>,
}

impl Evidence {
    pub fn evidence_type(&self) -> EvidenceType {
        self.kind.evidence_type()
    }
}
