use serde::{Deserialize, Serialize};

use crate::id::PersonId;
use crate::model::entity::Entity;
use crate::model::timestamp::SimTimestamp;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum RelationshipKind {
    Acquaintance,
    Friendship,
    Enmity,
    Kinship,
    Romance,
}

string_enum!(RelationshipKind {
    Acquaintance => "acquaintance",
    Friendship => "friendship",
    Enmity => "enmity",
    Kinship => "kinship",
    Romance => "romance",
});

/// A directed social tie, owned by `owner`. The mirror direction is a
/// separate record owned by `subject`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub owner: PersonId,
    pub subject: PersonId,
    pub kind: RelationshipKind,
    /// Earlier kinds this relationship passed through, with when it left them.
    pub preceded_by: Vec<(RelationshipKind, SimTimestamp)>,
    pub where_met: Option<Entity>,
    pub when_met: SimTimestamp,
    pub where_last_met: Option<Entity>,
    pub when_last_met: SimTimestamp,
    pub total_interactions: u32,
    pub compatibility: f64,
    pub charge: f64,
    pub charge_increment: f64,
    pub spark: f64,
    pub spark_increment: f64,
    pub trust: f64,
    pub age_gap_modifier: f64,
    pub job_level_gap_modifier: f64,
    pub interacted_this_timestep: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_strings() {
        assert_eq!(RelationshipKind::Enmity.as_str(), "enmity");
        assert_eq!("romance".parse::<RelationshipKind>(), Ok(RelationshipKind::Romance));
        assert_eq!(RelationshipKind::ALL.len(), 5);
    }
}
