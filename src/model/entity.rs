use serde::{Deserialize, Serialize};

use crate::id::{BuildingId, PersonId};

/// Anything a person can stand in, hold a mental model of, or be told about.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Entity {
    Person(PersonId),
    Dwelling(BuildingId),
    Business(BuildingId),
}

impl Entity {
    pub fn as_person(self) -> Option<PersonId> {
        match self {
            Entity::Person(id) => Some(id),
            Entity::Dwelling(_) | Entity::Business(_) => None,
        }
    }

    pub fn as_building(self) -> Option<BuildingId> {
        match self {
            Entity::Person(_) => None,
            Entity::Dwelling(id) | Entity::Business(id) => Some(id),
        }
    }

    pub fn is_place(self) -> bool {
        self.as_building().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_shape() {
        let value = serde_json::to_value(Entity::Business(BuildingId(12))).unwrap();
        assert_eq!(value["kind"], "business");
        assert_eq!(value["id"], 12);
    }

    #[test]
    fn accessors() {
        assert_eq!(Entity::Person(PersonId(3)).as_person(), Some(PersonId(3)));
        assert_eq!(Entity::Dwelling(BuildingId(4)).as_building(), Some(BuildingId(4)));
        assert!(!Entity::Person(PersonId(3)).is_place());
    }
}
