//! Birthdays: schooling and the age gaps that temper relationships.

use rand::RngCore;

use super::context::TickContext;
use super::random::chance;
use super::relationships;
use super::system::{Fidelity, SimSystem};
use crate::id::PersonId;
use crate::model::World;

/// Start or finish college for anyone of age.
pub fn advance_schooling(world: &mut World, rng: &mut dyn RngCore, person: PersonId) {
    let now = world.now();
    let d = &world.config.demographics;
    let p = world.person(person);
    let age = p.age(now);
    if p.in_college && age >= d.age_people_graduate {
        let p = world.person_mut(person);
        p.in_college = false;
        p.college_graduate = true;
    } else if !p.in_college && !p.college_graduate && age == d.age_people_go_to_college {
        let odds = d.chance_goes_to_college(p.personality.conscientiousness);
        if chance(rng, odds) {
            world.person_mut(person).in_college = true;
        }
    }
}

/// Yearly birthdays for every resident.
pub struct AgingSystem;

impl SimSystem for AgingSystem {
    fn name(&self) -> &str {
        "aging"
    }

    fn runs_at(&self, fidelity: Fidelity) -> bool {
        fidelity == Fidelity::Low
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        let residents: Vec<PersonId> = ctx.world.residents.iter().copied().collect();
        for person in residents {
            advance_schooling(ctx.world, ctx.rng, person);
            relationships::refresh_modifiers(ctx.world, person);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::corpora::Corpora;
    use crate::sim::population;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::sync::Arc;

    #[test]
    fn students_graduate_at_twenty_two() {
        let mut world = World::new(Arc::new(Config::default()), Arc::new(Corpora::builtin()));
        let mut rng = SmallRng::seed_from_u64(51);
        let student = population::person_ex_nihilo(&mut world, &mut rng, None, 22);
        world.person_mut(student).in_college = true;
        advance_schooling(&mut world, &mut rng, student);
        let p = world.person(student);
        assert!(!p.in_college);
        assert!(p.college_graduate);
    }

    #[test]
    fn only_eighteen_year_olds_enroll() {
        let mut world = World::new(Arc::new(Config::default()), Arc::new(Corpora::builtin()));
        let mut rng = SmallRng::seed_from_u64(52);
        let older = population::person_ex_nihilo(&mut world, &mut rng, None, 30);
        for _ in 0..20 {
            advance_schooling(&mut world, &mut rng, older);
        }
        assert!(!world.person(older).in_college);
    }
}
