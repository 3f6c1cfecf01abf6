//! Beliefs passed between people: statements, lies, declarations and
//! eavesdropping.

use std::collections::BTreeMap;

use rand::{Rng, RngCore};

use super::{Belief, attach, base_strength, current_facet, new_facet, trust_in};
use crate::id::{EvidenceId, FacetId, PersonId};
use crate::model::{Entity, EvidenceKind, EvidenceType, FeatureType, SimTimestamp, World};
use crate::sim::random::chance;
use tracing::trace;

/// Everything said at one place and time. Saying the same thing about the
/// same subject to the same listener twice reuses one evidence item.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub location: Option<Entity>,
    pub when: SimTimestamp,
    utterances: BTreeMap<(PersonId, PersonId, Entity, EvidenceType), EvidenceId>,
}

impl Conversation {
    pub fn new(world: &World, location: Option<Entity>) -> Self {
        Self {
            location,
            when: world.now(),
            utterances: BTreeMap::new(),
        }
    }

    /// Evidence items recorded so far.
    pub fn evidence(&self) -> impl Iterator<Item = EvidenceId> + '_ {
        self.utterances.values().copied()
    }

    fn utterance(
        &mut self,
        world: &mut World,
        speaker: PersonId,
        hearer: PersonId,
        subject: Entity,
        kind: EvidenceKind,
    ) -> EvidenceId {
        let key = (speaker, hearer, subject, kind.evidence_type());
        if let Some(id) = self.utterances.get(&key) {
            return *id;
        }
        let id = world.add_evidence(kind, subject, speaker, self.location);
        self.utterances.insert(key, id);
        id
    }
}

/// Weigh a claim against the owner's current belief. Returns the facet the
/// evidence ended up backing, or `None` when the claim was dismissed as
/// weaker than what the owner already believes.
pub fn consider_new_evidence(
    world: &mut World,
    owner: PersonId,
    belief: Belief,
    evidence: EvidenceId,
    strength: f64,
    parent: Option<FacetId>,
) -> Option<FacetId> {
    match current_facet(world, owner, belief.subject, belief.feature, belief.when) {
        None => Some(new_facet(world, owner, belief, evidence, strength, None, parent)),
        Some(current) if world.facet(current).is_forgotten() => {
            Some(new_facet(world, owner, belief, evidence, strength, Some(current), parent))
        }
        Some(current) if world.facet(current).value == belief.value => {
            attach(world, current, evidence, strength);
            Some(current)
        }
        Some(current) => {
            if strength >= world.facet(current).strength {
                Some(new_facet(world, owner, belief, evidence, strength, Some(current), parent))
            } else {
                None
            }
        }
    }
}

struct Claim {
    speaker: PersonId,
    listener: PersonId,
    belief: Belief,
    teller_strength: f64,
    parent: Option<FacetId>,
    lie: bool,
}

fn propagated_strength(world: &World, kind: EvidenceType, trust: f64, teller_strength: f64) -> f64 {
    let beliefs = &world.config.beliefs;
    beliefs.base_strength(kind) * trust * beliefs.teller_strength_boost(teller_strength)
}

fn deliver(world: &mut World, rng: &mut dyn RngCore, conversation: &mut Conversation, claim: Claim) {
    let subject = claim.belief.subject;
    let kind = if claim.lie {
        EvidenceKind::Lie {
            recipient: claim.listener,
        }
    } else {
        EvidenceKind::Statement {
            recipient: claim.listener,
        }
    };
    let evidence_type = kind.evidence_type();
    let evidence = conversation.utterance(world, claim.speaker, claim.listener, subject, kind);
    let trust = trust_in(world, claim.listener, claim.speaker);
    let strength = propagated_strength(world, evidence_type, trust, claim.teller_strength);
    let outcome = consider_new_evidence(world, claim.listener, claim.belief.clone(), evidence, strength, claim.parent);
    trace!(
        speaker = %claim.speaker,
        listener = %claim.listener,
        feature = %claim.belief.feature,
        accepted = outcome.is_some(),
        "claim considered"
    );

    for eavesdropper in eavesdroppers(world, rng, conversation, claim.speaker, claim.listener) {
        let kind = EvidenceKind::Eavesdropping {
            recipient: claim.listener,
            eavesdropper,
        };
        let evidence = conversation.utterance(world, claim.speaker, eavesdropper, subject, kind);
        let trust = world.config.beliefs.trust_someone_has_for_random_person_they_eavesdrop;
        let strength = propagated_strength(world, EvidenceType::Eavesdropping, trust, claim.teller_strength);
        consider_new_evidence(world, eavesdropper, claim.belief.clone(), evidence, strength, claim.parent);
    }
}

/// Present people at the conversation's location who happen to overhear.
fn eavesdroppers(
    world: &World,
    rng: &mut dyn RngCore,
    conversation: &Conversation,
    speaker: PersonId,
    listener: PersonId,
) -> Vec<PersonId> {
    let Some(place) = conversation.location else {
        return Vec::new();
    };
    let p = world.config.beliefs.chance_someone_eavesdrops_statement;
    let bystanders: Vec<PersonId> = world
        .residents
        .iter()
        .copied()
        .filter(|id| *id != speaker && *id != listener && world.person(*id).location == Some(place))
        .collect();
    bystanders.into_iter().filter(|_| chance(rng, p)).collect()
}

/// `source` tells `recipient` what they believe about a feature of
/// `subject`. Returns false when the source has nothing to say.
#[allow(clippy::too_many_arguments)]
pub fn convey_statement(
    world: &mut World,
    rng: &mut dyn RngCore,
    conversation: &mut Conversation,
    source: PersonId,
    recipient: PersonId,
    subject: Entity,
    feature: FeatureType,
    when: Option<SimTimestamp>,
) -> bool {
    let Some(held) = current_facet(world, source, subject, feature, when) else {
        return false;
    };
    let facet = world.facet(held);
    if facet.is_forgotten() {
        return false;
    }
    let belief = Belief {
        subject,
        feature,
        when,
        value: facet.value.clone(),
        object: facet.object_itself,
    };
    let teller_strength = facet.strength;

    let declaration = conversation.utterance(
        world,
        source,
        recipient,
        subject,
        EvidenceKind::Declaration { recipient },
    );
    let declared = base_strength(world, &EvidenceKind::Declaration { recipient });
    attach(world, held, declaration, declared);

    deliver(
        world,
        rng,
        conversation,
        Claim {
            speaker: source,
            listener: recipient,
            belief,
            teller_strength,
            parent: Some(held),
            lie: false,
        },
    );
    true
}

/// `source` tells `recipient` something they do not believe. How convincing
/// the liar is stands in for the strength of a real belief.
#[allow(clippy::too_many_arguments)]
pub fn tell_lie(
    world: &mut World,
    rng: &mut dyn RngCore,
    conversation: &mut Conversation,
    source: PersonId,
    recipient: PersonId,
    subject: Entity,
    feature: FeatureType,
    when: Option<SimTimestamp>,
    value: String,
) {
    let max = world.config.beliefs.lie_teller_strength_max.max(1);
    let teller_strength = f64::from(rng.random_range(1..=max));
    let belief = Belief {
        subject,
        feature,
        when,
        value,
        object: None,
    };
    deliver(
        world,
        rng,
        conversation,
        Claim {
            speaker: source,
            listener: recipient,
            belief,
            teller_strength,
            parent: None,
            lie: true,
        },
    );
}
