use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use tracing::{error, info};

use super::aging::AgingSystem;
use super::beliefs::{self, BeliefSystem};
use super::context::TickContext;
use super::founding;
use super::invariants;
use super::life::LifeEventsSystem;
use super::relationships::RelationshipSystem;
use super::routine::RoutineSystem;
use super::system::{Fidelity, SimSystem};
use crate::config::Config;
use crate::corpora::Corpora;
use crate::error::{Result, SimError};
use crate::model::{SimTimestamp, World};
use crate::worldgen::plat_town;

/// Requests that world generation stop at the next step boundary. Clones
/// share the same flag, so one can be handed to another thread.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The systems of a full simulation, in the order they run each step:
/// birthdays, whereabouts, life events, relationships, beliefs.
pub fn default_systems() -> Vec<Box<dyn SimSystem>> {
    vec![
        Box::new(AgingSystem),
        Box::new(RoutineSystem),
        Box::new(LifeEventsSystem),
        Box::new(RelationshipSystem),
        Box::new(BeliefSystem),
    ]
}

/// Run every system that takes part at `fidelity`, in registration order.
/// Occasions gathered by earlier systems are visible to later ones and
/// discarded at the end of the step.
pub fn dispatch_systems(
    world: &mut World,
    systems: &mut [Box<dyn SimSystem>],
    rng: &mut dyn RngCore,
    fidelity: Fidelity,
    missing_days: u32,
) {
    let mut occasions = Vec::new();
    for system in systems.iter_mut() {
        if system.runs_at(fidelity) {
            let mut ctx = TickContext {
                world,
                rng,
                fidelity,
                missing_days,
                occasions: &mut occasions,
            };
            system.tick(&mut ctx);
        }
    }
}

/// A world plus everything needed to advance it deterministically.
pub struct Simulation {
    pub world: World,
    rng: SmallRng,
    systems: Vec<Box<dyn SimSystem>>,
    abort: AbortHandle,
}

impl Simulation {
    /// Validate the config, plat the town and found it. No time passes.
    pub fn new(config: Config, seed: u64) -> Result<Self> {
        config.validate()?;
        let corpora = Corpora::load(&config.corpora)?;
        let config = Arc::new(config);
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut world = World::new(config.clone(), Arc::new(corpora));
        world.town = plat_town(&config.world_gen, &world.corpora, &mut rng);
        invariants::check_layout(&world.town).map_err(|detail| violation(&world, detail))?;
        founding::found_town(&mut world, &mut rng);

        let sim = Self::with_systems(world, rng, default_systems());
        sim.check()?;
        Ok(sim)
    }

    pub fn with_systems(world: World, rng: SmallRng, systems: Vec<Box<dyn SimSystem>>) -> Self {
        Self {
            world,
            rng,
            systems,
            abort: AbortHandle::default(),
        }
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    pub fn rng(&mut self) -> &mut dyn RngCore {
        &mut self.rng
    }

    fn check(&self) -> Result<()> {
        invariants::check_world(&self.world).map_err(|detail| violation(&self.world, detail))
    }

    /// One low-fidelity step: a year passes.
    pub fn step(&mut self) -> Result<()> {
        let next = self.world.current_time.year() + 1;
        self.world.current_time = SimTimestamp::from_year(next);
        dispatch_systems(&mut self.world, &mut self.systems, &mut self.rng, Fidelity::Low, 1);
        self.check()
    }

    /// One high-fidelity step: the next half-day. Before the first one,
    /// people are given what they already know about those closest to them.
    pub fn step_high_fidelity(&mut self) -> Result<()> {
        self.enter_high_fidelity();
        self.world.current_time = self.world.current_time.next_phase();
        dispatch_systems(&mut self.world, &mut self.systems, &mut self.rng, Fidelity::High, 1);
        self.check()
    }

    /// Jump ahead `days` days and run one high-fidelity step standing in for
    /// all of them; relationships progress and memories decay accordingly.
    pub fn skip_days(&mut self, days: u32) -> Result<()> {
        self.enter_high_fidelity();
        let now = self.world.current_time;
        self.world.current_time = SimTimestamp::from_ordinal(now.ordinal_date() + days.max(1), now.phase());
        dispatch_systems(&mut self.world, &mut self.systems, &mut self.rng, Fidelity::High, days.max(1));
        self.check()
    }

    fn enter_high_fidelity(&mut self) {
        if !self.world.high_fidelity {
            self.world.high_fidelity = true;
            beliefs::implant_knowledge(&mut self.world);
            info!(date = %self.world.current_time, "high-fidelity simulation begins");
        }
    }

    /// Yearly steps until the configured end of world generation, then the
    /// configured days of half-day steps. An abort stops cleanly between
    /// steps and leaves a consistent world.
    pub fn run_to_gameplay(&mut self) -> Result<()> {
        let time = self.world.config.time.clone();
        while self.world.current_time.year() < time.year_worldgen_ends {
            if self.aborted() {
                return Ok(());
            }
            self.step()?;
        }
        for _ in 0..time.high_fidelity_days * 2 {
            if self.aborted() {
                return Ok(());
            }
            self.step_high_fidelity()?;
        }
        info!(
            date = %self.world.current_time,
            residents = self.world.residents.len(),
            businesses = self.world.businesses.len(),
            "gameplay window reached"
        );
        Ok(())
    }

    fn aborted(&self) -> bool {
        let aborted = self.abort.is_aborted();
        if aborted {
            info!(date = %self.world.current_time, "generation aborted");
        }
        aborted
    }
}

fn violation(world: &World, detail: String) -> SimError {
    error!(date = %world.current_time, detail = %detail, "invariant violated");
    SimError::InvariantViolated {
        step: world.current_time,
        detail,
    }
}

/// Generate a town from its founding through the start of gameplay.
pub fn generate_world(config: Config, seed: u64) -> Result<Simulation> {
    let mut sim = Simulation::new(config, seed)?;
    sim.run_to_gameplay()?;
    Ok(sim)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    struct LoggingSystem {
        name: &'static str,
        fidelity: Option<Fidelity>,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl SimSystem for LoggingSystem {
        fn name(&self) -> &str {
            self.name
        }

        fn runs_at(&self, fidelity: Fidelity) -> bool {
            self.fidelity.is_none_or(|f| f == fidelity)
        }

        fn tick(&mut self, ctx: &mut TickContext) {
            self.log
                .borrow_mut()
                .push(format!("{}@{}x{}", self.name, ctx.world.current_time, ctx.missing_days));
        }
    }

    fn logging_sim(log: &Rc<RefCell<Vec<String>>>) -> Simulation {
        let world = World::new(Arc::new(Config::default()), Arc::new(Corpora::builtin()));
        let systems: Vec<Box<dyn SimSystem>> = vec![
            Box::new(LoggingSystem {
                name: "a",
                fidelity: None,
                log: log.clone(),
            }),
            Box::new(LoggingSystem {
                name: "low",
                fidelity: Some(Fidelity::Low),
                log: log.clone(),
            }),
        ];
        Simulation::with_systems(world, SmallRng::seed_from_u64(0), systems)
    }

    #[test]
    fn systems_run_in_order_and_by_fidelity() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut sim = logging_sim(&log);
        let start = sim.world.current_time.year();
        sim.step().unwrap();
        sim.step_high_fidelity().unwrap();
        let log = log.borrow();
        assert_eq!(log.len(), 3);
        assert!(log[0].starts_with("a@"));
        assert!(log[1].starts_with("low@"));
        assert!(log[2].starts_with("a@"));
        assert_eq!(sim.world.current_time.year(), start + 1);
        assert!(sim.world.high_fidelity);
    }

    #[test]
    fn skipping_days_scales_the_step() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut sim = logging_sim(&log);
        let before = sim.world.current_time.ordinal_date();
        sim.skip_days(7).unwrap();
        assert_eq!(sim.world.current_time.ordinal_date(), before + 7);
        assert!(log.borrow()[0].ends_with("x7"));
    }

    #[test]
    fn abort_stops_before_the_next_step() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut sim = logging_sim(&log);
        sim.abort_handle().abort();
        sim.run_to_gameplay().unwrap();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn invalid_config_never_starts() {
        let mut config = Config::default();
        config.beliefs.chance_someone_eavesdrops_statement = 2.0;
        assert!(matches!(Simulation::new(config, 0), Err(SimError::Config(_))));
    }
}
