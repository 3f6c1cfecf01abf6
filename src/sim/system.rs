use super::context::TickContext;

/// Resolution of a simulation step.
///
/// Low fidelity advances a whole year per step and records no whereabouts;
/// high fidelity advances one half-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Fidelity {
    Low,
    High,
}

/// A pluggable simulation system that runs each step.
///
/// Object-safe so systems can be stored as `Box<dyn SimSystem>`.
pub trait SimSystem {
    fn name(&self) -> &str;

    /// Whether the system takes part in steps of this fidelity.
    fn runs_at(&self, fidelity: Fidelity) -> bool;

    fn tick(&mut self, ctx: &mut TickContext);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fidelity_ordering_coarsest_to_finest() {
        assert!(Fidelity::Low < Fidelity::High);
    }
}
