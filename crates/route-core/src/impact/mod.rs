mod enhancer;
mod gene;

pub use enhancer::EnhancerSequenceImpactCalculator;
pub use gene::GeneSequenceImpactCalculator;

use crate::projection::Projection;

/// Scores how much of an element's function survives on a route.
pub trait SequenceImpactCalculator<T>: Send + Sync {
    /// Fitness of the projected element, at most `no_impact()`.
    fn project_impact(&self, projection: &Projection<'_, T>) -> f64;

    /// Fitness of an undisturbed element.
    fn no_impact(&self) -> f64;
}
