use crate::{
    annotations::Annotations,
    dispatch::{Dispatcher, DispatcherType, GeneDispatcher, TadAwareDispatcher},
    error::SvError,
    evaluator::{GranularRouteResult, RouteDataEvaluator, RouteResult},
    impact::{EnhancerSequenceImpactCalculator, GeneSequenceImpactCalculator},
    relevance::{ConstantEnhancerRelevance, ConstantGeneWeight},
    route_data::RouteDataService,
    settings::PrioritizationSettings,
    variant::SvVariant,
};
use log::{debug, trace, warn};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of prioritizing one variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SvPriority {
    Known(GranularRouteResult),

    /// The variant could not be dispatched or evaluated.
    Unknown,
}

impl SvPriority {
    pub fn priority(&self) -> Option<f64> {
        match self {
            SvPriority::Known(result) => Some(result.priority()),
            SvPriority::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, SvPriority::Unknown)
    }
}

/// Dispatch, collect route data, evaluate.
pub struct SvPrioritizer {
    dispatcher: Box<dyn Dispatcher>,
    route_data_service: RouteDataService,
    evaluator: RouteDataEvaluator,
}

impl SvPrioritizer {
    pub fn new(
        dispatcher: Box<dyn Dispatcher>,
        route_data_service: RouteDataService,
        evaluator: RouteDataEvaluator,
    ) -> Self {
        Self {
            dispatcher,
            route_data_service,
            evaluator,
        }
    }

    /// Prioritizer with the constant gene weights and enhancer relevances.
    pub fn from_settings(annotations: Arc<Annotations>, settings: &PrioritizationSettings) -> Self {
        let dispatcher: Box<dyn Dispatcher> = match settings.dispatcher {
            DispatcherType::Gene => Box::new(GeneDispatcher::new(
                annotations.clone(),
                settings.gene_padding,
            )),
            DispatcherType::Tad => Box::new(TadAwareDispatcher::new(
                annotations.clone(),
                settings.gene_padding,
            )),
        };

        let evaluator = RouteDataEvaluator::new(
            Box::new(GeneSequenceImpactCalculator::new(
                settings.gene_factor,
                settings.promoter_length,
                settings.promoter_fitness_gain,
            )),
            Box::new(ConstantGeneWeight::default()),
            Box::new(EnhancerSequenceImpactCalculator::new(settings.enhancer_factor)),
            Box::new(ConstantEnhancerRelevance::default()),
        )
        .with_tad_awareness(settings.tad_aware_evaluation);

        Self::new(dispatcher, RouteDataService::new(annotations), evaluator)
    }

    /// Never fails. Variants that cannot be evaluated get `SvPriority::Unknown`.
    pub fn prioritize(&self, variant: &SvVariant) -> SvPriority {
        match self.try_prioritize(std::slice::from_ref(variant)) {
            Ok(result) => SvPriority::Known(result),
            Err(e) => {
                match &e {
                    SvError::DegenerateBreakendError(_) => trace!("{}: {}", variant.id, e),
                    SvError::DispatchError(_) => debug!("{}: {}", variant.id, e),
                    _ => warn!("Error while prioritizing {}: {}", variant.id, e),
                }
                SvPriority::Unknown
            }
        }
    }

    /// Evaluate a breakend pair or a sorted run of same-contig variants as one rearrangement.
    pub fn try_prioritize(&self, variants: &[SvVariant]) -> Result<GranularRouteResult, SvError> {
        let routes = self.dispatcher.assemble(variants)?;
        let data = self.route_data_service.get_data(routes)?;
        self.evaluator.evaluate(&data)
    }
}
