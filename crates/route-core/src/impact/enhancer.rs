use super::SequenceImpactCalculator;
use crate::{
    feature::Enhancer,
    intervals::{Coordinates, GenomeInterval},
    projection::Projection,
    route::Event,
};
use log::warn;

#[derive(Debug, Clone)]
pub struct EnhancerSequenceImpactCalculator {
    enhancer_factor: f64,
}

impl EnhancerSequenceImpactCalculator {
    pub fn new(enhancer_factor: f64) -> Self {
        Self { enhancer_factor }
    }

    fn event_fitness(&self, event: Event) -> f64 {
        match event {
            Event::Gap => self.enhancer_factor,
            Event::Snv => 0.85 * self.enhancer_factor,
            Event::Duplication | Event::Insertion => 0.2 * self.enhancer_factor,
            Event::Deletion => 0.1 * self.enhancer_factor,
            Event::Inversion | Event::Breakend => 0.0,
        }
    }
}

impl SequenceImpactCalculator<Enhancer> for EnhancerSequenceImpactCalculator {
    fn project_impact(&self, projection: &Projection<'_, Enhancer>) -> f64 {
        if projection.is_intra_segment() {
            return match projection.start_event() {
                Event::Deletion => 0.0,
                // scored once per copy
                Event::Duplication => self.no_impact(),
                event @ (Event::Breakend | Event::Snv | Event::Insertion) => {
                    warn!(
                        "Enhancer {} is unexpectedly located within a {} segment",
                        projection.source.id, event
                    );
                    self.no_impact()
                }
                Event::Gap | Event::Inversion => self.no_impact(),
            };
        }

        let enhancer = projection.source;
        projection
            .spanned_segments()
            .filter(|segment| {
                segment.contig_index() == enhancer.contig_index()
                    && Coordinates::overlap(
                        segment.start_on_strand(enhancer.strand()),
                        segment.end_on_strand(enhancer.strand()),
                        enhancer.start(),
                        enhancer.end(),
                    )
            })
            .map(|segment| self.event_fitness(segment.event()))
            .fold(self.no_impact(), f64::min)
    }

    fn no_impact(&self) -> f64 {
        self.enhancer_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        projection::project,
        route::{Route, Segment},
        testing::{chr1, enhancer, region},
    };
    use rstest::rstest;

    fn route_with(event: Segment) -> Route {
        let downstream_start = event.end();
        Route::new(vec![
            Segment::gap(region(&chr1(), 0, 200), "upstream"),
            event,
            Segment::gap(region(&chr1(), downstream_start, 500), "downstream"),
        ])
        .unwrap()
    }

    fn impacts(route: &Route, start: u64, end: u64) -> Vec<f64> {
        let calculator = EnhancerSequenceImpactCalculator::new(2.0);
        let enhancer = enhancer("E", &chr1(), start, end);
        project(&enhancer, route)
            .iter()
            .map(|p| calculator.project_impact(p))
            .collect()
    }

    #[rstest]
    // outside of the event
    #[case(Segment::deletion(region(&chr1(), 200, 300), "del"), 100, 150, vec![2.0])]
    // deleted entirely
    #[case(Segment::deletion(region(&chr1(), 200, 300), "del"), 220, 250, vec![])]
    // one projection per copy
    #[case(Segment::duplication(region(&chr1(), 200, 300), "dup"), 220, 250, vec![2.0, 2.0])]
    #[case(Segment::inversion(region(&chr1(), 200, 300), "inv"), 220, 250, vec![2.0])]
    // spans the whole event
    #[case(Segment::deletion(region(&chr1(), 200, 300), "del"), 150, 350, vec![0.2])]
    #[case(Segment::duplication(region(&chr1(), 200, 300), "dup"), 150, 350, vec![0.4])]
    // an insertion within the enhancer disrupts it
    #[case(Segment::insertion(region(&chr1(), 200, 200), "ins", 10), 150, 250, vec![0.4])]
    fn test_project_impact(
        #[case] event: Segment,
        #[case] start: u64,
        #[case] end: u64,
        #[case] expected: Vec<f64>,
    ) {
        let route = route_with(event);
        let actual = impacts(&route, start, end);
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-12, "{} != {}", a, e);
        }
    }
}
