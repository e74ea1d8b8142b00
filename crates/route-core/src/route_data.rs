use crate::{
    annotations::Annotations,
    error::SvError,
    feature::{DosageRegion, Enhancer, Gene, TadBoundary},
    intervals::GenomeInterval,
    route::Routes,
};
use std::sync::Arc;

/// Routes of one dispatch with the elements found in their reference windows.
#[derive(Debug, Clone)]
pub struct RouteData {
    pub routes: Routes,

    pub genes: Vec<Gene>,

    pub enhancers: Vec<Enhancer>,

    /// Only boundaries that do not overlap a gene.
    pub tad_boundaries: Vec<TadBoundary>,

    /// Not scored. Carried along for reporting.
    pub dosage_regions: Vec<DosageRegion>,
}

impl RouteData {
    pub fn new(routes: Routes) -> Self {
        Self {
            routes,
            genes: Vec::new(),
            enhancers: Vec::new(),
            tad_boundaries: Vec::new(),
            dosage_regions: Vec::new(),
        }
    }
}

pub struct RouteDataService {
    annotations: Arc<Annotations>,
}

impl RouteDataService {
    pub fn new(annotations: Arc<Annotations>) -> Self {
        Self { annotations }
    }

    /// Collect the genes, enhancers and TAD boundaries contained in each reference window.
    pub fn get_data(&self, routes: Routes) -> Result<RouteData, SvError> {
        let mut data = RouteData::new(routes);

        for reference in data.routes.references() {
            let genes: Vec<Gene> = self
                .annotations
                .genes
                .overlapping(reference)
                .entries
                .into_iter()
                .filter(|gene| reference.contains(*gene))
                .cloned()
                .collect();

            let enhancers = self
                .annotations
                .enhancers
                .overlapping(reference)
                .entries
                .into_iter()
                .filter(|enhancer| reference.contains(*enhancer))
                .cloned();

            let tad_boundaries = self
                .annotations
                .tad_boundaries
                .overlapping(reference)
                .entries
                .into_iter()
                .filter(|tad| reference.contains(*tad))
                .filter(|tad| !genes.iter().any(|gene| gene.overlaps(*tad)))
                .cloned()
                .collect::<Vec<_>>();

            let dosage_regions = self
                .annotations
                .dosage_regions
                .overlapping(reference)
                .entries
                .into_iter()
                .cloned();

            data.enhancers.extend(enhancers);
            data.tad_boundaries.extend(tad_boundaries);
            data.dosage_regions.extend(dosage_regions);
            data.genes.extend(genes);
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        feature::DosageSensitivity,
        route::{Route, Segment},
        strand::Strand,
        testing::{chr1, chr2, enhancer, gene, region, tad},
    };

    fn annotations() -> Arc<Annotations> {
        let chr1 = chr1();
        Arc::new(Annotations::new(
            vec![
                gene("A", &chr1, Strand::Forward, 100, 200, &[(100, 200)], None),
                // sticks out of the window
                gene("B", &chr1, Strand::Forward, 450, 600, &[(450, 600)], None),
                // reverse strand, forward 300-350
                gene("C", &chr1, Strand::Reverse, 650, 700, &[(650, 700)], None),
                gene("D", &chr2(), Strand::Forward, 100, 200, &[(100, 200)], None),
            ],
            vec![
                enhancer("a", &chr1, 50, 60),
                enhancer("b", &chr1, 495, 510),
            ],
            vec![
                tad("X", &chr1, 240, 250, 0.9),
                tad("Y", &chr1, 190, 210, 0.9),
            ],
            vec![DosageRegion {
                id: "HI1".to_string(),
                location: region(&chr1, 400, 800),
                sensitivity: DosageSensitivity::Haploinsufficiency,
            }],
        ))
    }

    fn routes(start: u64, end: u64) -> Routes {
        let window = region(&chr1(), start, end);
        let route = Route::new(vec![Segment::gap(window.clone(), "window")]).unwrap();
        Routes::new(vec![window], vec![route]).unwrap()
    }

    #[test]
    fn test_contained_elements_are_collected() {
        let service = RouteDataService::new(annotations());
        let data = service.get_data(routes(0, 500)).unwrap();

        let genes: Vec<_> = data.genes.iter().map(|g| g.accession.as_str()).collect();
        assert_eq!(genes, vec!["A", "C"]);

        let enhancers: Vec<_> = data.enhancers.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(enhancers, vec!["a"]);

        // `Y` overlaps gene `A`
        let tads: Vec<_> = data.tad_boundaries.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(tads, vec!["X"]);

        // partial overlap is enough for dosage regions
        assert_eq!(data.dosage_regions.len(), 1);
    }

    #[test]
    fn test_empty_window() {
        let service = RouteDataService::new(annotations());
        let data = service.get_data(routes(900, 1000)).unwrap();
        assert!(data.genes.is_empty());
        assert!(data.enhancers.is_empty());
        assert!(data.tad_boundaries.is_empty());
        assert!(data.dosage_regions.is_empty());
    }
}
