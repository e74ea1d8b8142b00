use crate::{
    error::SvError,
    feature::{Enhancer, Gene, TadBoundary},
    impact::SequenceImpactCalculator,
    intervals::{GenomeInterval, GenomicRegion},
    projection::{project, Projection},
    relevance::{EnhancerGeneRelevanceCalculator, GeneWeightCalculator},
    route::Route,
    route_data::RouteData,
    strand::Strand,
};
use log::trace;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Projected genes scoring below this are treated as lost.
pub const CLOSE_TO_ZERO: f64 = 1e-9;

/// Deltas below this are numerical noise.
const NOISE_FLOOR: f64 = 1e-9;

pub trait RouteResult {
    /// Non-negative. Higher means more deleterious.
    fn priority(&self) -> f64;
}

/// Per-gene absolute differences between the reference and the alternate scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GranularRouteResult {
    contributions: BTreeMap<String, f64>,
}

impl GranularRouteResult {
    pub fn new(contributions: BTreeMap<String, f64>) -> Self {
        Self { contributions }
    }

    /// Delta of the gene, 0 for genes the variant does not change.
    pub fn gene_contribution(&self, accession: &str) -> f64 {
        self.contributions.get(accession).copied().unwrap_or(0.0)
    }

    pub fn contributions(&self) -> &BTreeMap<String, f64> {
        &self.contributions
    }
}

impl RouteResult for GranularRouteResult {
    fn priority(&self) -> f64 {
        self.contributions.values().fold(0.0, |total, delta| total + delta)
    }
}

/// Two-pass evaluation of genes and enhancers on the reference and on the alternate routes.
pub struct RouteDataEvaluator {
    gene_impact: Box<dyn SequenceImpactCalculator<Gene>>,
    gene_weight: Box<dyn GeneWeightCalculator>,
    enhancer_impact: Box<dyn SequenceImpactCalculator<Enhancer>>,
    enhancer_relevance: Box<dyn EnhancerGeneRelevanceCalculator>,

    /// Credit genes only with the enhancers of their own TAD.
    tad_aware: bool,
}

impl RouteDataEvaluator {
    pub fn new(
        gene_impact: Box<dyn SequenceImpactCalculator<Gene>>,
        gene_weight: Box<dyn GeneWeightCalculator>,
        enhancer_impact: Box<dyn SequenceImpactCalculator<Enhancer>>,
        enhancer_relevance: Box<dyn EnhancerGeneRelevanceCalculator>,
    ) -> Self {
        Self {
            gene_impact,
            gene_weight,
            enhancer_impact,
            enhancer_relevance,
            tad_aware: false,
        }
    }

    pub fn with_tad_awareness(self, tad_aware: bool) -> Self {
        Self { tad_aware, ..self }
    }

    pub fn evaluate(&self, data: &RouteData) -> Result<GranularRouteResult, SvError> {
        let reference = self.score_reference(data)?;
        let alternate = self.score_alternates(data);

        let contributions = reference
            .into_iter()
            .filter_map(|(accession, reference_score)| {
                let alternate_score = alternate.get(&accession).copied().unwrap_or(0.0);
                let delta = (reference_score - alternate_score).abs();
                (delta >= NOISE_FLOOR).then_some((accession, delta))
            })
            .collect();

        let result = GranularRouteResult::new(contributions);
        trace!("Route data evaluated to {:?}", result);
        Ok(result)
    }

    fn gene_relevance(&self, gene: &Gene) -> f64 {
        self.gene_weight.gene_weight(gene).exp()
    }

    fn score_reference(&self, data: &RouteData) -> Result<BTreeMap<String, f64>, SvError> {
        let mut windows: HashMap<usize, &GenomicRegion> = HashMap::new();
        for reference in data.routes.references() {
            if windows.insert(reference.contig_index, reference).is_some() {
                return Err(SvError::EvaluationError(format!(
                    "Multiple reference windows on contig {}",
                    reference.contig_index
                )));
            }
        }

        let midpoints = if self.tad_aware {
            sorted_midpoints(&data.tad_boundaries)
        } else {
            HashMap::new()
        };

        let mut scores: BTreeMap<String, f64> = BTreeMap::new();
        for gene in &data.genes {
            if !windows.contains_key(&gene.contig_index()) {
                return Err(SvError::EvaluationError(format!(
                    "No reference window for gene {} on contig {}",
                    gene.accession,
                    gene.contig_index()
                )));
            }

            let gene_domain = domain_of(gene, &midpoints);
            let enhancers: f64 = data
                .enhancers
                .iter()
                .filter(|e| {
                    e.contig_index() == gene.contig_index()
                        && domain_of(*e, &midpoints) == gene_domain
                })
                .map(|e| self.enhancer_impact.no_impact() * self.enhancer_relevance.relevance(e))
                .sum();

            let score = self.gene_impact.no_impact() * self.gene_relevance(gene) + enhancers;
            *scores.entry(gene.accession.clone()).or_insert(0.0) += score;
        }

        Ok(scores)
    }

    fn score_alternates(&self, data: &RouteData) -> BTreeMap<String, f64> {
        let mut scores: BTreeMap<String, f64> = BTreeMap::new();

        for route in data.routes.alternates() {
            let genes = project_all(&data.genes, route);
            if genes.is_empty() {
                continue;
            }
            let enhancers = project_all(&data.enhancers, route);

            let domains = if self.tad_aware {
                let tads = project_all(&data.tad_boundaries, route);
                route_domains(&genes, &enhancers, &tads)
            } else {
                RouteDomains::single(genes.len(), enhancers.len())
            };

            for (i, gene) in genes.iter().enumerate() {
                let impact = self.gene_impact.project_impact(gene);
                if impact < CLOSE_TO_ZERO {
                    continue;
                }

                let enhancers: f64 = enhancers
                    .iter()
                    .zip(&domains.enhancers)
                    .filter(|(_, domain)| **domain == domains.genes[i])
                    .map(|(e, _)| {
                        self.enhancer_impact.project_impact(e)
                            * self.enhancer_relevance.relevance(e.source)
                    })
                    .sum();

                let score = impact * self.gene_relevance(gene.source) + enhancers;
                *scores.entry(gene.source.accession.clone()).or_insert(0.0) += score;
            }
        }

        scores
    }
}

fn project_all<'a, T: GenomeInterval>(elements: &'a [T], route: &'a Route) -> Vec<Projection<'a, T>> {
    elements
        .iter()
        .flat_map(|element| project(element, route))
        .collect()
}

/// Forward-strand TAD midpoints per contig, ascending.
fn sorted_midpoints(tads: &[TadBoundary]) -> HashMap<usize, Vec<u64>> {
    let mut midpoints: HashMap<usize, Vec<u64>> = HashMap::new();
    for tad in tads {
        midpoints
            .entry(tad.contig_index())
            .or_default()
            .push(tad.midpoint().start_on_strand(Strand::Forward));
    }
    for positions in midpoints.values_mut() {
        positions.sort_unstable();
    }
    midpoints
}

/// Number of TAD midpoints at or before the start of `element`.
fn domain_of<T: GenomeInterval>(element: &T, midpoints: &HashMap<usize, Vec<u64>>) -> usize {
    match midpoints.get(&element.contig_index()) {
        Some(midpoints) => {
            let start = element.start_on_strand(Strand::Forward);
            midpoints.partition_point(|m| *m <= start)
        }
        None => 0,
    }
}

/// Index of the domain of every gene and enhancer projection of a route.
struct RouteDomains {
    genes: Vec<usize>,
    enhancers: Vec<usize>,
}

impl RouteDomains {
    fn single(n_genes: usize, n_enhancers: usize) -> Self {
        Self {
            genes: vec![0; n_genes],
            enhancers: vec![0; n_enhancers],
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Kind {
    Gene,
    Enhancer,
    Tad,
}

/// Walk the projections in route order. Every projected TAD boundary opens a new domain.
fn route_domains(
    genes: &[Projection<'_, Gene>],
    enhancers: &[Projection<'_, Enhancer>],
    tads: &[Projection<'_, TadBoundary>],
) -> RouteDomains {
    let mut items: Vec<(i64, i64, Kind, usize)> = Vec::new();
    items.extend(
        genes
            .iter()
            .enumerate()
            .map(|(i, p)| (p.forward_start(), p.forward_end(), Kind::Gene, i)),
    );
    items.extend(
        enhancers
            .iter()
            .enumerate()
            .map(|(i, p)| (p.forward_start(), p.forward_end(), Kind::Enhancer, i)),
    );
    items.extend(
        tads.iter()
            .enumerate()
            .map(|(i, p)| (p.forward_start(), p.forward_end(), Kind::Tad, i)),
    );
    items.sort();

    let mut domains = RouteDomains::single(genes.len(), enhancers.len());
    let mut current = 0;
    for (_, _, kind, i) in items {
        match kind {
            Kind::Tad => current += 1,
            Kind::Gene => domains.genes[i] = current,
            Kind::Enhancer => domains.enhancers[i] = current,
        }
    }
    domains
}
