use super::{Dispatcher, padded};
use crate::{
    annotations::Annotations,
    error::SvError,
    feature::Gene,
    intervals::GenomicRegion,
    strand::Strand,
};
use std::sync::Arc;

/// Windows of variants that hit a gene, or a cluster of mutually overlapping genes, span those
/// genes. Other windows reach the midpoints of the closest TAD boundaries around the variant, or
/// the contig ends when there is no boundary on that side, and are widened so that no gene
/// overlapping the variant is cut.
#[derive(Debug, Clone)]
pub struct TadAwareDispatcher {
    annotations: Arc<Annotations>,
    padding: u64,
}

/// Forward-strand bounds of `genes` joined with `[start, end)`.
fn gene_bounds(genes: &[&Gene], start: u64, end: u64) -> (u64, u64) {
    genes.iter().fold((start, end), |(start, end), gene| {
        let location = gene.location.with_strand(Strand::Forward);
        (start.min(location.start), end.max(location.end))
    })
}

fn overlap_each_other(genes: &[&Gene]) -> bool {
    genes.iter().enumerate().all(|(i, gene)| {
        genes[i + 1..]
            .iter()
            .all(|other| gene.location.overlaps_with(&other.location))
    })
}

impl TadAwareDispatcher {
    pub fn new(annotations: Arc<Annotations>, padding: u64) -> Self {
        Self {
            annotations,
            padding,
        }
    }

    fn upstream_bound(&self, region: &GenomicRegion) -> u64 {
        let point = region.with_coordinates(region.start, region.start);
        let boundaries = self.annotations.tad_boundaries.overlapping(&point);
        let boundary = match boundaries.entries.first() {
            Some(boundary) => Some(*boundary),
            None => boundaries.left,
        };
        boundary
            .map(|b| b.midpoint().start_on_strand(Strand::Forward))
            .unwrap_or(0)
            .min(region.start)
    }

    fn downstream_bound(&self, region: &GenomicRegion) -> u64 {
        let point = region.with_coordinates(region.end, region.end);
        let boundaries = self.annotations.tad_boundaries.overlapping(&point);
        let boundary = match boundaries.entries.last() {
            Some(boundary) => Some(*boundary),
            None => boundaries.right,
        };
        boundary
            .map(|b| b.midpoint().end_on_strand(Strand::Forward))
            .unwrap_or(region.contig_length)
            .max(region.end)
    }
}

impl Dispatcher for TadAwareDispatcher {
    fn window(&self, region: &GenomicRegion) -> Result<GenomicRegion, SvError> {
        let region = region.with_strand(Strand::Forward);
        let genes = self.annotations.genes.overlapping(&region).entries;

        let (start, end) = if !genes.is_empty() && overlap_each_other(&genes) {
            gene_bounds(&genes, region.start, region.end)
        } else {
            let start = self.upstream_bound(&region);
            let end = self.downstream_bound(&region);
            gene_bounds(&genes, start, end)
        };
        Ok(padded(&region, start, end, self.padding))
    }

    /// Breakends in genes are evaluated over the genes, intergenic breakends on their own.
    fn breakend_window(&self, region: &GenomicRegion) -> Result<GenomicRegion, SvError> {
        let region = region.with_strand(Strand::Forward);
        let genes = self.annotations.genes.overlapping(&region).entries;
        let (start, end) = gene_bounds(&genes, region.start, region.end);
        Ok(padded(&region, start, end, self.padding))
    }
}
