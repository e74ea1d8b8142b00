use super::{Dispatcher, padded};
use crate::{
    annotations::Annotations,
    error::SvError,
    intervals::{GenomeInterval, GenomicRegion},
    strand::Strand,
};
use std::sync::Arc;

/// Windows span the genes overlapping the variant. A variant in an intergenic region gets a
/// window reaching from the start of the upstream gene to the end of the downstream gene.
#[derive(Debug, Clone)]
pub struct GeneDispatcher {
    annotations: Arc<Annotations>,
    padding: u64,
}

impl GeneDispatcher {
    pub fn new(annotations: Arc<Annotations>, padding: u64) -> Self {
        Self {
            annotations,
            padding,
        }
    }
}

impl Dispatcher for GeneDispatcher {
    fn window(&self, region: &GenomicRegion) -> Result<GenomicRegion, SvError> {
        let region = region.with_strand(Strand::Forward);
        let genes = self.annotations.genes.overlapping(&region);

        let (start, end) = if genes.is_empty() {
            let upstream = genes
                .left
                .map(|g| g.start_on_strand(Strand::Forward))
                .unwrap_or(region.start);
            let downstream = genes
                .right
                .map(|g| g.end_on_strand(Strand::Forward))
                .unwrap_or(region.end);
            (upstream.min(region.start), downstream.max(region.end))
        } else {
            genes
                .entries
                .iter()
                .fold((region.start, region.end), |(start, end), gene| {
                    (
                        start.min(gene.start_on_strand(Strand::Forward)),
                        end.max(gene.end_on_strand(Strand::Forward)),
                    )
                })
        };

        Ok(padded(&region, start, end, self.padding))
    }
}
