mod assembly;
mod gene;
mod tad;

pub use assembly::{breakend_routes, build_route, variant_segments};
pub use gene::GeneDispatcher;
pub use tad::TadAwareDispatcher;

use crate::{
    error::SvError,
    intervals::{GenomeInterval, GenomicRegion},
    route::Routes,
    strand::Strand,
    variant::{BreakendPair, SvVariant, VariantKind},
};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatcherType {
    /// Windows reach the genes overlapping the variant or, failing that, its neighboring genes.
    #[default]
    Gene,

    /// Windows are bounded by the nearest TAD boundaries around the variant.
    Tad,
}

/// Turns variant calls into reference windows and alternate routes.
pub trait Dispatcher: Send + Sync {
    /// Forward-strand evaluation window around `region`. Must contain `region`.
    fn window(&self, region: &GenomicRegion) -> Result<GenomicRegion, SvError>;

    /// Forward-strand window around one end of a breakend pair. Must contain `region`.
    fn breakend_window(&self, region: &GenomicRegion) -> Result<GenomicRegion, SvError> {
        self.window(region)
    }

    /// Dispatch either a breakend pair or a sorted run of same-contig variants.
    fn assemble(&self, variants: &[SvVariant]) -> Result<Routes, SvError> {
        match variants {
            [] => Err(SvError::DispatchError("Nothing to dispatch".to_string())),
            [single] => match &single.kind {
                VariantKind::Breakend(pair) => self.assemble_breakend(&single.id, pair),
                _ => self.assemble_intrachromosomal(variants),
            },
            _ => self.assemble_intrachromosomal(variants),
        }
    }

    fn assemble_intrachromosomal(&self, variants: &[SvVariant]) -> Result<Routes, SvError> {
        let Some(first) = variants.first() else {
            return Err(SvError::DispatchError("Nothing to dispatch".to_string()));
        };

        let mut start = u64::MAX;
        let mut end = u64::MIN;
        for variant in variants {
            if variant.contig_index() != first.contig_index() {
                return Err(SvError::DispatchError(format!(
                    "Variants {} and {} are on different contigs",
                    first.id, variant.id
                )));
            }
            start = start.min(variant.start_on_strand(Strand::Forward));
            end = end.max(variant.end_on_strand(Strand::Forward));
        }

        let span = first
            .location
            .with_strand(Strand::Forward)
            .with_coordinates(start, end);
        let window = self.window(&span)?;
        let route = build_route(&window, variants)?;

        Routes::new(vec![window], vec![route])
    }

    fn assemble_breakend(&self, id: &str, pair: &BreakendPair) -> Result<Routes, SvError> {
        let left = &pair.left.location;
        let right = &pair.right.location;
        if left.contig_index == right.contig_index
            && left.strand == right.strand
            && right.start == left.end
        {
            return Err(SvError::DegenerateBreakendError(format!(
                "Breakend {} joins adjacent positions of {}",
                id, left
            )));
        }

        let left_window = self.breakend_window(&left.with_strand(Strand::Forward))?;
        let right_window = self.breakend_window(&right.with_strand(Strand::Forward))?;

        let (left_window, right_window, references) =
            if left_window.contig_index == right_window.contig_index {
                let merged = left_window.with_coordinates(
                    left_window.start.min(right_window.start),
                    left_window.end.max(right_window.end),
                );
                (merged.clone(), merged.clone(), vec![merged])
            } else {
                (
                    left_window.clone(),
                    right_window.clone(),
                    vec![left_window, right_window],
                )
            };

        let alternates = breakend_routes(id, pair, &left_window, &right_window)?;
        Routes::new(references, alternates)
    }
}

/// Extend `[start, end)` by `padding` on both sides without leaving the contig.
fn padded(region: &GenomicRegion, start: u64, end: u64, padding: u64) -> GenomicRegion {
    region.with_coordinates(
        start.saturating_sub(padding),
        end.saturating_add(padding).min(region.contig_length),
    )
}
