use crate::{
    error::SvError,
    intervals::{GenomeInterval, GenomicRegion},
};
use itertools::Itertools;
use serde::Serialize;
use std::collections::BTreeSet;
use strum::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    Gap,
    Snv,
    Deletion,
    Duplication,
    Insertion,
    Inversion,
    Breakend,
}

/// Atomic piece of a route.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    region: GenomicRegion,
    id: String,
    event: Event,
    copies: u32,
    inserted_length: u64,
}

impl Segment {
    fn of(region: GenomicRegion, id: &str, event: Event, copies: u32) -> Self {
        Self {
            region,
            id: id.to_string(),
            event,
            copies,
            inserted_length: 0,
        }
    }

    pub fn gap(region: GenomicRegion, id: &str) -> Self {
        Self::of(region, id, Event::Gap, 1)
    }

    pub fn snv(region: GenomicRegion, id: &str) -> Self {
        Self::of(region, id, Event::Snv, 1)
    }

    pub fn deletion(region: GenomicRegion, id: &str) -> Self {
        Self::of(region, id, Event::Deletion, 0)
    }

    pub fn duplication(region: GenomicRegion, id: &str) -> Self {
        Self::of(region, id, Event::Duplication, 2)
    }

    pub fn inversion(region: GenomicRegion, id: &str) -> Self {
        Self::of(region, id, Event::Inversion, 1)
    }

    pub fn breakend(region: GenomicRegion, id: &str) -> Self {
        Self::of(region.with_coordinates(region.start, region.start), id, Event::Breakend, 1)
    }

    /// Zero-length anchor carrying `length` novel bases.
    pub fn insertion(anchor: GenomicRegion, id: &str, length: u64) -> Self {
        Self {
            inserted_length: length,
            ..Self::of(
                anchor.with_coordinates(anchor.start, anchor.start),
                id,
                Event::Insertion,
                1,
            )
        }
    }

    /// Deletion-flavored segment with an explicit multiplier, used for generic copy-number calls.
    pub fn copy_number(region: GenomicRegion, id: &str, copies: u32) -> Self {
        Self::of(region, id, Event::Deletion, copies)
    }

    pub fn region(&self) -> &GenomicRegion {
        &self.region
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn event(&self) -> Event {
        self.event
    }

    pub fn copies(&self) -> u32 {
        self.copies
    }

    pub fn inserted_length(&self) -> u64 {
        self.inserted_length
    }

    /// Bases of one copy of the segment. Insertions count their novel bases.
    pub fn length(&self) -> u64 {
        match self.event {
            Event::Insertion => self.inserted_length,
            _ => self.region.length(),
        }
    }

    /// Bases the segment occupies on the rearranged contig.
    pub fn contributing_bases(&self) -> u64 {
        self.length() * self.copies as u64
    }
}

impl GenomeInterval for Segment {
    fn location(&self) -> &GenomicRegion {
        &self.region
    }
}

/// Ordered chain of segments through the rearranged genome.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    segments: Vec<Segment>,
}

impl Route {
    pub fn new(segments: Vec<Segment>) -> Result<Self, SvError> {
        if segments.is_empty() {
            return Err(SvError::DispatchError(
                "Route must have at least one segment".to_string(),
            ));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn contigs(&self) -> BTreeSet<usize> {
        self.segments.iter().map(|s| s.contig_index()).collect()
    }

    pub fn is_interchromosomal(&self) -> bool {
        self.contigs().len() > 1
    }

    /// Length of the contig the route spells out.
    pub fn neo_contig_length(&self) -> u64 {
        self.segments.iter().map(|s| s.contributing_bases()).sum()
    }

    /// Bases contributed by the segments before `idx`.
    pub fn bases_before(&self, idx: usize) -> u64 {
        self.segments[..idx]
            .iter()
            .map(|s| s.contributing_bases())
            .sum()
    }

    /// Consecutive segments on the same contig and strand must abut. The route may jump
    /// between the two ends of a breakend junction.
    pub fn is_contiguous(&self) -> bool {
        self.segments.iter().tuple_windows().all(|(a, b)| {
            let is_jump = b.event() == Event::Breakend
                && matches!(a.event(), Event::Breakend | Event::Insertion);
            is_jump
                || a.contig_index() != b.contig_index()
                || a.strand() != b.strand()
                || a.end() == b.start()
        })
    }
}

/// Reference windows and the alternate routes of one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Routes {
    references: Vec<GenomicRegion>,
    alternates: Vec<Route>,
}

impl Routes {
    pub fn new(references: Vec<GenomicRegion>, alternates: Vec<Route>) -> Result<Self, SvError> {
        if references.is_empty() || alternates.is_empty() {
            return Err(SvError::DispatchError(
                "Routes need at least one reference and one alternate".to_string(),
            ));
        }
        Ok(Self {
            references,
            alternates,
        })
    }

    pub fn references(&self) -> &[GenomicRegion] {
        &self.references
    }

    pub fn alternates(&self) -> &[Route] {
        &self.alternates
    }
}
