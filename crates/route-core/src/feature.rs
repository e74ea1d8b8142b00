use crate::intervals::{Coordinates, GenomeInterval, GenomicRegion};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// Genomic elements the engine projects onto routes.

#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub accession: String,

    pub location: GenomicRegion,

    /// On the transcript strand, in transcription order.
    pub exons: Vec<Coordinates>,

    /// CDS on the transcript strand. None for non-coding transcripts.
    pub coding: Option<Coordinates>,
}

impl Transcript {
    pub fn is_coding(&self) -> bool {
        self.coding.is_some()
    }

    pub fn n_exons(&self) -> usize {
        self.exons.len()
    }
}

impl GenomeInterval for Transcript {
    fn location(&self) -> &GenomicRegion {
        &self.location
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gene {
    pub accession: String,

    pub symbol: String,

    pub location: GenomicRegion,

    pub transcripts: Vec<Transcript>,
}

impl GenomeInterval for Gene {
    fn location(&self) -> &GenomicRegion {
        &self.location
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enhancer {
    pub id: String,

    pub location: GenomicRegion,

    pub tissue: String,

    pub tissue_specificity: f64,

    pub developmental: bool,
}

impl GenomeInterval for Enhancer {
    fn location(&self) -> &GenomicRegion {
        &self.location
    }
}

/// Boundary between two topologically associating domains.
#[derive(Debug, Clone, PartialEq)]
pub struct TadBoundary {
    pub id: String,

    pub location: GenomicRegion,

    /// Fraction of cell types where the boundary is observed.
    pub stability: f64,
}

impl TadBoundary {
    /// Zero-length point in the middle of the boundary, on the boundary strand.
    pub fn midpoint(&self) -> GenomicRegion {
        let middle = self.location.start + self.location.length() / 2;
        self.location.with_coordinates(middle, middle)
    }
}

impl GenomeInterval for TadBoundary {
    fn location(&self) -> &GenomicRegion {
        &self.location
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum DosageSensitivity {
    #[strum(to_string = "HI", serialize = "haploinsufficiency")]
    #[serde(rename = "HI")]
    Haploinsufficiency,

    #[strum(to_string = "TS", serialize = "triplosensitivity")]
    #[serde(rename = "TS")]
    Triplosensitivity,

    #[strum(to_string = "NONE", serialize = "none")]
    #[serde(rename = "NONE")]
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DosageRegion {
    pub id: String,

    pub location: GenomicRegion,

    pub sensitivity: DosageSensitivity,
}

impl GenomeInterval for DosageRegion {
    fn location(&self) -> &GenomicRegion {
        &self.location
    }
}
