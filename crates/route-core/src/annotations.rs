use crate::{
    contig_header::ContigHeader,
    error::SvError,
    feature::{DosageRegion, DosageSensitivity, Enhancer, Gene, TadBoundary, Transcript},
    index::GenomeIndex,
    intervals::{Coordinates, GenomeInterval, GenomicRegion},
    strand::Strand,
};
use csv::{Reader, ReaderBuilder};
use log::{debug, info};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;

/// Indexed genomic elements. Built once and shared read-only between workers.
#[derive(Debug, Default)]
pub struct Annotations {
    pub genes: GenomeIndex<Gene>,
    pub enhancers: GenomeIndex<Enhancer>,
    pub tad_boundaries: GenomeIndex<TadBoundary>,
    pub dosage_regions: GenomeIndex<DosageRegion>,
}

impl Annotations {
    pub fn new(
        genes: Vec<Gene>,
        enhancers: Vec<Enhancer>,
        tad_boundaries: Vec<TadBoundary>,
        dosage_regions: Vec<DosageRegion>,
    ) -> Self {
        Self {
            genes: GenomeIndex::new(genes),
            enhancers: GenomeIndex::new(enhancers),
            tad_boundaries: GenomeIndex::new(tad_boundaries),
            dosage_regions: GenomeIndex::new(dosage_regions),
        }
    }

    pub fn from_paths(
        paths: &AnnotationPaths,
        contig_header: &ContigHeader,
        tad_stability_threshold: f64,
    ) -> Result<Self, SvError> {
        let genes = read_genes(&paths.genes, contig_header)?;
        let enhancers = match &paths.enhancers {
            Some(path) => read_enhancers(path, contig_header)?,
            None => Vec::new(),
        };
        let tad_boundaries = match &paths.tad_boundaries {
            Some(path) => read_tad_boundaries(path, contig_header, tad_stability_threshold)?,
            None => Vec::new(),
        };
        let dosage_regions = match &paths.dosage_regions {
            Some(path) => read_dosage_regions(path, contig_header)?,
            None => Vec::new(),
        };

        info!(
            "Loaded {} genes, {} enhancers, {} TAD boundaries and {} dosage regions",
            genes.len(),
            enhancers.len(),
            tad_boundaries.len(),
            dosage_regions.len()
        );
        Ok(Self::new(genes, enhancers, tad_boundaries, dosage_regions))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnnotationPaths {
    pub genes: String,
    pub enhancers: Option<String>,
    pub tad_boundaries: Option<String>,
    pub dosage_regions: Option<String>,
}

fn tsv_reader(path: &str) -> Result<Reader<File>, SvError> {
    let path = shellexpand::tilde(path).to_string();
    ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .from_path(&path)
        .map_err(|e| SvError::IOError(format!("Cannot read {}: {}", path, e)))
}

/// Forward-strand region from a table row, flipped onto `strand`.
fn row_region(
    contig_header: &ContigHeader,
    contig: &str,
    strand: Strand,
    start: u64,
    end: u64,
) -> Result<GenomicRegion, SvError> {
    let contig = contig_header.try_get_by_str(contig)?;
    Ok(GenomicRegion::new(contig, Strand::Forward, start, end)?.with_strand(strand))
}

/// UCSC-style list: "10,20,30," (the trailing comma is optional).
fn parse_positions(field: &str) -> Result<Vec<u64>, SvError> {
    field
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u64>().map_err(SvError::from))
        .collect()
}

#[derive(Debug, Deserialize)]
struct TranscriptRow {
    gene_accession: String,
    gene_symbol: String,
    transcript_accession: String,
    contig: String,
    strand: Strand,
    tx_start: u64,
    tx_end: u64,
    cds_start: u64,
    cds_end: u64,
    exon_starts: String,
    exon_ends: String,
}

impl TranscriptRow {
    fn into_transcript(self, contig_header: &ContigHeader) -> Result<Transcript, SvError> {
        let location = row_region(
            contig_header,
            &self.contig,
            self.strand,
            self.tx_start,
            self.tx_end,
        )?;
        let contig_length = location.contig_length;

        let starts = parse_positions(&self.exon_starts)?;
        let ends = parse_positions(&self.exon_ends)?;
        if starts.len() != ends.len() || starts.is_empty() {
            return Err(SvError::ParsingError(format!(
                "Transcript {} has {} exon starts and {} exon ends",
                self.transcript_accession,
                starts.len(),
                ends.len()
            )));
        }

        let mut exons = starts
            .into_iter()
            .zip(ends)
            .map(|(start, end)| Coordinates::new(start, end))
            .collect::<Result<Vec<_>, _>>()?;
        exons.sort_by_key(|e| e.start);

        // cds_start == cds_end marks a non-coding transcript
        let mut coding = if self.cds_start < self.cds_end {
            Some(Coordinates::new(self.cds_start, self.cds_end)?)
        } else {
            None
        };

        if let Some(past_end) = exons
            .iter()
            .chain(coding.iter())
            .find(|c| c.end > contig_length)
        {
            return Err(SvError::ParsingError(format!(
                "Transcript {} has an exon or CDS end {} past the contig end {}",
                self.transcript_accession, past_end.end, contig_length
            )));
        }

        if self.strand == Strand::Reverse {
            exons = exons.iter().rev().map(|e| e.invert(contig_length)).collect();
            coding = coding.map(|c| c.invert(contig_length));
        }

        Ok(Transcript {
            accession: self.transcript_accession,
            location,
            exons,
            coding,
        })
    }
}

/// Reads the transcript table and groups transcripts by gene accession, keeping file order.
///
/// Columns: `gene_accession gene_symbol transcript_accession contig strand tx_start tx_end
/// cds_start cds_end exon_starts exon_ends`, with forward-strand coordinates.
pub fn read_genes(path: &str, contig_header: &ContigHeader) -> Result<Vec<Gene>, SvError> {
    let mut reader = tsv_reader(path)?;

    let mut genes: Vec<Gene> = Vec::new();
    let mut gene_lookup: HashMap<String, usize> = HashMap::new();

    for row in reader.deserialize() {
        let row: TranscriptRow = row?;
        let gene_accession = row.gene_accession.clone();
        let gene_symbol = row.gene_symbol.clone();
        let transcript = row.into_transcript(contig_header)?;

        match gene_lookup.get(&gene_accession) {
            Some(&i) => {
                let gene = &mut genes[i];
                if gene.contig_index() != transcript.contig_index()
                    || gene.strand() != transcript.strand()
                {
                    return Err(SvError::ParsingError(format!(
                        "Transcript {} of gene {} is on a different contig or strand",
                        transcript.accession, gene_accession
                    )));
                }
                gene.location = gene.location.with_coordinates(
                    gene.start().min(transcript.start()),
                    gene.end().max(transcript.end()),
                );
                gene.transcripts.push(transcript);
            }
            None => {
                gene_lookup.insert(gene_accession.clone(), genes.len());
                genes.push(Gene {
                    accession: gene_accession,
                    symbol: gene_symbol,
                    location: transcript.location.clone(),
                    transcripts: vec![transcript],
                });
            }
        }
    }

    debug!("Read {} genes from {}", genes.len(), path);
    Ok(genes)
}

#[derive(Debug, Deserialize)]
struct EnhancerRow {
    id: String,
    contig: String,
    start: u64,
    end: u64,
    #[serde(default)]
    tissue: String,
    #[serde(default)]
    tissue_specificity: f64,
    #[serde(default)]
    developmental: bool,
}

/// Columns: `id contig start end [tissue] [tissue_specificity] [developmental]`.
pub fn read_enhancers(path: &str, contig_header: &ContigHeader) -> Result<Vec<Enhancer>, SvError> {
    let mut reader = tsv_reader(path)?;

    let mut enhancers = Vec::new();
    for row in reader.deserialize() {
        let row: EnhancerRow = row?;
        let location = row_region(contig_header, &row.contig, Strand::Forward, row.start, row.end)?;
        enhancers.push(Enhancer {
            id: row.id,
            location,
            tissue: row.tissue,
            tissue_specificity: row.tissue_specificity,
            developmental: row.developmental,
        });
    }

    debug!("Read {} enhancers from {}", enhancers.len(), path);
    Ok(enhancers)
}

#[derive(Debug, Deserialize)]
struct TadBoundaryRow {
    id: String,
    contig: String,
    start: u64,
    end: u64,
    stability: f64,
}

/// Columns: `id contig start end stability`. Boundaries below `stability_threshold` are dropped.
pub fn read_tad_boundaries(
    path: &str,
    contig_header: &ContigHeader,
    stability_threshold: f64,
) -> Result<Vec<TadBoundary>, SvError> {
    let mut reader = tsv_reader(path)?;

    let mut boundaries = Vec::new();
    let mut n_unstable = 0;
    for row in reader.deserialize() {
        let row: TadBoundaryRow = row?;
        if row.stability < stability_threshold {
            n_unstable += 1;
            continue;
        }
        let location = row_region(contig_header, &row.contig, Strand::Forward, row.start, row.end)?;
        boundaries.push(TadBoundary {
            id: row.id,
            location,
            stability: row.stability,
        });
    }

    debug!(
        "Read {} TAD boundaries from {}, {} below stability {}",
        boundaries.len(),
        path,
        n_unstable,
        stability_threshold
    );
    Ok(boundaries)
}

#[derive(Debug, Deserialize)]
struct DosageRow {
    id: String,
    contig: String,
    start: u64,
    end: u64,
    sensitivity: DosageSensitivity,
}

/// Columns: `id contig start end sensitivity`, with sensitivity one of `HI`, `TS`, `NONE`.
pub fn read_dosage_regions(
    path: &str,
    contig_header: &ContigHeader,
) -> Result<Vec<DosageRegion>, SvError> {
    let mut reader = tsv_reader(path)?;

    let mut regions = Vec::new();
    for row in reader.deserialize() {
        let row: DosageRow = row?;
        let location = row_region(contig_header, &row.contig, Strand::Forward, row.start, row.end)?;
        regions.push(DosageRegion {
            id: row.id,
            location,
            sensitivity: row.sensitivity,
        });
    }

    debug!("Read {} dosage regions from {}", regions.len(), path);
    Ok(regions)
}
