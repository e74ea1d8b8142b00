use crate::{
    breakend::{pair_breakends, BreakendRecord},
    contig_header::ContigHeader,
    error::SvError,
    intervals::{GenomeInterval, GenomicRegion},
    strand::Strand,
};
use csv::ReaderBuilder;
use log::{debug, warn};
use serde::Deserialize;
use std::collections::HashMap;
use strum::{Display, EnumString};

/// Type column of the variant table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum VariantType {
    SNV,
    DEL,
    DUP,
    INS,
    INV,
    BND,
    CNV,
}

/// One end of a non-contiguous junction.
#[derive(Debug, Clone, PartialEq)]
pub struct Breakend {
    pub id: String,

    /// Zero-length position on the strand the junction is read on.
    pub location: GenomicRegion,
}

impl GenomeInterval for Breakend {
    fn location(&self) -> &GenomicRegion {
        &self.location
    }
}

/// Sequence up to `left` is joined to the sequence starting at `right`,
/// optionally with `inserted_length` novel bases in between.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakendPair {
    pub left: Breakend,
    pub right: Breakend,
    pub inserted_length: u64,
}

impl BreakendPair {
    pub fn is_interchromosomal(&self) -> bool {
        self.left.contig_index() != self.right.contig_index()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VariantKind {
    Snv,
    Deletion,
    Duplication,
    Insertion { length: u64 },
    Inversion,
    CopyNumber { copy_number: u32 },
    Breakend(BreakendPair),
}

impl VariantKind {
    pub fn variant_type(&self) -> VariantType {
        match self {
            VariantKind::Snv => VariantType::SNV,
            VariantKind::Deletion => VariantType::DEL,
            VariantKind::Duplication => VariantType::DUP,
            VariantKind::Insertion { .. } => VariantType::INS,
            VariantKind::Inversion => VariantType::INV,
            VariantKind::CopyNumber { .. } => VariantType::CNV,
            VariantKind::Breakend(_) => VariantType::BND,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SvVariant {
    pub id: String,

    /// For breakend pairs, the location of the left breakend.
    pub location: GenomicRegion,

    pub kind: VariantKind,
}

impl SvVariant {
    pub fn new(id: &str, location: GenomicRegion, kind: VariantKind) -> Self {
        Self {
            id: id.to_string(),
            location,
            kind,
        }
    }

    pub fn breakend(id: &str, pair: BreakendPair) -> Self {
        Self {
            id: id.to_string(),
            location: pair.left.location.clone(),
            kind: VariantKind::Breakend(pair),
        }
    }

    pub fn variant_type(&self) -> VariantType {
        self.kind.variant_type()
    }
}

impl GenomeInterval for SvVariant {
    fn location(&self) -> &GenomicRegion {
        &self.location
    }
}

#[derive(Debug, Deserialize)]
struct VariantRow {
    id: String,
    contig: String,
    /// 0-based, forward strand.
    start: u64,
    end: u64,
    #[serde(rename = "type")]
    variant_type: VariantType,
    #[serde(default)]
    strand: Option<Strand>,
    #[serde(default)]
    inserted_length: Option<u64>,
    #[serde(default)]
    copy_number: Option<u32>,
    #[serde(default)]
    mate_id: Option<String>,
    #[serde(default)]
    event_id: Option<String>,
}

/// A variant, or the reason a row of the variant table could not become one.
///
/// Rejected rows are carried along so that every input row gets an output row.
#[derive(Debug, Clone, PartialEq)]
pub enum VariantRecord {
    Parsed(SvVariant),
    Rejected { id: String, error: SvError },
}

impl VariantRecord {
    pub fn id(&self) -> &str {
        match self {
            VariantRecord::Parsed(variant) => &variant.id,
            VariantRecord::Rejected { id, .. } => id,
        }
    }
}

impl From<SvVariant> for VariantRecord {
    fn from(variant: SvVariant) -> Self {
        VariantRecord::Parsed(variant)
    }
}

enum ParsedRow {
    Variant(SvVariant),
    Breakend(BreakendRecord),
}

fn parse_row(row: VariantRow, contig_header: &ContigHeader) -> Result<ParsedRow, SvError> {
    let contig = contig_header.try_get_by_str(&row.contig)?;
    let strand = row.strand.unwrap_or_default();

    let kind = match row.variant_type {
        VariantType::BND => {
            let mate_id = row.mate_id.ok_or(SvError::ParsingError(format!(
                "Breakend {} has no mate_id",
                row.id
            )))?;
            let location =
                GenomicRegion::position(contig, Strand::Forward, row.start)?.with_strand(strand);
            return Ok(ParsedRow::Breakend(BreakendRecord {
                id: row.id,
                mate_id,
                event_id: row.event_id,
                location,
                inserted_length: row.inserted_length.unwrap_or(0),
            }));
        }
        VariantType::SNV => VariantKind::Snv,
        VariantType::DEL => VariantKind::Deletion,
        VariantType::DUP => VariantKind::Duplication,
        VariantType::INV => VariantKind::Inversion,
        VariantType::INS => VariantKind::Insertion {
            length: row.inserted_length.ok_or(SvError::ParsingError(format!(
                "Insertion {} has no inserted_length",
                row.id
            )))?,
        },
        VariantType::CNV => VariantKind::CopyNumber {
            copy_number: row.copy_number.ok_or(SvError::ParsingError(format!(
                "Copy number variant {} has no copy_number",
                row.id
            )))?,
        },
    };
    let location = GenomicRegion::new(contig, Strand::Forward, row.start, row.end)?;
    Ok(ParsedRow::Variant(SvVariant::new(&row.id, location, kind)))
}

/// Reads the tab-separated variant table.
///
/// Columns: `id contig start end type [strand] [inserted_length] [copy_number] [mate_id] [event_id]`.
/// Breakend rows are paired by `mate_id`; each pair becomes one variant placed at the row of its
/// first end. Rows that cannot be read, and breakends without a reciprocal mate, come back as
/// `VariantRecord::Rejected` at their own row.
#[derive(Debug, Clone)]
pub struct VariantRepository {
    pub path: String,
}

impl VariantRepository {
    pub fn new(path: &str) -> Self {
        Self {
            path: shellexpand::tilde(path).to_string(),
        }
    }

    pub fn read_variants(&self, contig_header: &ContigHeader) -> Result<Vec<VariantRecord>, SvError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| SvError::IOError(format!("Cannot read {}: {}", self.path, e)))?;
        let headers = reader.headers()?.clone();
        let id_column = headers.iter().position(|h| h == "id").ok_or_else(|| {
            SvError::ParsingError(format!("{} has no id column", self.path))
        })?;

        // (row number, record); breakend pairs are slotted in after pairing
        let mut records: Vec<(usize, VariantRecord)> = Vec::new();
        let mut breakend_rows: Vec<(usize, BreakendRecord)> = Vec::new();

        for (i_row, row) in reader.records().enumerate() {
            let row = row?;
            let id = match row.get(id_column) {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => format!("row-{}", i_row + 1),
            };

            let parsed = row
                .deserialize::<VariantRow>(Some(&headers))
                .map_err(SvError::from)
                .and_then(|row| parse_row(row, contig_header));
            match parsed {
                Ok(ParsedRow::Variant(variant)) => records.push((i_row, variant.into())),
                Ok(ParsedRow::Breakend(record)) => breakend_rows.push((i_row, record)),
                Err(error) => {
                    warn!("Cannot read variant {}: {}", id, error);
                    records.push((i_row, VariantRecord::Rejected { id, error }));
                }
            }
        }

        let row_of: HashMap<String, usize> = breakend_rows
            .iter()
            .map(|(i, record)| (record.id.clone(), *i))
            .collect();
        let paired = pair_breakends(breakend_rows.into_iter().map(|(_, r)| r).collect())?;
        for record in paired.unmatched {
            let error = SvError::ParsingError(format!(
                "Breakend {} has no reciprocal mate {}",
                record.id, record.mate_id
            ));
            warn!("{}", error);
            let i_row = row_of.get(&record.id).cloned().unwrap_or(usize::MAX);
            records.push((
                i_row,
                VariantRecord::Rejected {
                    id: record.id,
                    error,
                },
            ));
        }
        for variant in paired.variants {
            let i_row = match &variant.kind {
                VariantKind::Breakend(pair) => row_of.get(&pair.left.id).cloned(),
                _ => None,
            };
            records.push((i_row.unwrap_or(usize::MAX), variant.into()));
        }

        records.sort_by_key(|(i_row, _)| *i_row);
        debug!("Read {} variants from {}", records.len(), self.path);
        Ok(records.into_iter().map(|(_, record)| record).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str =
        "id\tcontig\tstart\tend\ttype\tstrand\tinserted_length\tcopy_number\tmate_id\tevent_id\n";

    fn contig_header() -> ContigHeader {
        let mut header = ContigHeader::new();
        header.add_contig("chr1", 1000).unwrap();
        header.add_contig("chr2", 2000).unwrap();
        header
    }

    fn read(rows: &str) -> Vec<VariantRecord> {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(HEADER.as_bytes()).unwrap();
        file.write_all(rows.as_bytes()).unwrap();
        VariantRepository::new(&file.path().display().to_string())
            .read_variants(&contig_header())
            .unwrap()
    }

    fn summary(records: &[VariantRecord]) -> Vec<(&str, bool)> {
        records
            .iter()
            .map(|r| (r.id(), matches!(r, VariantRecord::Parsed(_))))
            .collect()
    }

    #[test]
    fn test_read_variants() {
        let records = read(
            "del1\tchr1\t80\t220\tDEL\t\t\t\t\t\n\
             bnd1\tchr1\t150\t151\tBND\t+\t\t\tbnd2\ttra1\n\
             ins1\tchr2\t500\t500\tINS\t\t30\t\t\t\n\
             bnd2\tchr2\t600\t601\tBND\t-\t\t\tbnd1\ttra1\n",
        );

        assert_eq!(
            summary(&records),
            vec![("del1", true), ("tra1", true), ("ins1", true)]
        );
        let VariantRecord::Parsed(tra) = &records[1] else {
            panic!("Expected a breakend pair");
        };
        let VariantKind::Breakend(pair) = &tra.kind else {
            panic!("Expected a breakend pair");
        };
        assert_eq!(pair.left.location.strand, Strand::Forward);
        assert_eq!(pair.right.location.strand, Strand::Reverse);
        // 2000 - 600
        assert_eq!(pair.right.location.start, 1400);
    }

    #[test]
    fn test_unmatched_breakend_is_kept() {
        let records = read(
            "del1\tchr1\t80\t220\tDEL\t\t\t\t\t\n\
             bnd1\tchr1\t150\t151\tBND\t\t\t\tbnd9\t\n\
             del2\tchr1\t300\t320\tDEL\t\t\t\t\t\n",
        );

        assert_eq!(
            summary(&records),
            vec![("del1", true), ("bnd1", false), ("del2", true)]
        );
    }

    #[test]
    fn test_invalid_rows_are_kept() {
        let records = read(
            "cnv1\tchr1\t80\t220\tCNV\t\t\t\t\t\n\
             del1\tchr9\t80\t220\tDEL\t\t\t\t\t\n\
             del2\tchr1\t80\t2000\tDEL\t\t\t\t\t\n\
             del3\tchr1\tabc\t220\tDEL\t\t\t\t\t\n\
             snv1\tchr1\t300\t301\tSNV\t\t\t\t\t\n",
        );

        assert_eq!(
            summary(&records),
            vec![
                ("cnv1", false),
                ("del1", false),
                ("del2", false),
                ("del3", false),
                ("snv1", true),
            ]
        );
        assert!(matches!(
            &records[0],
            VariantRecord::Rejected { error: SvError::ParsingError(_), .. }
        ));
    }
}
