use crate::error::SvError;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::fmt::Display;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Contig {
    pub index: usize,

    pub name: String,

    /// Aliases:
    /// - chr1 -> 1
    /// - 1 -> chr1
    pub aliases: Vec<String>,

    pub length: u64,
}

impl Contig {
    const ABBREVIATABLE_CHROMOSOMES: [&'static str; 25] = [
        "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16",
        "17", "18", "19", "20", "21", "22", "X", "Y", "MT",
    ];

    pub fn new(index: usize, name: &str, length: u64) -> Self {
        let mut aliases = Vec::new();
        if Contig::ABBREVIATABLE_CHROMOSOMES.contains(&name) {
            aliases.push(format!("chr{}", name));
        }

        if let Some(stripped) = name.strip_prefix("chr") {
            if Contig::ABBREVIATABLE_CHROMOSOMES.contains(&stripped) {
                aliases.push(stripped.to_string());
            }
        }
        if name == "chrM" {
            aliases.push("MT".to_string());
        }

        Contig {
            index,
            name: name.to_string(),
            aliases,
            length,
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|alias| alias == name)
    }
}

impl Eq for Contig {}

impl PartialEq for Contig {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.name == other.name && self.length == other.length
    }
}

#[derive(Debug, Deserialize)]
struct ChromSizesRow {
    name: String,
    length: u64,
}

/// The ordered contigs of an assembly, indexable by name or alias.
#[derive(Debug, Default, Clone)]
pub struct ContigHeader {
    pub contigs: Vec<Contig>,

    /// contig name / aliases -> index
    contig_lookup: HashMap<String, usize>,
}

impl ContigHeader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a `chrom.sizes` file: `name<TAB>length`, no header.
    pub fn from_chrom_sizes<P: AsRef<Path>>(path: P) -> Result<Self, SvError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .comment(Some(b'#'))
            .from_path(path.as_ref())
            .map_err(|e| {
                SvError::IOError(format!(
                    "Cannot read contigs from {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?;

        let mut header = ContigHeader::new();
        for row in reader.deserialize() {
            let row: ChromSizesRow = row?;
            header.add_contig(&row.name, row.length)?;
        }
        Ok(header)
    }

    pub fn add_contig(&mut self, name: &str, length: u64) -> Result<usize, SvError> {
        if self.contig_lookup.contains_key(name) {
            return Err(SvError::ValueError(format!("Duplicate contig: {}", name)));
        }

        let index = self.contigs.len();
        let contig = Contig::new(index, name, length);

        self.contig_lookup.insert(contig.name.clone(), index);
        contig.aliases.iter().for_each(|alias| {
            self.contig_lookup.entry(alias.clone()).or_insert(index);
        });
        self.contigs.push(contig);

        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Contig> {
        self.contigs.get(index)
    }

    pub fn try_get(&self, index: usize) -> Result<&Contig, SvError> {
        self.get(index)
            .ok_or(SvError::ValueError(format!("Contig index out of bounds: {}", index)))
    }

    pub fn try_get_index_by_str(&self, contig_name: &str) -> Result<usize, SvError> {
        self.contig_lookup
            .get(contig_name)
            .cloned()
            .ok_or(SvError::ValueError(format!("Contig {} not found", contig_name)))
    }

    pub fn try_get_by_str(&self, contig_name: &str) -> Result<&Contig, SvError> {
        self.try_get(self.try_get_index_by_str(contig_name)?)
    }
}

impl Display for ContigHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for contig in &self.contigs {
            writeln!(f, "{}: {}", contig.name, contig.length)?;
        }
        Ok(())
    }
}
