use crate::{
    error::SvError,
    intervals::GenomicRegion,
    variant::{Breakend, BreakendPair, SvVariant},
};
use std::collections::HashMap;

/// A single-ended breakend call that names its mate.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakendRecord {
    pub id: String,
    pub mate_id: String,
    pub event_id: Option<String>,

    /// Zero-length position on the strand the junction is read on.
    pub location: GenomicRegion,

    pub inserted_length: u64,
}

#[derive(Debug, Default)]
pub struct PairedBreakends {
    /// One breakend variant per reciprocal pair, in the order of the first end.
    pub variants: Vec<SvVariant>,

    /// Records whose mate is missing or does not point back.
    pub unmatched: Vec<BreakendRecord>,
}

/// Pair single-ended records by mate id.
///
/// First every record is collected by id, then records are paired only when both ends name each
/// other. Anything else is reported back as unmatched.
pub fn pair_breakends(records: Vec<BreakendRecord>) -> Result<PairedBreakends, SvError> {
    let mut by_id: HashMap<String, usize> = HashMap::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        if by_id.insert(record.id.clone(), i).is_some() {
            return Err(SvError::ParsingError(format!(
                "Duplicate breakend id: {}",
                record.id
            )));
        }
    }

    let mut slots: Vec<Option<BreakendRecord>> = records.into_iter().map(Some).collect();
    let mut paired = PairedBreakends::default();

    for i in 0..slots.len() {
        let Some(record) = slots[i].take() else {
            continue; // consumed as a mate
        };

        let mate_index = by_id
            .get(&record.mate_id)
            .cloned()
            .filter(|&j| j != i)
            .filter(|&j| {
                slots[j]
                    .as_ref()
                    .is_some_and(|mate| mate.mate_id == record.id)
            });

        match mate_index.and_then(|j| slots[j].take()) {
            Some(mate) => {
                let id = record
                    .event_id
                    .clone()
                    .unwrap_or_else(|| format!("{}:{}", record.id, mate.id));
                let pair = BreakendPair {
                    left: Breakend {
                        id: record.id,
                        location: record.location,
                    },
                    right: Breakend {
                        id: mate.id,
                        location: mate.location,
                    },
                    inserted_length: record.inserted_length,
                };
                paired.variants.push(SvVariant::breakend(&id, pair));
            }
            None => paired.unmatched.push(record),
        }
    }

    Ok(paired)
}
