use clap::ValueEnum;
use itertools::Itertools;
use route_core::error::SvError;
use route_core::prioritizer::SvPriority;
use route_core::variant::VariantRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// id, priority and contributions, tab-separated.
    #[default]
    Tsv,

    /// A JSON array with one object per variant.
    Json,
}

#[derive(Debug, Serialize)]
struct PriorityRecord<'a> {
    id: &'a str,

    /// None when the priority is unknown.
    priority: Option<f64>,

    contributions: Option<&'a BTreeMap<String, f64>>,
}

fn records<'a>(
    variants: &'a [VariantRecord],
    priorities: &'a [SvPriority],
) -> Vec<PriorityRecord<'a>> {
    variants
        .iter()
        .zip(priorities)
        .map(|(variant, priority)| match priority {
            SvPriority::Known(result) => PriorityRecord {
                id: variant.id(),
                priority: priority.priority(),
                contributions: Some(result.contributions()),
            },
            SvPriority::Unknown => PriorityRecord {
                id: variant.id(),
                priority: None,
                contributions: None,
            },
        })
        .collect()
}

/// `B=1.000000;A=0.500000`, by descending contribution. `.` when no gene changes.
fn format_contributions(contributions: Option<&BTreeMap<String, f64>>) -> String {
    match contributions {
        Some(contributions) if contributions.is_empty() => ".".to_string(),
        Some(contributions) => contributions
            .iter()
            .sorted_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)))
            .map(|(gene, delta)| format!("{}={:.6}", gene, delta))
            .join(";"),
        None => "NA".to_string(),
    }
}

/// Write one row per variant, in input order.
pub fn write_priorities<W: Write>(
    writer: W,
    variants: &[VariantRecord],
    priorities: &[SvPriority],
    format: OutputFormat,
) -> Result<(), SvError> {
    if variants.len() != priorities.len() {
        return Err(SvError::ValueError(format!(
            "{} variants but {} priorities",
            variants.len(),
            priorities.len()
        )));
    }
    let records = records(variants, priorities);

    match format {
        OutputFormat::Tsv => {
            let mut writer = csv::WriterBuilder::new()
                .delimiter(b'\t')
                .from_writer(writer);
            writer.write_record(["id", "priority", "contributions"])?;
            for record in records {
                let priority = record
                    .priority
                    .map(|p| format!("{:.6}", p))
                    .unwrap_or_else(|| "NA".to_string());
                writer.write_record([
                    record.id,
                    priority.as_str(),
                    format_contributions(record.contributions).as_str(),
                ])?;
            }
            writer.flush()?;
        }
        OutputFormat::Json => {
            let mut writer = writer;
            serde_json::to_writer_pretty(&mut writer, &records)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
