use crate::{dispatch::DispatcherType, error::SvError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrioritizationSettings {
    /// Fitness of an undisturbed gene.
    pub gene_factor: f64,

    /// Fitness of an undisturbed enhancer.
    pub enhancer_factor: f64,

    /// Bases upstream of the transcription start that make up the promoter.
    pub promoter_length: u64,

    /// Fitness added back to a gene whose promoter is hit. Clipped to 1.
    pub promoter_fitness_gain: f64,

    /// Bases added on both sides of the gene dispatch windows.
    pub gene_padding: u64,

    /// TAD boundaries below this stability are not loaded.
    pub tad_stability_threshold: f64,

    pub dispatcher: DispatcherType,

    pub tad_aware_evaluation: bool,

    /// Variants evaluated concurrently.
    pub workers: usize,

    /// Variants taking longer than this get an unknown priority.
    pub timeout_ms: Option<u64>,

    /// Log progress every this many variants.
    pub progress_tick: usize,
}

impl Default for PrioritizationSettings {
    fn default() -> Self {
        Self {
            gene_factor: 1.0,
            enhancer_factor: 1.0,
            promoter_length: 2000,
            promoter_fitness_gain: 0.6,
            gene_padding: 0,
            tad_stability_threshold: 0.8,
            dispatcher: DispatcherType::Gene,
            tad_aware_evaluation: false,
            workers: 2,
            timeout_ms: None,
            progress_tick: 5000,
        }
    }
}

impl PrioritizationSettings {
    /// Read settings from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: &str) -> Result<Self, SvError> {
        let path = shellexpand::tilde(path).to_string();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| SvError::IOError(format!("Cannot read settings {}: {}", path, e)))?;
        let settings: Self = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SvError> {
        if self.workers == 0 {
            return Err(SvError::ValueError("workers must be positive".to_string()));
        }
        if self.progress_tick == 0 {
            return Err(SvError::ValueError(
                "progress_tick must be positive".to_string(),
            ));
        }
        if self.gene_factor < 0.0 || self.enhancer_factor < 0.0 {
            return Err(SvError::ValueError(
                "gene_factor and enhancer_factor cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}
