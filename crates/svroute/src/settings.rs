use crate::output::OutputFormat;
use clap::{ArgAction, Args, Parser, Subcommand};
use log::LevelFilter;
use route_core::annotations::AnnotationPaths;
use route_core::dispatch::DispatcherType;
use route_core::error::SvError;
use route_core::settings::PrioritizationSettings;

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Prioritize structural variants by the genes and enhancers they rearrange.
    Prioritize(PrioritizeArgs),

    /// Print the default prioritization settings as JSON.
    Settings,
}

#[derive(Args, Clone, Debug)]
pub struct PrioritizeArgs {
    /// Contig names and lengths (chrom.sizes).
    #[arg(long = "contigs", value_name = "chrom_sizes")]
    contigs: String,

    /// Transcript table, one row per transcript.
    #[arg(long = "genes")]
    genes: String,

    /// Variant table.
    #[arg(long = "variants")]
    variants: String,

    /// Enhancer table.
    #[arg(long = "enhancers")]
    enhancers: Option<String>,

    /// TAD boundary table.
    #[arg(long = "tads")]
    tads: Option<String>,

    /// Dosage sensitive regions.
    #[arg(long = "dosage")]
    dosage: Option<String>,

    /// JSON settings. Flags below take precedence over the file.
    #[arg(long = "settings", value_name = "settings_json")]
    settings: Option<String>,

    /// How evaluation windows are chosen.
    #[arg(long = "dispatcher", value_enum)]
    dispatcher: Option<DispatcherType>,

    /// Credit genes only with enhancers of their own TAD.
    #[arg(long = "tad-aware")]
    tad_aware: bool,

    /// Variants prioritized concurrently.
    #[arg(long = "workers")]
    workers: Option<usize>,

    /// Give up on a variant after this many milliseconds.
    #[arg(long = "timeout-ms")]
    timeout_ms: Option<u64>,

    #[arg(long = "output-format", value_enum, default_value_t = OutputFormat::Tsv)]
    output_format: OutputFormat,

    /// Output path. Standard output if not provided.
    #[arg(short = 'o', long = "output")]
    output: Option<String>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// -v for debug, -vv for trace.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub contigs: String,
    pub variants: String,
    pub annotations: AnnotationPaths,
    pub prioritization: PrioritizationSettings,
    pub output_format: OutputFormat,
    pub output: Option<String>,
}

fn expand(path: &str) -> String {
    shellexpand::tilde(path).to_string()
}

impl TryFrom<PrioritizeArgs> for Settings {
    type Error = SvError;

    fn try_from(args: PrioritizeArgs) -> Result<Self, SvError> {
        let mut prioritization = match &args.settings {
            Some(path) => PrioritizationSettings::from_json_file(path)?,
            None => PrioritizationSettings::default(),
        };

        if let Some(dispatcher) = args.dispatcher {
            prioritization.dispatcher = dispatcher;
        }
        if args.tad_aware {
            prioritization.tad_aware_evaluation = true;
        }
        if let Some(workers) = args.workers {
            if workers == 0 {
                return Err(SvError::CliError("--workers must be positive".to_string()));
            }
            prioritization.workers = workers;
        }
        if args.timeout_ms.is_some() {
            prioritization.timeout_ms = args.timeout_ms;
        }

        if prioritization.dispatcher == DispatcherType::Tad && args.tads.is_none() {
            return Err(SvError::CliError(
                "The TAD dispatcher needs TAD boundaries (--tads)".to_string(),
            ));
        }

        Ok(Self {
            contigs: expand(&args.contigs),
            variants: expand(&args.variants),
            annotations: AnnotationPaths {
                genes: expand(&args.genes),
                enhancers: args.enhancers.as_deref().map(expand),
                tad_boundaries: args.tads.as_deref().map(expand),
                dosage_regions: args.dosage.as_deref().map(expand),
            },
            prioritization,
            output_format: args.output_format,
            output: args.output.as_deref().map(expand),
        })
    }
}
