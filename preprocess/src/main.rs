use clap::{Args, Parser, Subcommand};
use genome_prep::error::PrepError;
use genome_prep::{bed, fastq, fimo, meme, palindrome};
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(thiserror::Error, Debug)]
pub enum PreprocessError {
    #[error("Failed to process \"{path}\": {source}")]
    Input { path: String, source: PrepError },

    #[error("Cannot write \"{path}\": {source}")]
    Output { path: String, source: io::Error },

    #[error("Output \"{0}\" is the input file")]
    SameFile(String),
}

fn in_file(path: &Path) -> impl FnOnce(PrepError) -> PreprocessError + '_ {
    move |source| PreprocessError::Input {
        path: path.display().to_string(),
        source,
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "preprocess",
    about = "Preprocessing steps for motif and binding site analyses",
    long_about = "Single-purpose preprocessing steps for genomic text formats: \
                  MEME motif matrices, BED regions, FASTQ reads and FIMO motif matches. \
                  Every subcommand reads one input file and writes one output.",
    version,
    after_help = "Example usage:\n    \
                  preprocess check-palindrome motif.meme palindromes/motif.meme\n    \
                  preprocess gapped-motif motif.meme gapped.meme 72\n    \
                  preprocess filter-fastq-len reads.fastq 36 > reads.36.fastq\n\n\
                  Log verbosity is controlled with RUST_LOG (default: info).",
    color = clap::ColorChoice::Auto
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy a MEME motif file to OUTPUT if its motif is a reverse-complement palindrome
    CheckPalindrome(InputOutputArgs),

    /// Split a MEME motif in the middle with uniform gap positions
    GappedMotif(GappedMotifArgs),

    /// Replace every BED region by its middle base
    MiddlePoints(InputOutputArgs),

    /// Resolve FIMO matches reported on both strands at the same coordinates
    DedupMatches(InputOutputArgs),

    /// Convert FIMO matches of gapped motifs in nucleosomes to BED12
    MatchesToBed(MatchesToBedArgs),

    /// Keep FASTQ reads of one exact length
    FilterFastqLen(FilterFastqArgs),
}

#[derive(Args, Debug)]
struct InputOutputArgs {
    /// Path to the input file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Path for the output file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct GappedMotifArgs {
    /// Path to the MEME motif file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Path for the gapped MEME motif file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Number of uniform positions inserted in the middle of the motif
    #[arg(value_name = "GAP_SIZE")]
    gap_size: usize,
}

#[derive(Args, Debug)]
struct MatchesToBedArgs {
    /// Path to the FIMO match file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Path for the BED12 output
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Gap length of the scanned motif, appended to every feature name
    #[arg(value_name = "GAP_LENGTH")]
    gap_length: usize,
}

#[derive(Args, Debug)]
struct FilterFastqArgs {
    /// Path to the FASTQ file (plain or gzip)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Read length to keep
    #[arg(value_name = "LENGTH")]
    length: usize,

    /// Path for the filtered FASTQ, standard output when omitted
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,
}

fn ensure_distinct(input: &Path, output: &Path) -> Result<(), PreprocessError> {
    if let (Ok(input), Ok(existing)) = (fs::canonicalize(input), fs::canonicalize(output)) {
        if input == existing {
            return Err(PreprocessError::SameFile(output.display().to_string()));
        }
    }
    Ok(())
}

/// Refuses to overwrite the input and creates the output directory if needed
fn prepare_output(input: &Path, output: &Path) -> Result<(), PreprocessError> {
    ensure_distinct(input, output)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PreprocessError::Output {
            path: output.display().to_string(),
            source,
        })?;
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), PreprocessError> {
    match cli.command {
        Commands::CheckPalindrome(args) => {
            ensure_distinct(&args.input, &args.output)?;
            let copied = palindrome::copy_if_palindromic(&args.input, &args.output)
                .map_err(in_file(&args.input))?;
            if copied {
                info!(output = %args.output.display(), "motif is palindromic, copied");
            } else {
                info!(input = %args.input.display(), "motif is not palindromic, nothing written");
            }
        }
        Commands::GappedMotif(args) => {
            prepare_output(&args.input, &args.output)?;
            meme::write_gapped_motif(&args.input, &args.output, args.gap_size)
                .map_err(in_file(&args.input))?;
        }
        Commands::MiddlePoints(args) => {
            prepare_output(&args.input, &args.output)?;
            bed::write_middle_points(&args.input, &args.output).map_err(in_file(&args.input))?;
        }
        Commands::DedupMatches(args) => {
            prepare_output(&args.input, &args.output)?;
            fimo::write_deduplicated_matches(&args.input, &args.output)
                .map_err(in_file(&args.input))?;
        }
        Commands::MatchesToBed(args) => {
            prepare_output(&args.input, &args.output)?;
            fimo::write_matches_as_bed(&args.input, &args.output, args.gap_length)
                .map_err(in_file(&args.input))?;
        }
        Commands::FilterFastqLen(args) => {
            let result = match &args.output {
                Some(output) => {
                    prepare_output(&args.input, output)?;
                    let file = File::create(output).map_err(|source| PreprocessError::Output {
                        path: output.display().to_string(),
                        source,
                    })?;
                    fastq::filter_by_length(&args.input, args.length, BufWriter::new(file))
                }
                None => fastq::filter_by_length(
                    &args.input,
                    args.length,
                    BufWriter::new(io::stdout().lock()),
                ),
            };
            result.map_err(in_file(&args.input))?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();

    let start_time = Instant::now();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => {
            debug!(elapsed_secs = start_time.elapsed().as_secs_f64(), "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
