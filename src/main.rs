use clap::{Parser, Subcommand};
use mdsmap::validate::{DEFAULT_COVERAGE_CUTOFF, DEFAULT_OVERLAP_CUTOFF};
use mdsmap::{annotate, read_contig_lengths, write_patterns, MapDocument, MapSet, MdsMapError};
use mdsmap::{Position, ValidationParams};
use std::io::Write;

const INFO: &str = "\
mdsmap: annotate ciliate MIC/MAC rearrangement maps
usage: mdsmap [--help] <subcommand>

Subcommands:

  annotate: mark maps with contig validity and scrambling patterns.
  patterns: list the scrambling patterns of valid, scrambled maps.

";

#[derive(Parser)]
#[clap(name = "mdsmap")]
#[clap(about = INFO)]
struct Cli {
    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Annotate an MDS/IES map dataset with validity and scrambling information.
    ///
    /// A map is marked <valid/> when the MDS of every map targeting its MAC
    /// contig together cover that contig end to end, leaving no more than the
    /// coverage cutoff unexplained and overlapping only at pointers. A map is
    /// marked <scrambled order="..."/> when its MDS are assembled in a
    /// different order than they occur at the MIC locus (other than a simple
    /// reversal).
    ///
    /// Example:
    ///
    ///  $ mdsmap annotate maps.xml contig_lengths.tsv --output annotated.xml
    Annotate {
        /// the input MDS/IES map dataset, in XML
        #[arg(required = true)]
        input: String,
        /// a TSV file of MAC contig names and their lengths, sans telomeres
        #[arg(required = true)]
        contig_lengths: String,
        /// the output file path (if not set, uses standard out)
        #[arg(long)]
        output: Option<String>,
        /// basepairs of a MAC contig that may be unaccounted for before it is called invalid
        #[arg(long, default_value_t = DEFAULT_COVERAGE_CUTOFF)]
        coverage_cutoff: Position,
        /// fraction of an MDS that may be covered by its neighbour; only used, and only
        /// required to lie in [0, 1], with --apply-overlap-cutoff
        #[arg(long, default_value_t = DEFAULT_OVERLAP_CUTOFF)]
        overlap_cutoff: f64,
        /// use --overlap-cutoff in the overlap check instead of the fixed pointer overlap fraction
        #[arg(long, default_value_t = false)]
        apply_overlap_cutoff: bool,
        /// also write the names of contigs assembled from multiple MIC loci to this file
        #[arg(long)]
        multi_locus: Option<String>,
    },
    /// Write one line per valid, scrambled map of an annotated dataset:
    ///
    ///  <MIC locus>:<MAC contig>    <scrambling order>
    Patterns {
        /// the annotated map dataset, in XML
        #[arg(required = true)]
        input: String,
        /// the output file path (if not set, uses standard out)
        #[arg(long)]
        output: Option<String>,
    },
}

fn annotate_maps(
    input: &str,
    contig_lengths: &str,
    output: Option<&str>,
    params: ValidationParams,
    multi_locus: Option<&str>,
) -> Result<(), MdsMapError> {
    let lengths = read_contig_lengths(contig_lengths)?;
    let document = MapDocument::from_path(input)?;
    let (annotated, annotations) = annotate(&document, &lengths, &params)?;

    annotated.write_xml(output)?;

    if let Some(filepath) = multi_locus {
        let mut writer = mdsmap::file::OutputFile::new(filepath).writer()?;
        for contig in annotations.multi_locus_contigs.iter() {
            writeln!(writer, "{}", contig)?;
        }
        writer.flush()?;
    }
    Ok(())
}

fn run() -> Result<(), MdsMapError> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();

    match &cli.command {
        Some(Commands::Annotate {
            input,
            contig_lengths,
            output,
            coverage_cutoff,
            overlap_cutoff,
            apply_overlap_cutoff,
            multi_locus,
        }) => {
            let params = ValidationParams {
                coverage_cutoff: *coverage_cutoff,
                overlap_cutoff: *overlap_cutoff,
                apply_overlap_cutoff: *apply_overlap_cutoff,
            };
            annotate_maps(
                input,
                contig_lengths,
                output.as_deref(),
                params,
                multi_locus.as_deref(),
            )
        }
        Some(Commands::Patterns { input, output }) => {
            let map_set = MapSet::from_path(input)?;
            write_patterns(&map_set, output.as_deref())?;
            Ok(())
        }
        None => {
            println!("{}\n", INFO);
            std::process::exit(1);
        }
    }
}

fn main() {
    match run() {
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
