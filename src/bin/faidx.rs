use clap::{Parser, Subcommand, ValueEnum};
use faidx_rs::{BoundsPolicy, Coordinates, FastaIndex, FastaReader};
use log::{error, info};
use simple_logger::init_with_level;

#[derive(Parser)]
#[command(name = "faidx")]
#[command(about = "Extract regions and sequence statistics from indexed FASTA files")]
struct Cli {
    /// Logging verbosity level
    #[arg(short = 'L', long, global = true, default_value = "info")]
    level: log::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, ValueEnum)]
enum Policy {
    /// Fail when a region runs past the end of its sequence
    Reject,
    /// Truncate such regions to the sequence length
    Clamp,
}

impl From<Policy> for BoundsPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Reject => BoundsPolicy::Reject,
            Policy::Clamp => BoundsPolicy::Clamp,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about sequences in a FASTA file (like samtools faidx -i)
    Info {
        /// FASTA file path, with its .fai alongside
        fasta: String,
    },
    /// Extract sequences from FASTA file (like samtools faidx and bedtools getfasta)
    Extract {
        /// FASTA file path
        fasta: String,
        /// Regions to extract (format: chr:start-end or chr for whole sequence)
        /// Uses 0-based half-open coordinates like bedtools (start inclusive, end exclusive)
        regions: Vec<String>,
        /// Use 1-based coordinates like samtools faidx instead of 0-based
        #[arg(short, long)]
        one_based: bool,
        /// Handling of regions that run past the end of a sequence
        #[arg(short, long, value_enum, default_value = "reject")]
        policy: Policy,
    },
    /// Print GC content, complexity and CpG count for each region
    Stats {
        /// FASTA file path
        fasta: String,
        /// Regions to summarise, same format as extract
        regions: Vec<String>,
        /// Use 1-based coordinates like samtools faidx instead of 0-based
        #[arg(short, long)]
        one_based: bool,
    },
    /// Test multithreaded access
    ThreadTest {
        /// FASTA file path
        fasta: String,
        /// Number of threads to use
        #[arg(short, long, default_value = "4")]
        threads: usize,
        /// Number of operations per thread
        #[arg(short, long, default_value = "100")]
        operations: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_with_level(cli.level)?;

    match cli.command {
        Commands::Info { fasta } => {
            show_info(&fasta)?;
        }
        Commands::Extract {
            fasta,
            regions,
            one_based,
            policy,
        } => {
            extract_sequences(&fasta, &regions, coordinates(one_based), policy.into())?;
        }
        Commands::Stats {
            fasta,
            regions,
            one_based,
        } => {
            region_stats(&fasta, &regions, coordinates(one_based))?;
        }
        Commands::ThreadTest {
            fasta,
            threads,
            operations,
        } => {
            thread_test(&fasta, threads, operations)?;
        }
    }

    Ok(())
}

fn coordinates(one_based: bool) -> Coordinates {
    if one_based {
        Coordinates::OneBased
    } else {
        Coordinates::ZeroBased
    }
}

fn show_info(fasta: &str) -> Result<(), Box<dyn std::error::Error>> {
    let index = FastaIndex::for_fasta(fasta)?;

    println!("FASTA file: {}", fasta);
    println!("Number of sequences: {}", index.num_sequences());
    println!();

    for record in index.records() {
        println!("{}\t{}", record.name, record.length);
    }

    Ok(())
}

fn extract_sequences(
    fasta: &str,
    regions: &[String],
    coords: Coordinates,
    policy: BoundsPolicy,
) -> Result<(), Box<dyn std::error::Error>> {
    let reader = FastaReader::open(fasta)?.with_policy(policy);

    for region in regions {
        match reader.fetch_region_with(region, coords) {
            Ok(sequence) => {
                println!(">{}", region);
                // Print sequence in 80-character lines like standard FASTA
                for line in sequence.as_bytes().chunks(80) {
                    println!("{}", String::from_utf8_lossy(line));
                }
            }
            Err(e) => {
                error!("Error extracting {}: {}", region, e);
            }
        }
    }

    Ok(())
}

fn region_stats(
    fasta: &str,
    regions: &[String],
    coords: Coordinates,
) -> Result<(), Box<dyn std::error::Error>> {
    let reader = FastaReader::open(fasta)?;

    println!("region\tlength\tgc\tcomplexity\tcpg");
    for region in regions {
        match reader.fetch_region_with(region, coords) {
            Ok(sequence) => {
                println!(
                    "{}\t{}\t{:.4}\t{:.4}\t{}",
                    region,
                    sequence.len,
                    sequence.gc_content(),
                    sequence.complexity(),
                    sequence.count_cpg()
                );
            }
            Err(e) => {
                error!("Error extracting {}: {}", region, e);
            }
        }
    }

    Ok(())
}

fn thread_test(
    fasta: &str,
    num_threads: usize,
    operations: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    use std::thread;
    use std::time::Instant;

    let index = FastaIndex::for_fasta(fasta)?;
    let sequences = index.sequence_names();

    if sequences.is_empty() {
        return Err("No sequences found in FASTA index".into());
    }

    info!(
        "Testing with {} threads, {} operations per thread...",
        num_threads, operations
    );

    let start = Instant::now();
    let mut handles = vec![];

    for thread_id in 0..num_threads {
        let index = index.clone();
        let sequences = sequences.clone();
        let fasta = fasta.to_string();

        let handle = thread::spawn(move || -> faidx_rs::FastaResult<(usize, usize)> {
            let reader = FastaReader::new(&index, &fasta)?;
            let mut success_count = 0;

            for i in 0..operations {
                let seq_name = &sequences[i % sequences.len()];
                let seq_len = index.sequence_length(seq_name).unwrap_or(0) as i64;

                if seq_len > 10 {
                    // Extract a small region
                    let start = (i as i64) % (seq_len - 10);
                    let end = start + 10;

                    if let Ok(seq) = reader.fetch(seq_name, start, end) {
                        if seq.len == 10 {
                            success_count += 1;
                        }
                    }
                }
            }

            Ok((thread_id, success_count))
        });

        handles.push(handle);
    }

    let mut total_success = 0;
    for handle in handles {
        let (thread_id, success_count) = handle
            .join()
            .map_err(|_| "worker thread panicked")??;
        println!(
            "Thread {}: {}/{} successful extractions",
            thread_id, success_count, operations
        );
        total_success += success_count;
    }

    let duration = start.elapsed();
    println!(
        "\nTotal: {}/{} successful extractions",
        total_success,
        num_threads * operations
    );
    println!("Time: {:?}", duration);
    println!(
        "Rate: {:.2} extractions/second",
        total_success as f64 / duration.as_secs_f64()
    );

    Ok(())
}
