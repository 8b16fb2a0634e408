use clap::Parser;

/// A prime number oracle backed by an incrementally growing, bit-packed,
/// wheel-factorized segmented sieve.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Upper bound for prime enumeration.
    #[arg(short, long)]
    pub limit: u64,

    /// Worker threads for sieve computation (0 = auto, clamped to 32).
    #[arg(short, long, default_value_t = 0)]
    pub threads: usize,

    /// Directory for output files.
    #[arg(short, long, default_value = "results")]
    pub output_dir: String,

    /// Write every enumerated prime (with its gap to the predecessor) to primes.csv.
    #[arg(long)]
    pub dump_primes: bool,

    /// A comma-separated list of values to primality-test (e.g. "97,100,510529").
    #[arg(long, value_delimiter = ',')]
    pub check: Vec<u64>,

    /// Report the first prime strictly greater than this value.
    #[arg(long)]
    pub next: Option<u64>,

    /// Report the first prime strictly less than this value.
    #[arg(long)]
    pub prev: Option<u64>,
}
