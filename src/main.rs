mod config;
mod output;
mod stats;

use clap::Parser;
use indicatif::ProgressBar;
use primewheel::PrimeSieve;
use stats::EnumerationStats;

use crate::config::Config;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    if config.limit < 2 {
        eprintln!("Error: --limit must be at least 2.");
        std::process::exit(1);
    }
    if let Some(x) = config.prev {
        if x <= 2 {
            eprintln!("Error: --prev requires a value greater than 2 (no prime lies below 2).");
            std::process::exit(1);
        }
    }

    println!("Limit: {}", config.limit);
    println!(
        "Threads: {}",
        if config.threads == 0 { "auto".to_string() } else { config.threads.to_string() }
    );
    println!("Output Dir: {}", config.output_dir);

    let mut sieve = PrimeSieve::with_limit_and_threads(config.limit, config.threads);
    let mut stats = EnumerationStats::new(config.limit);
    let mut dump = if config.dump_primes {
        Some(output::PrimeDump::create(&config)?)
    } else {
        None
    };

    let bar = ProgressBar::new(config.limit);
    bar.set_style(
        indicatif::ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>12}/{len:12} ({eta})")?
            .progress_chars("#>-"),
    );

    // Throttled UI: positioning the bar per prime would dominate the walk.
    const BAR_BATCH: u64 = 8192;
    let mut since_update = 0u64;

    for p in sieve.primes() {
        if p > config.limit {
            break;
        }
        if let Some(dump) = dump.as_mut() {
            dump.write(p, stats.gap_to_previous(p))?;
        }
        stats.observe(p);

        since_update += 1;
        if since_update == BAR_BATCH {
            bar.set_position(p);
            since_update = 0;
        }
    }
    bar.finish_with_message("Enumeration complete.");

    if let Some(dump) = dump.as_mut() {
        dump.finish()?;
    }

    println!("Primes found: {}", stats.prime_count);
    println!("Largest prime: {}", stats.largest_prime);
    println!(
        "Widest gap: {} (after {})",
        stats.max_gap, stats.max_gap_after
    );

    for &x in &config.check {
        let verdict = if sieve.is_prime(x) { "prime" } else { "composite" };
        println!("check {x}: {verdict}");
    }
    if let Some(x) = config.next {
        println!("next prime after {x}: {}", sieve.next_prime(x));
    }
    if let Some(x) = config.prev {
        // Guarded above; x > 2 always has a predecessor.
        if let Some(p) = sieve.prev_prime(x) {
            println!("previous prime before {x}: {p}");
        }
    }

    println!("Writing results to disk...");
    output::write_summary(&stats, &config)?;
    println!("Done.");

    Ok(())
}
