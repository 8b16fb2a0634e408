use crate::config::Config;
use crate::stats::EnumerationStats;
use csv::Writer;
use serde::Serialize;
use std::error::Error;
use std::fs;
use std::fs::File;
use std::path::Path;

/// Write summary.csv and summary.json into the output directory.
pub fn write_summary(stats: &EnumerationStats, config: &Config) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(&config.output_dir)?;

    let csv_path = Path::new(&config.output_dir).join("summary.csv");
    let mut wtr = Writer::from_path(csv_path)?;
    wtr.serialize(stats)?;
    wtr.flush()?;

    let json_path = Path::new(&config.output_dir).join("summary.json");
    fs::write(json_path, serde_json::to_string_pretty(stats)?)?;

    Ok(())
}

#[derive(Serialize)]
struct PrimeRecord {
    index: u64,
    prime: u64,
    gap: u64,
}

/// Streams enumerated primes into primes.csv, one record per prime with the
/// gap to its predecessor.
pub struct PrimeDump {
    wtr: Writer<File>,
    index: u64,
}

impl PrimeDump {
    pub fn create(config: &Config) -> Result<Self, Box<dyn Error>> {
        fs::create_dir_all(&config.output_dir)?;
        let path = Path::new(&config.output_dir).join("primes.csv");
        Ok(PrimeDump {
            wtr: Writer::from_path(path)?,
            index: 0,
        })
    }

    pub fn write(&mut self, prime: u64, gap: u64) -> Result<(), Box<dyn Error>> {
        self.index += 1;
        self.wtr.serialize(PrimeRecord {
            index: self.index,
            prime,
            gap,
        })?;
        Ok(())
    }

    pub fn finish(&mut self) -> Result<(), Box<dyn Error>> {
        self.wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn config_in(dir: &Path) -> Config {
        Config::parse_from([
            "primewheel",
            "--limit",
            "100",
            "--output-dir",
            dir.to_str().unwrap(),
        ])
    }

    #[test]
    fn summary_files_are_written() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config_in(tmp.path());

        let mut stats = EnumerationStats::new(100);
        for p in [2u64, 3, 5, 7] {
            stats.observe(p);
        }
        write_summary(&stats, &config).unwrap();

        let csv = fs::read_to_string(tmp.path().join("summary.csv")).unwrap();
        assert!(csv.contains("prime_count"));
        assert!(csv.contains(",4,"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(tmp.path().join("summary.json")).unwrap())
                .unwrap();
        assert_eq!(json["prime_count"], 4);
        assert_eq!(json["largest_prime"], 7);
    }

    #[test]
    fn prime_dump_records_index_prime_and_gap() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config_in(tmp.path());

        let mut dump = PrimeDump::create(&config).unwrap();
        dump.write(2, 0).unwrap();
        dump.write(3, 1).unwrap();
        dump.write(5, 2).unwrap();
        dump.finish().unwrap();

        let body = fs::read_to_string(tmp.path().join("primes.csv")).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines[0], "index,prime,gap");
        assert_eq!(lines[1], "1,2,0");
        assert_eq!(lines[3], "3,5,2");
    }
}
