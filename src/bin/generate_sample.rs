use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

/// Write a synthetic monthly business dataset as CSV and JSON.
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// Number of months, starting January 2023
    #[arg(short, long, default_value_t = 36)]
    months: u32,

    /// PRNG seed
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Probability that a month has no reported profit
    #[arg(long, default_value_t = 0.0)]
    missing: f64,

    /// Output path stem; `.csv` and `.json` are appended
    #[arg(short, long, default_value = "sample_data")]
    output: PathBuf,
}

#[derive(Serialize)]
struct MonthRecord {
    date: String,
    revenue: f64,
    expenses: f64,
    profit: Option<f64>,
    customers: u32,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Round to the nearest 100.
fn hundreds(v: f64) -> f64 {
    (v / 100.0).round() * 100.0
}

fn generate(args: &Args) -> Vec<MonthRecord> {
    let mut rng = SimpleRng::new(args.seed);

    (0..args.months)
        .map(|i| {
            let year = 2023 + i / 12;
            let month = i % 12 + 1;
            let t = i as f64;

            // Upward trend with a year-end peak.
            let season = (2.0 * std::f64::consts::PI * (t - 2.0) / 12.0).sin();
            let revenue = hundreds(45_000.0 + 2_000.0 * t + 4_000.0 * season + rng.gauss(0.0, 1_500.0));
            let expenses = hundreds(32_000.0 + 1_200.0 * t + 1_500.0 * season + rng.gauss(0.0, 1_000.0));
            let profit = (rng.next_f64() >= args.missing).then_some(revenue - expenses);
            let customers = (300.0 + 12.0 * t + rng.gauss(0.0, 20.0)).max(0.0).round() as u32;

            MonthRecord {
                date: format!("{year}-{month:02}"),
                revenue,
                expenses,
                profit,
                customers,
            }
        })
        .collect()
}

fn main() -> Result<()> {
    let args = Args::parse();
    let records = generate(&args);

    let csv_path = args.output.with_extension("csv");
    let mut writer = csv::Writer::from_path(&csv_path)
        .with_context(|| format!("creating {}", csv_path.display()))?;
    for record in &records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    let json_path = args.output.with_extension("json");
    let json = serde_json::to_string_pretty(&records)?;
    std::fs::write(&json_path, json).with_context(|| format!("writing {}", json_path.display()))?;

    println!(
        "Wrote {} months to {} and {}",
        records.len(),
        csv_path.display(),
        json_path.display()
    );
    Ok(())
}
