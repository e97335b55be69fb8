use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::StringArray;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

/// Write a deterministic synthetic company → supplier table.
#[derive(Parser, Debug)]
#[command(name = "generate_sample", version, about, long_about = None)]
struct Args {
    /// Output file (.parquet or .csv).
    #[arg(default_value = "sample_relations.parquet")]
    output: PathBuf,

    /// Number of distinct companies.
    #[arg(long, default_value_t = 600)]
    companies: usize,

    /// Suppliers drawn per company.
    #[arg(long, default_value_t = 4)]
    suppliers: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }
}

/// One row; `None` cells become nulls (parquet) or empty fields (csv).
type Row = (Option<String>, Option<String>);

/// Suppliers are mostly drawn from the company's own neighbourhood in name
/// order, so sorted-order partitions pick up dense local structure.
fn generate(args: &Args) -> Vec<Row> {
    let mut rng = SimpleRng::new(args.seed);
    let names: Vec<String> = (0..args.companies).map(|i| format!("Company_{i:05}")).collect();
    let mut rows = Vec::with_capacity(args.companies * args.suppliers);

    for (i, company) in names.iter().enumerate() {
        for _ in 0..args.suppliers {
            let j = if rng.next_f64() < 0.8 {
                let offset = rng.below(9) as isize - 4;
                (i as isize + offset).rem_euclid(args.companies as isize) as usize
            } else {
                rng.below(args.companies)
            };
            let supplier = Some(names[j].clone());

            // ~2% incomplete rows to exercise missing-value filtering
            let roll = rng.next_f64();
            if roll < 0.01 {
                rows.push((Some(company.clone()), None));
            } else if roll < 0.02 {
                rows.push((None, supplier));
            } else {
                rows.push((Some(company.clone()), supplier));
            }
        }
    }
    rows
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("CompanyName", DataType::Utf8, true),
        Field::new("Suppliers", DataType::Utf8, true),
    ]));
    let companies = StringArray::from(rows.iter().map(|r| r.0.as_deref()).collect::<Vec<_>>());
    let suppliers = StringArray::from(rows.iter().map(|r| r.1.as_deref()).collect::<Vec<_>>());

    let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(companies), Arc::new(suppliers)])
        .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating output file")?;
    writer.write_record(["CompanyName", "Suppliers"])?;
    for (company, supplier) in rows {
        writer.write_record([
            company.as_deref().unwrap_or(""),
            supplier.as_deref().unwrap_or(""),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    if args.companies == 0 {
        bail!("--companies must be at least 1");
    }
    let rows = generate(&args);

    let ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "parquet" | "pq" => write_parquet(&args.output, &rows)?,
        "csv" => write_csv(&args.output, &rows)?,
        other => bail!("Unsupported output extension: .{other}"),
    }

    println!(
        "Wrote {} relationships between {} companies to {}",
        rows.len(),
        args.companies,
        args.output.display()
    );
    Ok(())
}
