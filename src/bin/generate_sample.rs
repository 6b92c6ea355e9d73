use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

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

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// Per-species means: (bill length mm, flipper length mm, body mass g).
const SPECIES: [(&str, f64, f64, f64); 3] = [
    ("Adelie", 38.8, 190.0, 3700.0),
    ("Chinstrap", 48.8, 196.0, 3733.0),
    ("Gentoo", 47.5, 217.0, 5076.0),
];
const ISLANDS: [&str; 3] = ["Biscoe", "Dream", "Torgersen"];
const ROWS: usize = 300;

struct Row {
    id: i64,
    species: &'static str,
    island: &'static str,
    bill_length_mm: Option<f64>,
    flipper_length_mm: Option<f64>,
    body_mass_g: Option<i64>,
    is_male: Option<bool>,
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    (0..ROWS)
        .map(|i| {
            let &(species, bill, flipper, mass) = rng.pick(&SPECIES);
            let island = *rng.pick(&ISLANDS);
            let bill = (rng.gauss(bill, 2.5) * 10.0).round() / 10.0;
            let flipper = rng.gauss(flipper, 6.0).round();
            let mass = (rng.gauss(mass, 350.0) / 25.0).round() as i64 * 25;

            // Sprinkle missing values so the profiling report has something to flag.
            Row {
                id: i as i64,
                species,
                island,
                bill_length_mm: (!rng.chance(0.03)).then_some(bill),
                flipper_length_mm: (!rng.chance(0.03)).then_some(flipper),
                body_mass_g: (!rng.chance(0.02)).then_some(mass),
                is_male: (!rng.chance(0.05)).then(|| rng.chance(0.5)),
            }
        })
        .collect()
}

fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record([
        "measurement_id",
        "species",
        "island",
        "bill_length_mm",
        "flipper_length_mm",
        "body_mass_g",
        "is_male",
    ])?;
    for r in rows {
        writer.write_record([
            r.id.to_string(),
            r.species.to_string(),
            r.island.to_string(),
            opt(r.bill_length_mm.map(|v| format!("{v:?}"))),
            opt(r.flipper_length_mm.map(|v| format!("{v:?}"))),
            opt(r.body_mass_g),
            opt(r.is_male.map(|b| if b { "True" } else { "False" })),
        ])?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("measurement_id", DataType::Int64, false),
        Field::new("species", DataType::Utf8, false),
        Field::new("island", DataType::Utf8, false),
        Field::new("bill_length_mm", DataType::Float64, true),
        Field::new("flipper_length_mm", DataType::Float64, true),
        Field::new("body_mass_g", DataType::Int64, true),
        Field::new("is_male", DataType::Boolean, true),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.id))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.species))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.island))),
        Arc::new(Float64Array::from_iter(rows.iter().map(|r| r.bill_length_mm))),
        Arc::new(Float64Array::from_iter(rows.iter().map(|r| r.flipper_length_mm))),
        Arc::new(Int64Array::from_iter(rows.iter().map(|r| r.body_mass_g))),
        Arc::new(BooleanArray::from_iter(rows.iter().map(|r| r.is_male))),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    write_csv(&rows, "sample_data.csv")?;
    write_parquet(&rows, "sample_data.parquet")?;

    println!(
        "Wrote {} rows to sample_data.csv and sample_data.parquet",
        rows.len()
    );
    Ok(())
}
