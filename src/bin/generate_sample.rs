use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
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

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One generated row in the raw source schema.
struct Row {
    id: i64,
    name: String,
    sex: &'static str,
    age: Option<f64>,
    height: Option<f64>,
    weight: Option<f64>,
    team: &'static str,
    noc: &'static str,
    games: String,
    year: i64,
    season: &'static str,
    city: &'static str,
    sport: &'static str,
    event: String,
    medal: Option<&'static str>,
}

const COUNTRIES: [(&str, &str); 8] = [
    ("USA", "United States"),
    ("JPN", "Japan"),
    ("GBR", "Great Britain"),
    ("FRA", "France"),
    ("CHN", "China"),
    ("GER", "Germany"),
    ("KEN", "Kenya"),
    ("BRA", "Brazil"),
];

const GAMES: [(i64, &str); 6] = [
    (2000, "Sydney"),
    (2004, "Athina"),
    (2008, "Beijing"),
    (2012, "London"),
    (2016, "Rio de Janeiro"),
    (2020, "Tokyo"),
];

/// (sport, mean height cm, mean weight kg)
const SPORTS: [(&str, f64, f64); 7] = [
    ("Athletics", 177.0, 68.0),
    ("Swimming", 182.0, 74.0),
    ("Judo", 172.0, 78.0),
    ("Rowing", 186.0, 84.0),
    ("Gymnastics", 160.0, 52.0),
    ("Basketball", 195.0, 92.0),
    ("Weightlifting", 168.0, 85.0),
];

const FIRST_NAMES: [&str; 10] = [
    "Alex", "Maria", "Kenji", "Amina", "Lucas", "Sofia", "Wei", "Emma", "David", "Yuki",
];
const LAST_NAMES: [&str; 10] = [
    "Smith", "Tanaka", "Martin", "Okafor", "Silva", "Müller", "Chen", "Brown", "Kiprop", "Dubois",
];

fn generate(n_athletes: usize, rng: &mut SimpleRng) -> Vec<Row> {
    let mut rows = Vec::new();

    for id in 1..=n_athletes as i64 {
        let sex = if rng.next_f64() < 0.55 { "M" } else { "F" };
        let &(noc, team) = rng.pick(&COUNTRIES);
        let &(sport, mean_h, mean_w) = rng.pick(&SPORTS);
        let name = format!("{} {}", rng.pick(&FIRST_NAMES), rng.pick(&LAST_NAMES));
        let shift = if sex == "F" { -10.0 } else { 0.0 };

        // Some historical records lack measurements.
        let measured = rng.next_f64() > 0.15;
        let height = measured.then(|| rng.gauss(mean_h + shift, 7.0).round());
        let weight = measured.then(|| rng.gauss(mean_w + shift, 8.0).round());
        let base_age = rng.gauss(25.0, 4.0).round().max(15.0);

        // Each athlete competes in one or two consecutive Games.
        let first = (rng.next_u64() % GAMES.len() as u64) as usize;
        let appearances = 1 + (rng.next_u64() % 2) as usize;
        for (k, &(year, city)) in GAMES.iter().skip(first).take(appearances).enumerate() {
            let roll = rng.next_f64();
            let medal = match roll {
                r if r < 0.05 => Some("Gold"),
                r if r < 0.10 => Some("Silver"),
                r if r < 0.15 => Some("Bronze"),
                _ => None,
            };
            let gender = if sex == "M" { "Men's" } else { "Women's" };
            rows.push(Row {
                id,
                name: name.clone(),
                sex,
                age: (rng.next_f64() > 0.03).then_some(base_age + 4.0 * k as f64),
                height,
                weight,
                team,
                noc,
                games: format!("{year} Summer"),
                year,
                season: "Summer",
                city,
                sport,
                event: format!("{sport} {gender} Event {}", 1 + rng.next_u64() % 3),
                medal,
            });
        }
    }
    rows
}

fn write_csv(rows: &[Row], path: &Path) -> Result<()> {
    fn na(v: Option<f64>) -> String {
        v.map(|v| v.to_string()).unwrap_or_else(|| "NA".to_string())
    }

    let mut writer = csv::Writer::from_path(path).context("creating CSV output")?;
    writer.write_record([
        "ID", "Name", "Sex", "Age", "Height", "Weight", "Team", "NOC", "Games", "Year", "Season",
        "City", "Sport", "Event", "Medal",
    ])?;
    for r in rows {
        writer.write_record([
            r.id.to_string(),
            r.name.clone(),
            r.sex.to_string(),
            na(r.age),
            na(r.height),
            na(r.weight),
            r.team.to_string(),
            r.noc.to_string(),
            r.games.clone(),
            r.year.to_string(),
            r.season.to_string(),
            r.city.to_string(),
            r.sport.to_string(),
            r.event.clone(),
            r.medal.unwrap_or("NA").to_string(),
        ])?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &Path) -> Result<()> {
    let text = |f: &dyn Fn(&Row) -> Option<String>| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let float = |f: &dyn Fn(&Row) -> Option<f64>| -> ArrayRef {
        Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let int = |f: &dyn Fn(&Row) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("ID", DataType::Int64, false),
        Field::new("Name", DataType::Utf8, true),
        Field::new("Sex", DataType::Utf8, true),
        Field::new("Age", DataType::Float64, true),
        Field::new("Height", DataType::Float64, true),
        Field::new("Weight", DataType::Float64, true),
        Field::new("Team", DataType::Utf8, true),
        Field::new("NOC", DataType::Utf8, true),
        Field::new("Games", DataType::Utf8, true),
        Field::new("Year", DataType::Int64, false),
        Field::new("Season", DataType::Utf8, true),
        Field::new("City", DataType::Utf8, true),
        Field::new("Sport", DataType::Utf8, true),
        Field::new("Event", DataType::Utf8, true),
        Field::new("Medal", DataType::Utf8, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            int(&|r| r.id),
            text(&|r| Some(r.name.clone())),
            text(&|r| Some(r.sex.to_string())),
            float(&|r| r.age),
            float(&|r| r.height),
            float(&|r| r.weight),
            text(&|r| Some(r.team.to_string())),
            text(&|r| Some(r.noc.to_string())),
            text(&|r| Some(r.games.clone())),
            int(&|r| r.year),
            text(&|r| Some(r.season.to_string())),
            text(&|r| Some(r.city.to_string())),
            text(&|r| Some(r.sport.to_string())),
            text(&|r| Some(r.event.clone())),
            text(&|r| r.medal.map(str::to_string)),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "athlete_events.csv".to_string());
    let path = Path::new(&output);

    let mut rng = SimpleRng::new(42);
    let rows = generate(2000, &mut rng);

    match path.extension().and_then(|e| e.to_str()) {
        Some("parquet") | Some("pq") => write_parquet(&rows, path)?,
        _ => write_csv(&rows, path)?,
    }

    println!("Wrote {} athlete rows to {output}", rows.len());
    Ok(())
}
