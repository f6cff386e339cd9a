use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;
use std::sync::OnceLock;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{AthleteRecord, Dataset, Medal, Sex};

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Required source columns. Each entry lists the raw name first, then the
/// normalized name that exported files carry.
const REQUIRED_COLUMNS: [&[&str]; 15] = [
    &["ID"],
    &["Name"],
    &["Sex"],
    &["Age"],
    &["Height"],
    &["Weight"],
    &["Team", "Team Name"],
    &["NOC", "Country"],
    &["Games"],
    &["Year"],
    &["Season"],
    &["City"],
    &["Sport"],
    &["Event"],
    &["Medal"],
];

/// Raw names of required columns absent from `headers`.
fn missing_columns(headers: &[&str]) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|names| !headers.iter().any(|h| names.contains(&h.trim())))
        .map(|names| names[0].to_string())
        .collect()
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io(e),
    })
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

static DATASET: OnceLock<Dataset> = OnceLock::new();

/// Load the dataset once for the lifetime of the process.
///
/// The first successful call parses `path`; every later call returns the same
/// dataset without touching the filesystem, whatever path it is given.
pub fn load_cached(path: &Path) -> Result<&'static Dataset, LoadError> {
    if let Some(ds) = DATASET.get() {
        log::debug!("Dataset already loaded, ignoring {}", path.display());
        return Ok(ds);
    }
    let dataset = load_file(path)?;
    Ok(DATASET.get_or_init(|| dataset))
}

/// Load an athlete dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – the raw `athlete_events.csv` layout, `NA` for missing values
/// * `.json`    – `[{ "ID": 1, "Name": "...", "NOC": "CHN", ... }, ...]`
/// * `.parquet` – same columns, numeric columns may be int or float
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    let dataset = Dataset::from_records(records);
    if dataset.is_empty() {
        log::warn!("{} contains no athlete rows", path.display());
    }
    log::info!(
        "Loaded {} athlete rows ({} years, {} sports, {} countries) from {}",
        dataset.len(),
        dataset.years.len(),
        dataset.sports.len(),
        dataset.countries.len(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Vec<AthleteRecord>, LoadError> {
    let mut reader = csv::Reader::from_reader(open(path)?);

    let headers = reader.headers()?.clone();
    let missing = missing_columns(&headers.iter().collect::<Vec<_>>());
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns(missing));
    }

    let records = reader
        .deserialize::<AthleteRecord>()
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!("Parsed {} CSV rows", records.len());
    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`).
fn load_json(path: &Path) -> Result<Vec<AthleteRecord>, LoadError> {
    let root: JsonValue = serde_json::from_reader(BufReader::new(open(path)?))?;

    let rows = root.as_array().ok_or_else(|| LoadError::InvalidColumn {
        column: "<root>".to_string(),
        reason: "expected top-level JSON array".to_string(),
    })?;

    if let Some(first) = rows.first().and_then(|r| r.as_object()) {
        let keys: Vec<&str> = first.keys().map(String::as_str).collect();
        let missing = missing_columns(&keys);
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }
    }

    let records: Vec<AthleteRecord> = serde_json::from_value(root)?;
    log::debug!("Parsed {} JSON records", records.len());
    Ok(records)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the athlete columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`): every column is cast to the type the
/// record needs, so integer heights or float years are accepted.
fn load_parquet(path: &Path) -> Result<Vec<AthleteRecord>, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;

    let schema = builder.schema().clone();
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    let missing = missing_columns(&names);
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns(missing));
    }

    let reader = builder.build()?;
    let mut records = Vec::new();
    for batch in reader {
        let batch = batch?;
        append_batch(&batch, &mut records)?;
    }
    log::debug!("Parsed {} parquet rows", records.len());
    Ok(records)
}

/// Decoded columns of one record batch.
struct BatchColumns {
    id: Vec<Option<i64>>,
    name: ArrayRef,
    sex: ArrayRef,
    age: ArrayRef,
    height: ArrayRef,
    weight: ArrayRef,
    team: ArrayRef,
    noc: ArrayRef,
    games: ArrayRef,
    year: Vec<Option<i64>>,
    season: ArrayRef,
    city: ArrayRef,
    sport: ArrayRef,
    event: ArrayRef,
    medal: ArrayRef,
}

fn append_batch(batch: &RecordBatch, out: &mut Vec<AthleteRecord>) -> Result<(), LoadError> {
    let text = |names: &[&str]| column_as(batch, names, &DataType::Utf8);
    let float = |names: &[&str]| column_as(batch, names, &DataType::Float64);
    let int = |names: &[&str]| whole_numbers(batch, names);

    let cols = BatchColumns {
        id: int(&["ID"])?,
        name: text(&["Name"])?,
        sex: text(&["Sex"])?,
        age: float(&["Age"])?,
        height: float(&["Height"])?,
        weight: float(&["Weight"])?,
        team: text(&["Team", "Team Name"])?,
        noc: text(&["NOC", "Country"])?,
        games: text(&["Games"])?,
        year: int(&["Year"])?,
        season: text(&["Season"])?,
        city: text(&["City"])?,
        sport: text(&["Sport"])?,
        event: text(&["Event"])?,
        medal: text(&["Medal"])?,
    };

    out.reserve(batch.num_rows());
    for row in 0..batch.num_rows() {
        let id = required_int(&cols.id, row, "ID")?;
        let year = required_int(&cols.year, row, "Year")?;
        out.push(AthleteRecord {
            id: u64::try_from(id).map_err(|_| LoadError::InvalidColumn {
                column: "ID".to_string(),
                reason: format!("row {row}: negative id {id}"),
            })?,
            name: string_at(&cols.name, row).unwrap_or_default(),
            sex: string_at(&cols.sex, row).and_then(|s| Sex::parse(&s)),
            age: float_at(&cols.age, row),
            height: float_at(&cols.height, row),
            weight: float_at(&cols.weight, row),
            team_name: string_at(&cols.team, row).unwrap_or_default(),
            country: string_at(&cols.noc, row).unwrap_or_default(),
            games: string_at(&cols.games, row).unwrap_or_default(),
            year: i32::try_from(year).map_err(|_| LoadError::InvalidColumn {
                column: "Year".to_string(),
                reason: format!("row {row}: year {year} out of range"),
            })?,
            season: string_at(&cols.season, row).unwrap_or_default(),
            city: string_at(&cols.city, row).unwrap_or_default(),
            sport: string_at(&cols.sport, row).unwrap_or_default(),
            event: string_at(&cols.event, row).unwrap_or_default(),
            medal: medal_at(&cols.medal, row)?,
            bmi: None,
        });
    }
    Ok(())
}

// -- Arrow helpers --

fn column_index(batch: &RecordBatch, names: &[&str]) -> Result<usize, LoadError> {
    let schema = batch.schema();
    names
        .iter()
        .find_map(|n| schema.index_of(n).ok())
        .ok_or_else(|| LoadError::MissingColumns(vec![names[0].to_string()]))
}

/// Find the first matching column and cast it to `to`.
fn column_as(batch: &RecordBatch, names: &[&str], to: &DataType) -> Result<ArrayRef, LoadError> {
    let idx = column_index(batch, names)?;
    cast(batch.column(idx), to).map_err(|e| LoadError::InvalidColumn {
        column: names[0].to_string(),
        reason: e.to_string(),
    })
}

/// Integer column that may be stored as int, float or text. Non-integral
/// values are rejected rather than truncated.
fn whole_numbers(batch: &RecordBatch, names: &[&str]) -> Result<Vec<Option<i64>>, LoadError> {
    let idx = column_index(batch, names)?;
    if batch.column(idx).data_type().is_integer() {
        let col = column_as(batch, names, &DataType::Int64)?;
        return Ok(col.as_primitive::<Int64Type>().iter().collect());
    }

    let col = column_as(batch, names, &DataType::Float64)?;
    col.as_primitive::<Float64Type>()
        .iter()
        .enumerate()
        .map(|(row, v)| match v {
            None => Ok(None),
            Some(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(Some(v as i64)),
            Some(v) => Err(LoadError::InvalidColumn {
                column: names[0].to_string(),
                reason: format!("row {row}: {v} is not a whole number"),
            }),
        })
        .collect()
}

fn string_at(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    let value = col.as_string::<i32>().value(row).trim();
    if value.is_empty() || value == "NA" {
        None
    } else {
        Some(value.to_string())
    }
}

fn float_at(col: &ArrayRef, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    Some(col.as_primitive::<Float64Type>().value(row)).filter(|v| v.is_finite())
}

fn medal_at(col: &ArrayRef, row: usize) -> Result<Option<Medal>, LoadError> {
    string_at(col, row)
        .map(|s| {
            Medal::parse(&s).ok_or_else(|| LoadError::InvalidColumn {
                column: "Medal".to_string(),
                reason: format!("row {row}: unknown medal '{s}'"),
            })
        })
        .transpose()
}

fn required_int(col: &[Option<i64>], row: usize, name: &str) -> Result<i64, LoadError> {
    col[row].ok_or_else(|| LoadError::InvalidColumn {
        column: name.to_string(),
        reason: format!("row {row}: null value"),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, LargeStringArray, StringArray};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;

    pub(crate) const HEADER: &str =
        "ID,Name,Sex,Age,Height,Weight,Team,NOC,Games,Year,Season,City,Sport,Event,Medal";

    pub(crate) const SAMPLE_CSV: &str = "\
ID,Name,Sex,Age,Height,Weight,Team,NOC,Games,Year,Season,City,Sport,Event,Medal
1,A Dijiang,M,24,180,80,China,CHN,1992 Summer,1992,Summer,Barcelona,Basketball,Basketball Men's Basketball,NA
2,A Lamusi,M,23,170,60,China,CHN,2012 Summer,2012,Summer,London,Judo,Judo Men's Extra-Lightweight,NA
3,Gunnar Nielsen Aaby,M,24,NA,NA,Denmark,DEN,1920 Summer,1920,Summer,Antwerpen,Football,Football Men's Football,NA
4,Edgar Lindenau Aabye,M,34,NA,NA,Denmark/Sweden,DEN,1900 Summer,1900,Summer,Paris,Tug-Of-War,Tug-Of-War Men's Tug-Of-War,Gold
5,Christine Jacoba Aaftink,F,21,185,82,Netherlands,NED,1988 Winter,1988,Winter,Calgary,Speed Skating,Speed Skating Women's 500 metres,NA
";

    pub(crate) fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("tempfile");
        file.write_all(contents.as_bytes()).expect("write");
        file.flush().expect("flush");
        file
    }

    #[test]
    fn test_load_csv_row_count_and_renames() {
        let file = write_temp(".csv", SAMPLE_CSV);
        let ds = load_file(file.path()).unwrap();

        assert_eq!(ds.len(), 5);
        assert_eq!(ds.records[0].country, "CHN");
        assert_eq!(ds.records[3].team_name, "Denmark/Sweden");
        assert_eq!(ds.records[3].medal, Some(Medal::Gold));
        assert_eq!(ds.records[4].sex, Some(Sex::Female));
        assert_eq!(ds.countries, vec!["CHN", "DEN", "NED"]);
    }

    #[test]
    fn test_load_csv_computes_bmi() {
        let file = write_temp(".csv", SAMPLE_CSV);
        let ds = load_file(file.path()).unwrap();

        let bmi = ds.records[0].bmi.unwrap();
        assert!((bmi - 24.69).abs() < 0.01);
        // Height/Weight given as NA
        assert_eq!(ds.records[2].height, None);
        assert_eq!(ds.records[2].bmi, None);
    }

    #[test]
    fn test_load_csv_empty_cells_are_missing() {
        let csv = format!(
            "{HEADER}\n9,Nobody,,,,,Team,USA,2000 Summer,2000,Summer,Sydney,Judo,Judo,\n"
        );
        let file = write_temp(".csv", &csv);
        let ds = load_file(file.path()).unwrap();

        let rec = &ds.records[0];
        assert_eq!(rec.sex, None);
        assert_eq!(rec.age, None);
        assert_eq!(rec.medal, None);
        assert_eq!(rec.bmi, None);
    }

    #[test]
    fn test_load_csv_missing_columns() {
        let file = write_temp(".csv", "ID,Name,Sex\n1,A,M\n");
        match load_file(file.path()) {
            Err(LoadError::MissingColumns(cols)) => {
                assert!(cols.contains(&"NOC".to_string()));
                assert!(cols.contains(&"Medal".to_string()));
                assert!(!cols.contains(&"Name".to_string()));
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_load_csv_bad_number_is_malformed() {
        let csv = format!(
            "{HEADER}\n1,A,M,old,180,80,China,CHN,1992 Summer,1992,Summer,Barcelona,Judo,Judo,NA\n"
        );
        let file = write_temp(".csv", &csv);
        assert!(matches!(load_file(file.path()), Err(LoadError::Csv(_))));
    }

    #[test]
    fn test_load_csv_header_only() {
        let file = write_temp(".csv", &format!("{HEADER}\n"));
        let ds = load_file(file.path()).unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.year_bounds(), None);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_file(Path::new("/definitely/not/here/athlete_events.csv")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn test_load_unsupported_extension() {
        let file = write_temp(".xlsx", "");
        assert!(matches!(
            load_file(file.path()),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn test_load_json_records() {
        let json = r#"[
            {"ID": 1, "Name": "A", "Sex": "F", "Age": 21, "Height": 170, "Weight": 70,
             "Team": "Japan", "NOC": "JPN", "Games": "2000 Summer", "Year": 2000,
             "Season": "Summer", "City": "Sydney", "Sport": "Judo", "Event": "Judo Women's", "Medal": "Silver"},
            {"ID": 2, "Name": "B", "Sex": "M", "Age": null, "Height": null, "Weight": 80,
             "Team": "Japan", "NOC": "JPN", "Games": "2000 Summer", "Year": 2000,
             "Season": "Summer", "City": "Sydney", "Sport": "Judo", "Event": "Judo Men's", "Medal": null}
        ]"#;
        let file = write_temp(".json", json);
        let ds = load_file(file.path()).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].medal, Some(Medal::Silver));
        assert!(ds.records[0].bmi.is_some());
        assert_eq!(ds.records[1].age, None);
        assert_eq!(ds.records[1].bmi, None);
    }

    #[test]
    fn test_load_json_missing_columns() {
        let file = write_temp(".json", r#"[{"ID": 1, "Name": "A"}]"#);
        assert!(matches!(load_file(file.path()), Err(LoadError::MissingColumns(_))));
    }

    fn text(values: Vec<Option<&str>>) -> ArrayRef {
        Arc::new(StringArray::from(values))
    }

    /// Two athletes in the raw column layout, ints for ID/Year and floats
    /// for the measurements.
    fn parquet_columns() -> Vec<(&'static str, ArrayRef)> {
        vec![
            ("ID", Arc::new(Int64Array::from(vec![1, 2]))),
            ("Name", text(vec![Some("A"), Some("B")])),
            ("Sex", text(vec![Some("M"), None])),
            ("Age", Arc::new(Float64Array::from(vec![Some(22.0), None]))),
            ("Height", Arc::new(Float64Array::from(vec![Some(180.0), None]))),
            ("Weight", Arc::new(Float64Array::from(vec![Some(80.0), Some(60.0)]))),
            ("Team", text(vec![Some("Japan"), Some("USA")])),
            ("NOC", text(vec![Some("JPN"), Some("USA")])),
            ("Games", text(vec![Some("2000 Summer"), Some("2004 Summer")])),
            ("Year", Arc::new(Int64Array::from(vec![2000, 2004]))),
            ("Season", text(vec![Some("Summer"), Some("Summer")])),
            ("City", text(vec![Some("Sydney"), Some("Athina")])),
            ("Sport", text(vec![Some("Judo"), Some("Swimming")])),
            ("Event", text(vec![Some("Judo Men's"), Some("Swimming Men's")])),
            ("Medal", text(vec![Some("Bronze"), None])),
        ]
    }

    fn replace_column(columns: &mut [(&'static str, ArrayRef)], name: &str, array: ArrayRef) {
        let slot = columns.iter_mut().find(|(n, _)| *n == name).unwrap();
        slot.1 = array;
    }

    fn write_parquet(columns: Vec<(&'static str, ArrayRef)>) -> tempfile::NamedTempFile {
        let fields: Vec<Field> = columns
            .iter()
            .map(|(name, array)| Field::new(*name, array.data_type().clone(), true))
            .collect();
        let schema = Arc::new(Schema::new(fields));
        let arrays = columns.into_iter().map(|(_, array)| array).collect();
        let batch = RecordBatch::try_new(schema.clone(), arrays).unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let sink = file.as_file().try_clone().unwrap();
        let mut writer = ArrowWriter::try_new(sink, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        file
    }

    #[test]
    fn test_load_parquet() {
        let file = write_parquet(parquet_columns());

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].country, "JPN");
        assert_eq!(ds.records[0].medal, Some(Medal::Bronze));
        assert!((ds.records[0].bmi.unwrap() - 24.69).abs() < 0.01);
        assert_eq!(ds.records[1].sex, None);
        assert_eq!(ds.records[1].bmi, None);
        assert_eq!(ds.years, vec![2000, 2004]);
    }

    #[test]
    fn test_load_parquet_integer_measurements_and_large_strings() {
        let large = |values: Vec<Option<&str>>| -> ArrayRef {
            Arc::new(LargeStringArray::from(values))
        };
        let mut columns = parquet_columns();
        replace_column(&mut columns, "Age", Arc::new(Int64Array::from(vec![Some(22), None])));
        replace_column(&mut columns, "Height", Arc::new(Int64Array::from(vec![Some(180), None])));
        replace_column(&mut columns, "Weight", Arc::new(Int64Array::from(vec![80, 60])));
        replace_column(&mut columns, "Name", large(vec![Some("A"), Some("B")]));
        replace_column(&mut columns, "NOC", large(vec![Some("JPN"), Some("USA")]));
        replace_column(&mut columns, "Medal", large(vec![Some("Gold"), Some("NA")]));
        let file = write_parquet(columns);

        let ds = load_file(file.path()).unwrap();
        let first = &ds.records[0];
        assert_eq!(first.name, "A");
        assert_eq!(first.age, Some(22.0));
        assert_eq!(first.height, Some(180.0));
        assert_eq!(first.weight, Some(80.0));
        assert!((first.bmi.unwrap() - 24.69).abs() < 0.01);
        assert_eq!(first.medal, Some(Medal::Gold));
        assert_eq!(ds.records[1].medal, None);
        assert_eq!(ds.records[1].weight, Some(60.0));
        assert_eq!(ds.countries, vec!["JPN", "USA"]);
    }

    #[test]
    fn test_load_parquet_whole_float_years() {
        let mut columns = parquet_columns();
        replace_column(&mut columns, "ID", Arc::new(Float64Array::from(vec![1.0, 2.0])));
        replace_column(&mut columns, "Year", Arc::new(Float64Array::from(vec![2000.0, 2004.0])));
        let file = write_parquet(columns);

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.records[1].id, 2);
        assert_eq!(ds.years, vec![2000, 2004]);
    }

    #[test]
    fn test_load_parquet_fractional_year_is_invalid() {
        let mut columns = parquet_columns();
        replace_column(&mut columns, "Year", Arc::new(Float64Array::from(vec![2000.7, 2004.0])));
        let file = write_parquet(columns);

        match load_file(file.path()) {
            Err(LoadError::InvalidColumn { column, reason }) => {
                assert_eq!(column, "Year");
                assert!(reason.contains("row 0"), "{reason}");
            }
            other => panic!("expected InvalidColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_load_parquet_unknown_medal_is_invalid() {
        let mut columns = parquet_columns();
        replace_column(&mut columns, "Medal", text(vec![Some("Bronze"), Some("gold")]));
        let file = write_parquet(columns);

        match load_file(file.path()) {
            Err(LoadError::InvalidColumn { column, reason }) => {
                assert_eq!(column, "Medal");
                assert!(reason.contains("'gold'"), "{reason}");
            }
            other => panic!("expected InvalidColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_load_cached_returns_first_dataset() {
        let file = write_temp(".csv", SAMPLE_CSV);
        let first = load_cached(file.path()).unwrap();
        // The file no longer matters once cached.
        let second = load_cached(Path::new("/definitely/not/here.csv")).unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(second.len(), 5);
    }
}
