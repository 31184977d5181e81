// 📄 Flat-File Store - Append-only CSV log of movements
//
// Format:
//   concept,date,amount,category
//   Un concepto,1999-12-31,12.34,
//   Un gasto,2000-01-01,23.45,4
//
// - category is empty for Income, the numeric code for Expense
// - every append opens, writes, flushes and closes the file
// - reads go through a per-instance cursor (re-open to start over)
// - no update, no delete

use crate::entities::{check_stored_amount, parse_amount, parse_date, Category, Movement, MovementKind, DATE_FORMAT};
use crate::error::{ReconstructionError, StoreError, StoreResult, ValidationError};
use crate::store::MovementStore;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Header written verbatim when the file is created
pub const CSV_HEADER: [&str; 4] = ["concept", "date", "amount", "category"];

// ============================================================================
// RECORDS
// ============================================================================

/// Row as written
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    concept: &'a str,
    date: String,
    amount: f64,
    category: Option<u8>,
}

impl<'a> From<&'a Movement> for CsvRow<'a> {
    fn from(movement: &'a Movement) -> Self {
        CsvRow {
            concept: movement.concept(),
            date: movement.date().format(DATE_FORMAT).to_string(),
            amount: movement.amount(),
            category: movement.category().map(Category::code),
        }
    }
}

/// Row as read - kept as text so every field goes through Movement validation
#[derive(Debug, Deserialize)]
struct CsvRecord {
    concept: String,
    date: String,
    amount: String,
    category: String,
}

impl CsvRecord {
    /// `index` is the zero-based data row; the header is line 1
    fn into_movement(self, index: usize) -> Result<Movement, ReconstructionError> {
        let at = format!("line {}", index + 2);
        let invalid = |source: ValidationError| ReconstructionError::Invalid {
            at: at.clone(),
            source,
        };

        let date = parse_date(&self.date).map_err(invalid)?;
        let amount = parse_amount(&self.amount)
            .and_then(check_stored_amount)
            .map_err(invalid)?;
        let kind = parse_kind(&self.category).map_err(invalid)?;

        Movement::new(self.concept, date, amount, kind).map_err(invalid)
    }
}

/// Empty ⇒ Income, known code ⇒ Expense, anything else fails.
/// The field is taken verbatim: " 4" is not a code.
fn parse_kind(field: &str) -> Result<MovementKind, ValidationError> {
    if field.is_empty() {
        return Ok(MovementKind::Income);
    }

    let code = field
        .parse::<i64>()
        .map_err(|_| ValidationError::UnknownCategory(field.to_string()))?;

    Ok(MovementKind::Expense(Category::from_code(code)?))
}

fn writer(file: File) -> csv::Writer<File> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file)
}

fn reader(path: &Path) -> StoreResult<csv::Reader<File>> {
    Ok(csv::ReaderBuilder::new().has_headers(true).from_path(path)?)
}

// ============================================================================
// CSV STORE
// ============================================================================

#[derive(Debug)]
pub struct CsvStore {
    path: PathBuf,
    cursor: usize,
}

impl CsvStore {
    /// Create the file with its header if missing; existing content is left untouched
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            let mut wtr = writer(File::create(&path)?);
            wtr.write_record(CSV_HEADER)?;
            wtr.flush()?;
            info!(path = %path.display(), "created movements file");
        }

        Ok(CsvStore { path, cursor: 0 })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Zero-based index of the next data row `read_next` will return
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Append one row and flush it before returning
    pub fn append(&self, movement: &Movement) -> StoreResult<()> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut wtr = writer(file);
        wtr.serialize(CsvRow::from(movement))?;
        wtr.flush()?;

        debug!(path = %self.path.display(), %movement, "appended movement");
        Ok(())
    }

    /// Next movement in file order, `None` once past the last row.
    /// A row that fails to decode is reported and the cursor moves past it.
    pub fn read_next(&mut self) -> StoreResult<Option<Movement>> {
        let index = self.cursor;
        let mut rdr = reader(&self.path)?;

        let Some(record) = rdr.deserialize::<CsvRecord>().nth(index) else {
            return Ok(None);
        };
        self.cursor += 1;

        let movement = record?.into_movement(index)?;
        Ok(Some(movement))
    }

    /// Every row, in file order. Does not move the cursor.
    pub fn read_all(&self) -> StoreResult<Vec<Movement>> {
        let mut rdr = reader(&self.path)?;

        rdr.deserialize::<CsvRecord>()
            .enumerate()
            .map(|(index, record)| -> StoreResult<Movement> {
                Ok(record?.into_movement(index)?)
            })
            .collect()
    }
}

impl MovementStore for CsvStore {
    fn submit(&mut self, movement: &Movement) -> StoreResult<Option<i64>> {
        if movement.id().is_some() {
            return Err(StoreError::Unsupported("update of a flat-file movement"));
        }
        self.append(movement)?;
        Ok(None)
    }

    fn fetch_all(&self) -> StoreResult<Vec<Movement>> {
        self.read_all()
    }

    fn fetch_between(&self, from: NaiveDate, to: NaiveDate) -> StoreResult<Vec<Movement>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|m| m.date() >= from && m.date() <= to)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test_movimientos.csv");
        (temp_dir, path)
    }

    #[test]
    fn test_open_creates_file_with_header_only() {
        let (_temp_dir, path) = setup();

        let store = CsvStore::open(&path).unwrap();

        assert_eq!(store.path(), path.as_path());
        assert_eq!(store.cursor(), 0);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "concept,date,amount,category\n"
        );
    }

    #[test]
    fn test_open_keeps_existing_content() {
        let (_temp_dir, path) = setup();
        let content = "concept,date,amount,category\nIngreso,1999-12-31,12.34,\n";
        fs::write(&path, content).unwrap();

        CsvStore::open(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn test_append_then_read_back_income_and_expense() {
        let (_temp_dir, path) = setup();
        let mut store = CsvStore::open(&path).unwrap();

        let income = Movement::income("Un concepto", date(1999, 12, 31), 12.34).unwrap();
        store.append(&income).unwrap();
        let expense = Movement::expense("Un gasto", date(2000, 1, 1), 23.45, Category::Extras).unwrap();
        store.append(&expense).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "concept,date,amount,category");
        assert_eq!(lines[1], "Un concepto,1999-12-31,12.34,");
        assert_eq!(lines[2], "Un gasto,2000-01-01,23.45,4");
        assert!(content.ends_with('\n'));

        assert_eq!(store.read_next().unwrap(), Some(income));
        assert_eq!(store.read_next().unwrap(), Some(expense));
        assert_eq!(store.read_next().unwrap(), None);
        assert_eq!(store.cursor(), 2);
    }

    #[test]
    fn test_read_income_and_expense() {
        let (_temp_dir, path) = setup();
        fs::write(
            &path,
            "concept,date,amount,category\nIngreso,1999-12-31,12.34,\nGasto,1999-01-01,55.0,4\n",
        )
        .unwrap();

        let mut store = CsvStore::open(&path).unwrap();

        let first = store.read_next().unwrap();
        assert_eq!(first, Some(Movement::income("Ingreso", date(1999, 12, 31), 12.34).unwrap()));

        let second = store.read_next().unwrap();
        assert_eq!(
            second,
            Some(Movement::expense("Gasto", date(1999, 1, 1), 55.0, Category::Extras).unwrap())
        );

        assert_eq!(store.read_next().unwrap(), None);
        assert_eq!(store.read_next().unwrap(), None);
        assert_eq!(store.cursor(), 2);
    }

    #[test]
    fn test_round_trip_every_category() {
        let (_temp_dir, path) = setup();
        let store = CsvStore::open(&path).unwrap();

        let mut written = vec![Movement::income("Nomina mayo", date(2024, 5, 1), 1500.0).unwrap()];
        for category in Category::ALL {
            written.push(
                Movement::expense(format!("Gasto {}", category), date(2024, 5, 2), 10.5, category).unwrap(),
            );
        }
        for movement in &written {
            store.append(movement).unwrap();
        }

        let mut reopened = CsvStore::open(&path).unwrap();
        let mut read = Vec::new();
        while let Some(movement) = reopened.read_next().unwrap() {
            read.push(movement);
        }

        assert_eq!(read, written);
        assert!(read.iter().all(|m| m.id().is_none()));
    }

    #[test]
    fn test_concept_with_comma_is_quoted() {
        let (_temp_dir, path) = setup();
        let mut store = CsvStore::open(&path).unwrap();
        let income = Movement::income("Loteria del niño, premio", date(2024, 1, 5), 1000.0).unwrap();

        store.append(&income).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"Loteria del niño, premio\",2024-01-05,1000.0,"));
        assert_eq!(store.read_next().unwrap(), Some(income));
    }

    #[test]
    fn test_unknown_category_fails_the_read() {
        let (_temp_dir, path) = setup();
        fs::write(
            &path,
            "concept,date,amount,category\nGasto raro,1999-01-01,5.0,9\nIngreso,1999-12-31,12.34,\n",
        )
        .unwrap();
        let mut store = CsvStore::open(&path).unwrap();

        let err = store.read_next().unwrap_err();
        match err {
            StoreError::Reconstruction(ReconstructionError::Invalid { at, source }) => {
                assert_eq!(at, "line 2");
                assert_eq!(source, ValidationError::UnknownCategory("9".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }

        // The bad row is not retried forever
        let next = store.read_next().unwrap();
        assert!(next.unwrap().is_income());
    }

    #[test]
    fn test_invalid_stored_values_fail_the_read() {
        let (_temp_dir, path) = setup();
        fs::write(
            &path,
            "concept,date,amount,category\nCorto,31/12/1999,1.0,\nno,1999-12-31,1.0,\nCero cero,1999-12-31,0,\n",
        )
        .unwrap();
        let store = CsvStore::open(&path).unwrap();

        assert!(matches!(
            store.read_all(),
            Err(StoreError::Reconstruction(ReconstructionError::Invalid {
                source: ValidationError::InvalidDate(_),
                ..
            }))
        ));

        let mut store = CsvStore::open(&path).unwrap();
        assert!(store.read_next().is_err());
        assert!(matches!(
            store.read_next(),
            Err(StoreError::Reconstruction(ReconstructionError::Invalid {
                source: ValidationError::ConceptTooShort { .. },
                ..
            }))
        ));
        assert!(matches!(
            store.read_next(),
            Err(StoreError::Reconstruction(ReconstructionError::Invalid {
                source: ValidationError::ZeroAmount,
                ..
            }))
        ));
    }

    #[test]
    fn test_category_field_is_not_trimmed() {
        let (_temp_dir, path) = setup();
        fs::write(&path, "concept,date,amount,category\nUn gasto,2000-01-01,23.45, 4\n").unwrap();
        let mut store = CsvStore::open(&path).unwrap();

        match store.read_next().unwrap_err() {
            StoreError::Reconstruction(ReconstructionError::Invalid { source, .. }) => {
                assert_eq!(source, ValidationError::UnknownCategory(" 4".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negative_stored_amount_fails_the_read() {
        let (_temp_dir, path) = setup();
        fs::write(&path, "concept,date,amount,category\nZapatillas,2024-05-06,-500.0,1\n").unwrap();
        let store = CsvStore::open(&path).unwrap();

        assert!(matches!(
            store.read_all(),
            Err(StoreError::Reconstruction(ReconstructionError::Invalid {
                source: ValidationError::NegativeStoredAmount(_),
                ..
            }))
        ));
    }

    #[test]
    fn test_read_all_does_not_move_cursor() {
        let (_temp_dir, path) = setup();
        let mut store = CsvStore::open(&path).unwrap();
        store.append(&Movement::income("Un concepto", date(1999, 12, 31), 12.34).unwrap()).unwrap();
        store.append(&Movement::income("Otro concepto", date(2000, 12, 31), 1.0).unwrap()).unwrap();

        assert_eq!(store.read_all().unwrap().len(), 2);
        assert_eq!(store.cursor(), 0);
        assert_eq!(store.read_next().unwrap().unwrap().concept(), "Un concepto");
    }

    #[test]
    fn test_append_to_missing_file_fails() {
        let (_temp_dir, path) = setup();
        let store = CsvStore::open(&path).unwrap();
        fs::remove_file(&path).unwrap();

        let result = store.append(&Movement::income("Un concepto", date(1999, 12, 31), 12.34).unwrap());

        assert!(matches!(result, Err(StoreError::Io(_))));
    }

    #[test]
    fn test_submit_and_fetch() {
        let (_temp_dir, path) = setup();
        let mut store = CsvStore::open(&path).unwrap();

        let old = Movement::income("Paga extra", date(2023, 12, 20), 800.0).unwrap();
        let new = Movement::expense("Zapatillas", date(2024, 5, 6), 57.5, Category::Necessity).unwrap();
        assert_eq!(store.submit(&old).unwrap(), None);
        assert_eq!(store.submit(&new).unwrap(), None);

        assert_eq!(store.fetch_all().unwrap(), vec![old, new.clone()]);
        assert_eq!(
            store.fetch_between(date(2024, 1, 1), date(2024, 12, 31)).unwrap(),
            vec![new]
        );
    }

    #[test]
    fn test_submit_with_id_is_unsupported() {
        let (_temp_dir, path) = setup();
        let mut store = CsvStore::open(&path).unwrap();
        let movement = Movement::income("Un concepto", date(1999, 12, 31), 12.34)
            .unwrap()
            .with_id(1);

        assert!(matches!(store.submit(&movement), Err(StoreError::Unsupported(_))));
        assert_eq!(store.read_all().unwrap().len(), 0);
    }
}
