// 🗄️ Relational Store - SQLite table of movements
//
// One row per movement, keyed by a surrogate integer id.
// `tipo_movimiento` discriminates the variant: "I" = Income, "G" = Expense.
// `categoria` holds the category code for expenses and NULL for incomes.
//
// Each operation opens its own connection and closes it on return.

use crate::entities::{check_stored_amount, parse_date, Category, Movement, MovementKind, DATE_FORMAT};
use crate::error::{ReconstructionError, StoreError, StoreResult, ValidationError};
use crate::store::MovementStore;
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SELECT_MOVEMENTS: &str =
    "SELECT id, tipo_movimiento, concepto, fecha, cantidad, categoria FROM movimientos";

pub fn setup_database(conn: &Connection) -> rusqlite::Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS movimientos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tipo_movimiento TEXT NOT NULL CHECK (tipo_movimiento IN ('I', 'G')),
            concepto TEXT NOT NULL,
            fecha TEXT NOT NULL,
            cantidad REAL NOT NULL CHECK (cantidad > 0),
            categoria INTEGER,
            CHECK (
                (tipo_movimiento = 'I' AND categoria IS NULL)
                OR (tipo_movimiento = 'G' AND categoria BETWEEN 1 AND 4)
            )
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_movimientos_fecha ON movimientos(fecha)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// ROW MAPPING
// ============================================================================

/// Raw column values, before any validation
#[derive(Debug)]
struct MovementRow {
    id: i64,
    tipo_movimiento: String,
    concepto: String,
    fecha: String,
    cantidad: f64,
    categoria: Option<i64>,
}

impl MovementRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(MovementRow {
            id: row.get(0)?,
            tipo_movimiento: row.get(1)?,
            concepto: row.get(2)?,
            fecha: row.get(3)?,
            cantidad: row.get(4)?,
            categoria: row.get(5)?,
        })
    }

    fn into_movement(self) -> Result<Movement, ReconstructionError> {
        let at = format!("id {}", self.id);
        let invalid = |source: ValidationError| ReconstructionError::Invalid {
            at: at.clone(),
            source,
        };

        let kind = match self.tipo_movimiento.as_str() {
            "I" => MovementKind::Income,
            "G" => {
                let code = self
                    .categoria
                    .ok_or_else(|| invalid(ValidationError::UnknownCategory("NULL".to_string())))?;
                MovementKind::Expense(Category::from_code(code).map_err(invalid)?)
            }
            other => {
                return Err(ReconstructionError::UnknownKind {
                    at: at.clone(),
                    tag: other.to_string(),
                })
            }
        };

        let date = parse_date(&self.fecha).map_err(invalid)?;
        let amount = check_stored_amount(self.cantidad).map_err(invalid)?;
        let movement = Movement::new(self.concepto, date, amount, kind).map_err(invalid)?;

        Ok(movement.with_id(self.id))
    }
}

// ============================================================================
// SQLITE STORE
// ============================================================================

#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Open (or create) the database file and make sure the table exists
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let store = SqliteStore {
            path: path.as_ref().to_path_buf(),
        };

        let conn = store.connect()?;
        setup_database(&conn)?;
        info!(path = %store.path.display(), "movements database ready");

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> StoreResult<Connection> {
        Ok(Connection::open(&self.path)?)
    }

    /// Insert when the movement has no id, update the matching row otherwise.
    /// Returns the row id in both cases.
    pub fn save(&self, movement: &Movement) -> StoreResult<i64> {
        let conn = self.connect()?;
        let kind = movement.kind();
        let fecha = movement.date().format(DATE_FORMAT).to_string();
        let categoria = kind.category().map(Category::code);

        match movement.id() {
            None => {
                conn.execute(
                    "INSERT INTO movimientos (tipo_movimiento, concepto, fecha, cantidad, categoria)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![kind.tag(), movement.concept(), fecha, movement.amount(), categoria],
                )?;
                let id = conn.last_insert_rowid();
                debug!(id, %movement, "inserted movement");
                Ok(id)
            }
            Some(id) => {
                let changed = conn.execute(
                    "UPDATE movimientos
                     SET tipo_movimiento = ?1, concepto = ?2, fecha = ?3, cantidad = ?4, categoria = ?5
                     WHERE id = ?6",
                    params![kind.tag(), movement.concept(), fecha, movement.amount(), categoria, id],
                )?;
                if changed == 0 {
                    return Err(StoreError::NotFound(id));
                }
                debug!(id, %movement, "updated movement");
                Ok(id)
            }
        }
    }

    pub fn get(&self, id: i64) -> StoreResult<Option<Movement>> {
        Ok(self.query("WHERE id = ?1", [id])?.into_iter().next())
    }

    pub fn get_all(&self) -> StoreResult<Vec<Movement>> {
        self.query("ORDER BY id", [])
    }

    /// Returns whether a row was removed. A missing id is not an error.
    pub fn delete(&self, id: i64) -> StoreResult<bool> {
        let conn = self.connect()?;
        let removed = conn.execute("DELETE FROM movimientos WHERE id = ?1", [id])?;
        debug!(id, removed, "deleted movement");
        Ok(removed > 0)
    }

    /// Every expense with amount strictly greater than `threshold`.
    /// Compares magnitudes so a negative row written by an older schema is
    /// selected and then rejected, not skipped.
    pub fn find_expenses_above(&self, threshold: f64) -> StoreResult<Vec<Movement>> {
        self.query(
            "WHERE tipo_movimiento = 'G' AND ABS(cantidad) > ?1 ORDER BY id",
            [threshold],
        )
    }

    /// Movements dated within `from..=to`, oldest first
    pub fn find_between(&self, from: NaiveDate, to: NaiveDate) -> StoreResult<Vec<Movement>> {
        self.query(
            "WHERE fecha BETWEEN ?1 AND ?2 ORDER BY fecha, id",
            [
                from.format(DATE_FORMAT).to_string(),
                to.format(DATE_FORMAT).to_string(),
            ],
        )
    }

    pub fn count(&self) -> StoreResult<i64> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM movimientos", [], |row| row.get(0))?;

        Ok(count)
    }

    fn query(&self, clause: &str, params: impl rusqlite::Params) -> StoreResult<Vec<Movement>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!("{} {}", SELECT_MOVEMENTS, clause))?;

        let rows = stmt
            .query_map(params, MovementRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|row| -> StoreResult<Movement> { Ok(row.into_movement()?) })
            .collect()
    }
}

impl MovementStore for SqliteStore {
    fn submit(&mut self, movement: &Movement) -> StoreResult<Option<i64>> {
        self.save(movement).map(Some)
    }

    fn fetch_all(&self) -> StoreResult<Vec<Movement>> {
        self.get_all()
    }

    fn fetch_between(&self, from: NaiveDate, to: NaiveDate) -> StoreResult<Vec<Movement>> {
        self.find_between(from, to)
    }
}
