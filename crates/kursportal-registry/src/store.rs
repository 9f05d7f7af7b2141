use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{RegistryError, Result};

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// One registration record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub course_name: Option<String>,
    pub paid: bool,
    pub payment_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Input for a new registration; everything beyond name and email is
/// optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewParticipant {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub course_name: Option<String>,
}

/// Aggregate payment counters for the admin dashboard.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RegistrationStats {
    pub total: i64,
    pub paid: i64,
    pub unpaid: i64,
}

/// Thin repository over SQLite for participant records.
///
/// Thread-safe via internal `Mutex<Connection>`.
pub struct ParticipantStore {
    conn: Mutex<Connection>,
}

impl ParticipantStore {
    /// Open (or create) the database at `path` and run pending migrations.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

        let mut store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        info!(path = %path.display(), "Participant database ready");
        Ok(store)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        let mut store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&mut self) -> Result<()> {
        let conn = self.conn.get_mut().unwrap();
        embedded::migrations::runner()
            .run(conn)
            .map_err(|e| RegistryError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Lock the connection for use. Panics if poisoned.
    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    /// Cheap liveness probe for the health endpoint.
    pub fn ping(&self) -> Result<()> {
        self.conn().query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }

    // ── Participant CRUD ────────────────────────────────────────────

    pub fn create(&self, new: &NewParticipant) -> Result<Participant> {
        let now = Utc::now();
        let now_str = now.to_rfc3339();

        // Insert and rowid read must share one guard: another create in
        // between would hand us its rowid.
        let conn = self.conn();
        let inserted = conn.execute(
            "INSERT INTO participants
             (first_name, last_name, email, phone, street, house_number,
              postal_code, city, course_name, paid, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, ?10)",
            params![
                new.first_name,
                new.last_name,
                new.email,
                new.phone,
                new.street,
                new.house_number,
                new.postal_code,
                new.city,
                new.course_name,
                now_str
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(RegistryError::DuplicateEmail(new.email.clone()));
            }
            Err(e) => return Err(e.into()),
        }

        let id = conn.last_insert_rowid();
        drop(conn);
        info!(id, email = %new.email, "Registered participant");

        Ok(Participant {
            id,
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            email: new.email.clone(),
            phone: new.phone.clone(),
            street: new.street.clone(),
            house_number: new.house_number.clone(),
            postal_code: new.postal_code.clone(),
            city: new.city.clone(),
            course_name: new.course_name.clone(),
            paid: false,
            payment_date: None,
            created_at: now,
        })
    }

    pub fn get(&self, id: i64) -> Result<Participant> {
        self.conn()
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id],
                row_to_participant,
            )
            .optional()?
            .ok_or(RegistryError::NotFound(id))
    }

    /// All participants, newest registration first.
    pub fn list(&self) -> Result<Vec<Participant>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC"))?;
        let iter = stmt.query_map([], row_to_participant)?;

        let mut rows = Vec::new();
        for r in iter {
            rows.push(r?);
        }
        Ok(rows)
    }

    /// Update the contact fields of a record; `None` leaves a field as is.
    pub fn update_contact(
        &self,
        id: i64,
        first_name: Option<&str>,
        last_name: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<()> {
        // Build dynamic SET clause
        let mut sets: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
        let mut param_idx = 1u32;

        let fields: [(&str, Option<&str>); 4] = [
            ("first_name", first_name),
            ("last_name", last_name),
            ("email", email),
            ("phone", phone),
        ];
        for (col, value) in fields {
            if let Some(v) = value {
                sets.push(format!("{col} = ?{param_idx}"));
                values.push(Box::new(v.to_string()));
                param_idx += 1;
            }
        }
        if sets.is_empty() {
            // Nothing to change; still verify the record exists.
            return self.get(id).map(|_| ());
        }

        let sql = format!(
            "UPDATE participants SET {} WHERE id = ?{}",
            sets.join(", "),
            param_idx
        );
        values.push(Box::new(id));

        let params: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let updated = match self.conn().execute(&sql, params.as_slice()) {
            Ok(n) => n,
            Err(e) if is_unique_violation(&e) => {
                return Err(RegistryError::DuplicateEmail(
                    email.unwrap_or_default().to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        if updated == 0 {
            return Err(RegistryError::NotFound(id));
        }
        Ok(())
    }

    /// Flip the payment flag; setting paid stamps the payment date,
    /// clearing it removes the stamp.
    pub fn set_paid(&self, id: i64, paid: bool) -> Result<Participant> {
        let payment_date = paid.then(|| Utc::now().to_rfc3339());

        let updated = self.conn().execute(
            "UPDATE participants SET paid = ?1, payment_date = ?2 WHERE id = ?3",
            params![paid as i32, payment_date, id],
        )?;
        if updated == 0 {
            return Err(RegistryError::NotFound(id));
        }
        self.get(id)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        let deleted = self
            .conn()
            .execute("DELETE FROM participants WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(RegistryError::NotFound(id));
        }
        info!(id, "Deleted participant");
        Ok(())
    }

    pub fn count(&self) -> Result<i64> {
        let n = self
            .conn()
            .query_row("SELECT COUNT(*) FROM participants", [], |row| row.get(0))?;
        Ok(n)
    }

    pub fn stats(&self) -> Result<RegistrationStats> {
        self.conn()
            .query_row(
                "SELECT COUNT(*), COALESCE(SUM(paid), 0) FROM participants",
                [],
                |row| {
                    let total: i64 = row.get(0)?;
                    let paid: i64 = row.get(1)?;
                    Ok(RegistrationStats {
                        total,
                        paid,
                        unpaid: total - paid,
                    })
                },
            )
            .map_err(Into::into)
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

const SELECT_COLUMNS: &str = "SELECT id, first_name, last_name, email, phone, street, \
     house_number, postal_code, city, course_name, paid, payment_date, created_at \
     FROM participants";

fn row_to_participant(row: &rusqlite::Row<'_>) -> rusqlite::Result<Participant> {
    Ok(Participant {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        street: row.get(5)?,
        house_number: row.get(6)?,
        postal_code: row.get(7)?,
        city: row.get(8)?,
        course_name: row.get(9)?,
        paid: row.get::<_, i32>(10)? != 0,
        payment_date: row.get::<_, Option<String>>(11)?.map(|s| parse_dt(&s)),
        created_at: parse_dt(&row.get::<_, String>(12)?),
    })
}

fn parse_dt(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
