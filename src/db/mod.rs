//! Gallery database: users, packages, owners, versions, downloads, and
//! the SQL error log, over a single SQLite file.

use crate::entities::{PackageRegistration, User};
use crate::errorlog::ErrorEntry;
use crate::stats::AggregateTotals;
use chrono::{DateTime, Utc};
use gantry_core::core::path::ensure_dir;
use gantry_core::{GantryError, GantryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    email_address TEXT,
    unconfirmed_email_address TEXT,
    email_allowed INTEGER NOT NULL DEFAULT 1,
    notify_package_pushed INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS packages (
    id INTEGER PRIMARY KEY,
    package_id TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    downloads INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS package_owners (
    package_id INTEGER NOT NULL REFERENCES packages(id),
    user_id INTEGER NOT NULL REFERENCES users(id),
    PRIMARY KEY (package_id, user_id)
);

CREATE TABLE IF NOT EXISTS package_versions (
    id INTEGER PRIMARY KEY,
    package_id INTEGER NOT NULL REFERENCES packages(id),
    version TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (package_id, version)
);

CREATE INDEX IF NOT EXISTS idx_package_versions_package
    ON package_versions(package_id);

CREATE TABLE IF NOT EXISTS error_log (
    id INTEGER PRIMARY KEY,
    occurred_at TEXT NOT NULL,
    source TEXT NOT NULL,
    message TEXT NOT NULL,
    detail TEXT NOT NULL DEFAULT ''
);
";

/// One package row as the search indexer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub id: String,
    pub latest_version: Option<String>,
    pub description: String,
    pub downloads: u64,
}

/// Connection handle shared by every SQL-backed service.
pub struct GalleryDb {
    conn: Mutex<Connection>,
}

impl GalleryDb {
    /// Open (creating if necessary) the database file.
    pub fn open(path: &Path) -> GantryResult<Self> {
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        let conn = Connection::open(path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> GantryResult<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Create the schema. Idempotent.
    pub fn migrate(&self) -> GantryResult<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn create_user(&self, user: &User) -> GantryResult<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO users (username, email_address, unconfirmed_email_address,
                                email_allowed, notify_package_pushed)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.username,
                user.email_address,
                user.unconfirmed_email_address,
                user.email_allowed,
                user.notify_package_pushed,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_user(&self, username: &str) -> GantryResult<Option<User>> {
        let conn = self.conn();
        let user = conn
            .query_row(
                "SELECT username, email_address, unconfirmed_email_address,
                        email_allowed, notify_package_pushed
                 FROM users WHERE username = ?1",
                params![username],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Create a package registration owned by the named users.
    /// Every owner must already exist.
    pub fn create_package(
        &self,
        package_id: &str,
        description: &str,
        owners: &[&str],
    ) -> GantryResult<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO packages (package_id, description) VALUES (?1, ?2)",
            params![package_id, description],
        )?;
        let row_id = conn.last_insert_rowid();

        for owner in owners {
            let user_id: i64 = conn
                .query_row(
                    "SELECT id FROM users WHERE username = ?1",
                    params![owner],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or_else(|| {
                    GantryError::Package(format!(
                        "Cannot add owner '{}' to '{}': no such user",
                        owner, package_id
                    ))
                })?;
            conn.execute(
                "INSERT INTO package_owners (package_id, user_id) VALUES (?1, ?2)",
                params![row_id, user_id],
            )?;
        }
        Ok(row_id)
    }

    /// Load a registration with its owners.
    pub fn registration_of(&self, package_id: &str) -> GantryResult<Option<PackageRegistration>> {
        let conn = self.conn();
        let row_id: Option<i64> = conn
            .query_row(
                "SELECT id FROM packages WHERE package_id = ?1",
                params![package_id],
                |row| row.get(0),
            )
            .optional()?;
        let row_id = match row_id {
            Some(id) => id,
            None => return Ok(None),
        };

        let mut stmt = conn.prepare(
            "SELECT u.username, u.email_address, u.unconfirmed_email_address,
                    u.email_allowed, u.notify_package_pushed
             FROM users u
             JOIN package_owners po ON po.user_id = u.id
             WHERE po.package_id = ?1
             ORDER BY u.username",
        )?;
        let owners = stmt
            .query_map(params![row_id], row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(PackageRegistration {
            id: package_id.to_string(),
            owners,
        }))
    }

    pub fn add_version(&self, package_id: &str, version: &str) -> GantryResult<()> {
        let conn = self.conn();
        let changed = conn.execute(
            "INSERT INTO package_versions (package_id, version, created_at)
             SELECT id, ?2, ?3 FROM packages WHERE package_id = ?1",
            params![package_id, version, Utc::now().to_rfc3339()],
        )?;
        if changed == 0 {
            return Err(GantryError::Package(format!(
                "Cannot add version to unknown package '{}'",
                package_id
            )));
        }
        Ok(())
    }

    pub fn record_downloads(&self, package_id: &str, count: u64) -> GantryResult<()> {
        let changed = self.conn().execute(
            "UPDATE packages SET downloads = downloads + ?2 WHERE package_id = ?1",
            params![package_id, count as i64],
        )?;
        if changed == 0 {
            return Err(GantryError::Package(format!(
                "Cannot record downloads for unknown package '{}'",
                package_id
            )));
        }
        Ok(())
    }

    pub fn download_count(&self, package_id: &str) -> GantryResult<Option<u64>> {
        let count: Option<i64> = self
            .conn()
            .query_row(
                "SELECT downloads FROM packages WHERE package_id = ?1",
                params![package_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(count.map(|c| c as u64))
    }

    /// Package ids starting with `partial`, most downloaded first.
    /// An empty `partial` returns the most downloaded ids overall.
    pub fn package_ids_like(&self, partial: &str, take: usize) -> GantryResult<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT package_id FROM packages
             WHERE package_id LIKE ?1 || '%'
             ORDER BY downloads DESC, package_id
             LIMIT ?2",
        )?;
        let ids = stmt
            .query_map(params![partial, take as i64], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    /// All versions of a package in publication order.
    pub fn versions_of(&self, package_id: &str) -> GantryResult<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT v.version FROM package_versions v
             JOIN packages p ON p.id = v.package_id
             WHERE p.package_id = ?1
             ORDER BY v.id",
        )?;
        let versions = stmt
            .query_map(params![package_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(versions)
    }

    /// Every package with its latest version, for index rebuilds.
    pub fn packages_for_index(&self) -> GantryResult<Vec<PackageRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT p.package_id, p.description, p.downloads,
                    (SELECT v.version FROM package_versions v
                     WHERE v.package_id = p.id ORDER BY v.id DESC LIMIT 1)
             FROM packages p
             ORDER BY p.package_id",
        )?;
        let records = stmt
            .query_map([], |row| {
                Ok(PackageRecord {
                    id: row.get(0)?,
                    description: row.get(1)?,
                    downloads: row.get::<_, i64>(2)? as u64,
                    latest_version: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// One package row by id, for incremental index updates.
    pub fn package_for_index(&self, package_id: &str) -> GantryResult<Option<PackageRecord>> {
        let conn = self.conn();
        let record = conn
            .query_row(
                "SELECT p.package_id, p.description, p.downloads,
                        (SELECT v.version FROM package_versions v
                         WHERE v.package_id = p.id ORDER BY v.id DESC LIMIT 1)
                 FROM packages p WHERE p.package_id = ?1",
                params![package_id],
                |row| {
                    Ok(PackageRecord {
                        id: row.get(0)?,
                        description: row.get(1)?,
                        downloads: row.get::<_, i64>(2)? as u64,
                        latest_version: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    pub fn aggregate_totals(&self) -> GantryResult<AggregateTotals> {
        let conn = self.conn();
        conn.query_row(
            "SELECT (SELECT COUNT(*) FROM package_versions),
                    (SELECT COUNT(*) FROM packages),
                    (SELECT COALESCE(SUM(downloads), 0) FROM packages)",
            [],
            |row| {
                Ok(AggregateTotals {
                    total_packages: row.get::<_, i64>(0)? as u64,
                    unique_packages: row.get::<_, i64>(1)? as u64,
                    downloads: row.get::<_, i64>(2)? as u64,
                })
            },
        )
        .map_err(GantryError::from)
    }

    pub fn insert_error(&self, entry: &ErrorEntry) -> GantryResult<()> {
        self.conn().execute(
            "INSERT INTO error_log (occurred_at, source, message, detail)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                entry.occurred_at.to_rfc3339(),
                entry.source,
                entry.message,
                entry.detail,
            ],
        )?;
        Ok(())
    }

    /// Most recent error entries, newest first.
    pub fn recent_errors(&self, take: usize) -> GantryResult<Vec<ErrorEntry>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT occurred_at, source, message, detail
             FROM error_log ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![take as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut entries = Vec::with_capacity(rows.len());
        for (occurred_at, source, message, detail) in rows {
            entries.push(ErrorEntry {
                occurred_at: parse_timestamp(&occurred_at)?,
                source,
                message,
                detail,
            });
        }
        Ok(entries)
    }
}

fn parse_timestamp(value: &str) -> GantryResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| GantryError::Validation(format!("Invalid timestamp '{}': {}", value, e)))
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        username: row.get(0)?,
        email_address: row.get(1)?,
        unconfirmed_email_address: row.get(2)?,
        email_allowed: row.get(3)?,
        notify_package_pushed: row.get(4)?,
    })
}
