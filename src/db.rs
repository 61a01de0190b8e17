// Tot Tally - Event Store
//
// Durable persistence of tot profiles and their tally events over SQLite.
// Every operation takes the connection explicitly; there is no ambient
// global handle. Tally rows are immutable and append-only: nothing here
// updates or deletes them, and ordering is always by creation timestamp.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::catalog::{Category, Kind};
use crate::error::{Result, TallyError};
use crate::status::resolve_timezone;

/// Display names are capped at 20 characters.
pub const NAME_MAX_CHARS: usize = 20;

/// A tracked child profile. Immutable after creation except the timezone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tot {
    /// Opaque unique id, URL-safe. Never changes.
    pub id: String,
    pub name: String,
    /// IANA zone name, e.g. "America/New_York". Display-only concern;
    /// timestamps are stored in UTC regardless.
    pub timezone: String,
}

/// One recorded occurrence for a tot. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tally {
    pub id: i64,
    pub tot_id: String,
    pub created_at: DateTime<Utc>,
    /// Label from the closed kind catalog; validated before insert, so the
    /// store never holds anything `Kind::from_label` would reject.
    pub kind: String,
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS tots (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            timezone TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS tallies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tot_id TEXT NOT NULL REFERENCES tots(id),
            created_at TEXT NOT NULL,
            kind TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_tallies_tot_created
         ON tallies(tot_id, created_at)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// Tots
// ============================================================================

/// Create a new tot profile.
///
/// The name must be non-empty after trimming and at most
/// [`NAME_MAX_CHARS`] characters; the timezone must resolve to a known
/// IANA zone. Both are rejected with `Validation` before anything is
/// written.
pub fn create_tot(conn: &Connection, name: &str, timezone: &str) -> Result<Tot> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TallyError::Validation("name cannot be empty".to_string()));
    }
    if name.chars().count() > NAME_MAX_CHARS {
        return Err(TallyError::Validation(format!(
            "name cannot exceed {} characters",
            NAME_MAX_CHARS
        )));
    }
    resolve_timezone(timezone)?;

    let tot = Tot {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
        timezone: timezone.to_string(),
    };

    conn.execute(
        "INSERT INTO tots (id, name, timezone) VALUES (?1, ?2, ?3)",
        params![tot.id, tot.name, tot.timezone],
    )?;

    Ok(tot)
}

/// Point lookup of a tot profile.
pub fn get_tot(conn: &Connection, id: &str) -> Result<Tot> {
    conn.query_row(
        "SELECT id, name, timezone FROM tots WHERE id = ?1",
        params![id],
        |row| {
            Ok(Tot {
                id: row.get(0)?,
                name: row.get(1)?,
                timezone: row.get(2)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| TallyError::NotFound(format!("tot {} does not exist", id)))
}

/// Change a tot's timezone. The only mutable field on a profile.
pub fn update_timezone(conn: &Connection, id: &str, timezone: &str) -> Result<Tot> {
    resolve_timezone(timezone)?;

    let changed = conn.execute(
        "UPDATE tots SET timezone = ?1 WHERE id = ?2",
        params![timezone, id],
    )?;
    if changed == 0 {
        return Err(TallyError::NotFound(format!("tot {} does not exist", id)));
    }

    get_tot(conn, id)
}

// ============================================================================
// Tallies
// ============================================================================

/// Record a tally for a tot, stamped with the current UTC instant.
///
/// The kind key is resolved against the closed catalog first; an
/// unrecognized key fails with `Validation` and leaves the store unchanged.
pub fn append_tally(conn: &Connection, tot_id: &str, kind_key: &str) -> Result<Tally> {
    append_tally_at(conn, tot_id, kind_key, Utc::now())
}

/// Record a tally at an explicit instant (tests, backfill).
pub fn append_tally_at(
    conn: &Connection,
    tot_id: &str,
    kind_key: &str,
    at: DateTime<Utc>,
) -> Result<Tally> {
    let kind = Kind::from_label(kind_key)
        .ok_or_else(|| TallyError::Validation(format!("unknown kind: {}", kind_key)))?;

    // Surface unknown tots as NotFound rather than a constraint failure.
    let tot = get_tot(conn, tot_id)?;

    conn.execute(
        "INSERT INTO tallies (tot_id, created_at, kind) VALUES (?1, ?2, ?3)",
        params![tot.id, at.to_rfc3339(), kind.label()],
    )?;

    Ok(Tally {
        id: conn.last_insert_rowid(),
        tot_id: tot.id,
        created_at: at,
        kind: kind.label().to_string(),
    })
}

fn tally_from_row(row: &rusqlite::Row) -> rusqlite::Result<Tally> {
    let created_at_str: String = row.get(2)?;
    Ok(Tally {
        id: row.get(0)?,
        tot_id: row.get(1)?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|_| rusqlite::Error::InvalidQuery)?
            .with_timezone(&Utc),
        kind: row.get(3)?,
    })
}

/// Up to `limit` most recent tallies for a tot, newest first. An empty
/// history is an empty vec, not an error.
pub fn list_tallies(conn: &Connection, tot_id: &str, limit: i64) -> Result<Vec<Tally>> {
    let mut stmt = conn.prepare(
        "SELECT id, tot_id, created_at, kind
         FROM tallies
         WHERE tot_id = ?1
         ORDER BY created_at DESC
         LIMIT ?2",
    )?;

    let tallies = stmt
        .query_map(params![tot_id, limit], tally_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(tallies)
}

/// Most recent tally whose kind matches the category rule, or `None`.
///
/// RFC 3339 UTC text with a fixed offset orders lexicographically, so
/// `ORDER BY created_at` is chronological. Equal timestamps are a
/// don't-care; whichever row the scan yields first wins.
pub fn find_last_tally(
    conn: &Connection,
    tot_id: &str,
    category: Category,
) -> Result<Option<Tally>> {
    // Static per-variant fragment, never user input.
    let sql = format!(
        "SELECT id, tot_id, created_at, kind
         FROM tallies
         WHERE tot_id = ?1 AND {}
         ORDER BY created_at DESC
         LIMIT 1",
        category.sql_predicate()
    );

    let tally = conn
        .query_row(&sql, params![tot_id], tally_from_row)
        .optional()?;

    Ok(tally)
}

pub fn count_tallies(conn: &Connection, tot_id: &str) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM tallies WHERE tot_id = ?1",
        params![tot_id],
        |row| row.get(0),
    )?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, h, m, 0).unwrap()
    }

    #[test]
    fn test_create_and_get_tot() {
        let conn = test_conn();
        let tot = create_tot(&conn, "Mina", "America/New_York").unwrap();
        assert!(!tot.id.is_empty());

        let fetched = get_tot(&conn, &tot.id).unwrap();
        assert_eq!(fetched.name, "Mina");
        assert_eq!(fetched.timezone, "America/New_York");
    }

    #[test]
    fn test_create_tot_rejects_empty_name() {
        let conn = test_conn();
        let err = create_tot(&conn, "", "UTC").unwrap_err();
        assert!(err.is_validation(), "expected validation error, got {err}");

        let err = create_tot(&conn, "   ", "UTC").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_create_tot_rejects_long_name() {
        let conn = test_conn();
        let err = create_tot(&conn, "abcdefghijklmnopqrstu", "UTC").unwrap_err();
        assert!(err.is_validation());

        // Exactly 20 chars is fine.
        create_tot(&conn, "abcdefghijklmnopqrst", "UTC").unwrap();
    }

    #[test]
    fn test_create_tot_rejects_unknown_timezone() {
        let conn = test_conn();
        let err = create_tot(&conn, "Mina", "Mars/Olympus_Mons").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_get_tot_not_found() {
        let conn = test_conn();
        let err = get_tot(&conn, "nope").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_update_timezone() {
        let conn = test_conn();
        let tot = create_tot(&conn, "Mina", "UTC").unwrap();

        let updated = update_timezone(&conn, &tot.id, "Europe/Paris").unwrap();
        assert_eq!(updated.timezone, "Europe/Paris");

        assert!(update_timezone(&conn, &tot.id, "Not/A_Zone")
            .unwrap_err()
            .is_validation());
        assert!(update_timezone(&conn, "nope", "UTC")
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_append_rejects_unknown_kind_and_leaves_store_unchanged() {
        let conn = test_conn();
        let tot = create_tot(&conn, "Mina", "UTC").unwrap();

        let err = append_tally(&conn, &tot.id, "999").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(count_tallies(&conn, &tot.id).unwrap(), 0);
    }

    #[test]
    fn test_append_rejects_unknown_tot() {
        let conn = test_conn();
        let err = append_tally(&conn, "nope", "Wet").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_wet_then_soil_lookup() {
        // Append "Wet": the Wet category sees it, Soil does not.
        let conn = test_conn();
        let tot = create_tot(&conn, "Mina", "America/New_York").unwrap();

        let t0 = at(8, 0);
        append_tally_at(&conn, &tot.id, "Wet", t0).unwrap();

        let wet = find_last_tally(&conn, &tot.id, Category::Wet).unwrap();
        assert_eq!(wet.unwrap().created_at, t0);

        let soil = find_last_tally(&conn, &tot.id, Category::Soil).unwrap();
        assert!(soil.is_none());
    }

    #[test]
    fn test_wet_and_soil_feeds_both_categories() {
        let conn = test_conn();
        let tot = create_tot(&conn, "Mina", "America/New_York").unwrap();

        append_tally_at(&conn, &tot.id, "Wet", at(8, 0)).unwrap();
        let t1 = at(9, 30);
        append_tally_at(&conn, &tot.id, "Wet & Soil", t1).unwrap();

        let wet = find_last_tally(&conn, &tot.id, Category::Wet)
            .unwrap()
            .unwrap();
        let soil = find_last_tally(&conn, &tot.id, Category::Soil)
            .unwrap()
            .unwrap();
        assert_eq!(wet.created_at, t1);
        assert_eq!(soil.created_at, t1);
    }

    #[test]
    fn test_find_last_returns_maximum_timestamp() {
        let conn = test_conn();
        let tot = create_tot(&conn, "Mina", "UTC").unwrap();

        // Inserted out of chronological order on purpose.
        append_tally_at(&conn, &tot.id, "Milk 3oz", at(9, 0)).unwrap();
        append_tally_at(&conn, &tot.id, "Milk 5oz", at(11, 0)).unwrap();
        append_tally_at(&conn, &tot.id, "Milk 1oz", at(10, 0)).unwrap();

        let last = find_last_tally(&conn, &tot.id, Category::Milk)
            .unwrap()
            .unwrap();
        assert_eq!(last.kind, "Milk 5oz");
        assert_eq!(last.created_at, at(11, 0));
    }

    #[test]
    fn test_append_does_not_disturb_other_categories() {
        let conn = test_conn();
        let tot = create_tot(&conn, "Mina", "UTC").unwrap();

        let bath = at(7, 0);
        append_tally_at(&conn, &tot.id, "Bath", bath).unwrap();
        append_tally_at(&conn, &tot.id, "Milk 2oz", at(8, 0)).unwrap();
        append_tally_at(&conn, &tot.id, "Food (Meal)", at(9, 0)).unwrap();

        let last = find_last_tally(&conn, &tot.id, Category::Bath)
            .unwrap()
            .unwrap();
        assert_eq!(last.created_at, bath);
        assert!(find_last_tally(&conn, &tot.id, Category::Toothbrush)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_list_tallies_order_and_limit() {
        let conn = test_conn();
        let tot = create_tot(&conn, "Mina", "UTC").unwrap();

        for h in [8, 10, 9, 11] {
            append_tally_at(&conn, &tot.id, "Wet", at(h, 0)).unwrap();
        }

        let all = list_tallies(&conn, &tot.id, 100).unwrap();
        let hours: Vec<u32> = all.iter().map(|t| t.created_at.hour()).collect();
        assert_eq!(hours, vec![11, 10, 9, 8]);

        let top2 = list_tallies(&conn, &tot.id, 2).unwrap();
        assert_eq!(top2.len(), 2);
        assert_eq!(top2[0].created_at, at(11, 0));

        assert!(list_tallies(&conn, "nope", 10).unwrap().is_empty());
    }

    /// The SQL predicates and the pure matcher must agree over the whole
    /// catalog: for every kind, every category either sees the appended
    /// event through the store or does not, exactly as `matches` says.
    #[test]
    fn test_sql_predicates_agree_with_matcher() {
        let conn = test_conn();

        for kind in Kind::ALL {
            let tot = create_tot(&conn, "Probe", "UTC").unwrap();
            let t0 = at(12, 0);
            append_tally_at(&conn, &tot.id, kind.label(), t0).unwrap();

            for category in Category::ALL {
                let found = find_last_tally(&conn, &tot.id, category).unwrap();
                assert_eq!(
                    found.is_some(),
                    category.matches(kind.label()),
                    "store and matcher disagree for kind {:?} / category {:?}",
                    kind,
                    category
                );
            }
        }
    }
}
