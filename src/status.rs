// Tot Tally - Last-Event Query Engine
//
// Builds the per-category "time since last" summary for one tot, plus the
// recent tally log rendered in the tot's own timezone. One store lookup
// per category, issued sequentially; the reads are independent, so the
// aggregate is the same however they are ordered.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rusqlite::Connection;
use serde::Serialize;

use crate::catalog::Category;
use crate::db::{self, Tot};
use crate::elapsed::{time_elapsed, NOT_YET};
use crate::error::{Result, TallyError};

/// How many log rows the summary carries by default.
pub const DEFAULT_LOG_LIMIT: i64 = 100;

/// Timestamp layout for the tally log, in the tot's zone.
const DISPLAY_FORMAT: &str = "%Y-%m-%d %I:%M %p";

/// Resolve an IANA zone name into a usable conversion capability.
pub fn resolve_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| TallyError::Validation(format!("unknown timezone: {}", name)))
}

/// "Time since last" for one category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryStatus {
    pub category: Category,
    /// "3 hours ago", or "not yet" when no matching event exists.
    pub since: String,
    pub last_at: Option<DateTime<Utc>>,
}

/// One row of the recent tally log, timestamp already rendered in the
/// tot's zone.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub at: String,
    pub kind: String,
}

/// The full status summary handed to the rendering layer.
#[derive(Debug, Clone, Serialize)]
pub struct TotStatus {
    pub tot: Tot,
    /// One entry per category, in `Category::ALL` order.
    pub categories: Vec<CategoryStatus>,
    pub log: Vec<LogEntry>,
}

/// Summary against the current instant.
pub fn tot_status(conn: &Connection, tot_id: &str, limit: i64) -> Result<TotStatus> {
    tot_status_at(conn, tot_id, limit, Utc::now())
}

/// Summary against an explicit "now" (tests use this to pin the clock).
///
/// Both operands of every elapsed computation are converted into the tot's
/// zone first, so the formatter always compares within one frame.
pub fn tot_status_at(
    conn: &Connection,
    tot_id: &str,
    limit: i64,
    now: DateTime<Utc>,
) -> Result<TotStatus> {
    let tot = db::get_tot(conn, tot_id)?;
    let tz = resolve_timezone(&tot.timezone)?;
    let now_local = now.with_timezone(&tz);

    let mut categories = Vec::with_capacity(Category::ALL.len());
    for category in Category::ALL {
        let last = db::find_last_tally(conn, &tot.id, category)?;
        let (since, last_at) = match last {
            Some(tally) => {
                let then_local = tally.created_at.with_timezone(&tz);
                (
                    time_elapsed(&now_local, &then_local, false),
                    Some(tally.created_at),
                )
            }
            None => (NOT_YET.to_string(), None),
        };
        categories.push(CategoryStatus {
            category,
            since,
            last_at,
        });
    }

    let log = db::list_tallies(conn, &tot.id, limit)?
        .into_iter()
        .map(|tally| LogEntry {
            at: tally
                .created_at
                .with_timezone(&tz)
                .format(DISPLAY_FORMAT)
                .to_string(),
            kind: tally.kind,
        })
        .collect();

    Ok(TotStatus {
        tot,
        categories,
        log,
    })
}
