// Tot Tally - History Export
//
// Writes a tot's tally history as CSV (epoch,kind rows) or pretty JSON.

use std::io;

use anyhow::Result;
use serde::Serialize;

use crate::db::Tally;

#[derive(Serialize)]
struct CsvRow<'a> {
    epoch: i64,
    kind: &'a str,
}

/// CSV export: an `epoch,kind` header followed by one row per tally,
/// timestamps as Unix epoch seconds.
pub fn write_csv<W: io::Write>(writer: W, tallies: &[Tally]) -> Result<()> {
    let mut w = csv::Writer::from_writer(writer);

    for tally in tallies {
        w.serialize(CsvRow {
            epoch: tally.created_at.timestamp(),
            kind: &tally.kind,
        })?;
    }

    w.flush()?;
    Ok(())
}

/// JSON export of the raw tally rows.
pub fn write_json<W: io::Write>(writer: W, tallies: &[Tally]) -> Result<()> {
    serde_json::to_writer_pretty(writer, tallies)?;
    Ok(())
}
