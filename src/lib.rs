// Tot Tally - Core Library
// Exposes all modules for use in the CLI and tests

pub mod catalog;
pub mod db;
pub mod elapsed;
pub mod error;
pub mod export;
pub mod status;

// Re-export commonly used types
pub use catalog::{Category, Kind};
pub use db::{
    append_tally, append_tally_at, count_tallies, create_tot, find_last_tally, get_tot,
    list_tallies, setup_database, update_timezone, Tally, Tot, NAME_MAX_CHARS,
};
pub use elapsed::{time_elapsed, NOT_YET};
pub use error::{Result, TallyError};
pub use export::{write_csv, write_json};
pub use status::{
    resolve_timezone, tot_status, tot_status_at, CategoryStatus, LogEntry, TotStatus,
    DEFAULT_LOG_LIMIT,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
