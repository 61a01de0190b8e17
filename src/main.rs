// Tot Tally - CLI
//
// Thin shell over the library: opens the database, dispatches one
// subcommand, prints the result. All domain rules live in the library.

use anyhow::{bail, Result};
use rusqlite::Connection;
use std::env;

use tot_tally::{
    append_tally, create_tot, list_tallies, setup_database, tot_status, update_timezone,
    write_csv, write_json, Kind, DEFAULT_LOG_LIMIT,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    let conn = open_database()?;

    match args[1].as_str() {
        "create" => {
            let (name, timezone) = two_args(&args, "create <name> <timezone>")?;
            let tot = create_tot(&conn, name, timezone)?;
            println!("✓ Created tot '{}' ({})", tot.name, tot.timezone);
            println!("  id: {}", tot.id);
        }
        "tally" => {
            let (tot_id, kind) = two_args(&args, "tally <tot-id> <kind>")?;
            let tally = append_tally(&conn, tot_id, kind)?;
            println!("✓ Recorded '{}' at {}", tally.kind, tally.created_at);
        }
        "status" => {
            let tot_id = one_arg(&args, "status <tot-id>")?;
            let status = tot_status(&conn, tot_id, DEFAULT_LOG_LIMIT)?;

            println!("{} ({})", status.tot.name, status.tot.timezone);
            for cs in &status.categories {
                println!("  {:<10} {}", cs.category.name(), cs.since);
            }
            if !status.log.is_empty() {
                println!("\nRecent tallies:");
                for entry in &status.log {
                    println!("  {}  {}", entry.at, entry.kind);
                }
            }
        }
        "log" => {
            let tot_id = one_arg(&args, "log <tot-id> [limit]")?;
            let limit = match args.get(3) {
                Some(raw) => raw.parse()?,
                None => DEFAULT_LOG_LIMIT,
            };
            let status = tot_status(&conn, tot_id, limit)?;
            for entry in &status.log {
                println!("{}  {}", entry.at, entry.kind);
            }
        }
        "timezone" => {
            let (tot_id, zone) = two_args(&args, "timezone <tot-id> <zone>")?;
            let tot = update_timezone(&conn, tot_id, zone)?;
            println!("✓ Timezone for '{}' is now {}", tot.name, tot.timezone);
        }
        "export" => {
            let tot_id = one_arg(&args, "export <tot-id> [csv|json]")?;
            let tallies = list_tallies(&conn, tot_id, i64::MAX)?;
            let stdout = std::io::stdout();
            match args.get(3).map(String::as_str) {
                None | Some("csv") => write_csv(stdout.lock(), &tallies)?,
                Some("json") => write_json(stdout.lock(), &tallies)?,
                Some(other) => bail!("unknown export format: {}", other),
            }
        }
        "kinds" => {
            for kind in Kind::ALL {
                println!("{}", kind.label());
            }
        }
        other => {
            eprintln!("Unknown command: {}\n", other);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}

fn open_database() -> Result<Connection> {
    let path = env::var("TOT_TALLY_DB").unwrap_or_else(|_| "tot-tally.db".to_string());
    let conn = Connection::open(&path)?;
    setup_database(&conn)?;
    Ok(conn)
}

fn one_arg<'a>(args: &'a [String], usage: &str) -> Result<&'a str> {
    match args.get(2) {
        Some(value) => Ok(value),
        None => bail!("usage: tot-tally {}", usage),
    }
}

fn two_args<'a>(args: &'a [String], usage: &str) -> Result<(&'a str, &'a str)> {
    match (args.get(2), args.get(3)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => bail!("usage: tot-tally {}", usage),
    }
}

fn print_usage() {
    eprintln!("tot-tally {}", tot_tally::VERSION);
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  tot-tally create <name> <timezone>    Create a tot profile");
    eprintln!("  tot-tally tally <tot-id> <kind>       Record a tally event");
    eprintln!("  tot-tally status <tot-id>             Time since last event per category");
    eprintln!("  tot-tally log <tot-id> [limit]        Recent tally events");
    eprintln!("  tot-tally timezone <tot-id> <zone>    Update the tot's timezone");
    eprintln!("  tot-tally export <tot-id> [csv|json]  Dump tally history to stdout");
    eprintln!("  tot-tally kinds                       List the kind catalog");
    eprintln!();
    eprintln!("Database path comes from TOT_TALLY_DB (default: tot-tally.db)");
}
