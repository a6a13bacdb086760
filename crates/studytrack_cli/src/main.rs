//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `studytrack_core` linkage.
//! - Open an in-memory store so schema bootstrap is exercised end to end.

use studytrack_core::db::migrations::latest_version;
use studytrack_core::db::open_db_in_memory;
use studytrack_core::LabStatus;

fn main() {
    println!("studytrack_core ping={}", studytrack_core::ping());
    println!("studytrack_core version={}", studytrack_core::core_version());
    match open_db_in_memory() {
        Ok(_) => println!("studytrack_core schema_version={}", latest_version()),
        Err(err) => {
            eprintln!("studytrack_core schema bootstrap failed: {err}");
            std::process::exit(1);
        }
    }
    let statuses = LabStatus::ALL
        .iter()
        .map(|status| status.code())
        .collect::<Vec<_>>()
        .join("|");
    println!("studytrack_core lab_statuses={statuses}");
}
