use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;

use school_loader::reader::{JsonReader, Reader};
use school_loader::{db, load, report};

const DEFAULT_DB_PATH: &str = "school.sqlite3";

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let (Some(rooms_path), Some(students_path)) =
        (args.next().map(PathBuf::from), args.next().map(PathBuf::from))
    else {
        anyhow::bail!("usage: school-loader <rooms.json> <students.json> [db-path]");
    };
    let db_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

    // One connection for the whole session, dropped on every exit path.
    let mut conn = db::open(&db_path)
        .with_context(|| format!("open database {}", db_path.display()))?;
    db::initialize(&conn, db::SCHEMA_SQL, db::INDEX_SQL).context("initialize schema")?;

    let reader = JsonReader;
    let rooms = reader
        .read(&rooms_path)
        .with_context(|| format!("read rooms from {}", rooms_path.display()))?;
    let students = reader
        .read(&students_path)
        .with_context(|| format!("read students from {}", students_path.display()))?;

    // Rooms first so student room references resolve logically.
    load::load(&mut conn, &rooms, &students).context("load batches")?;

    let today = Local::now().date_naive();

    println!("rooms with student count:");
    println!(
        "{}",
        serde_json::to_string(&report::rooms_with_student_count(&conn)?)?
    );

    println!("top 5 rooms by smallest average student age:");
    println!(
        "{}",
        serde_json::to_string(&report::top5_smallest_avg_age(&conn, today)?)?
    );

    println!("top 5 rooms by largest age spread:");
    println!(
        "{}",
        serde_json::to_string(&report::top5_largest_age_spread(&conn, today)?)?
    );

    println!("rooms with mixed sex composition:");
    println!(
        "{}",
        serde_json::to_string(&report::rooms_with_mixed_sex(&conn)?)?
    );

    Ok(())
}
