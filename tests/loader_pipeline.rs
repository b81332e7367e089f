use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::json;

use school_loader::model::{Room, Student};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn write_fixtures(dir: &Path) -> (PathBuf, PathBuf) {
    let rooms = vec![
        Room { id: 1, name: "Room #1".into() },
        Room { id: 2, name: "Room #2".into() },
        Room { id: 3, name: "Room #3".into() },
    ];
    let students = vec![
        Student {
            id: 10,
            name: "Ann".into(),
            birthday: "2005-03-12T00:00:00.000000".into(),
            sex: "F".into(),
            room: 2,
        },
        Student {
            id: 11,
            name: "Bob".into(),
            birthday: "2009-08-01T00:00:00.000000".into(),
            sex: "M".into(),
            room: 2,
        },
        Student {
            id: 12,
            name: "Cal".into(),
            birthday: "2007-01-30T00:00:00.000000".into(),
            sex: "M".into(),
            room: 3,
        },
    ];

    let rooms_path = dir.join("rooms.json");
    let students_path = dir.join("students.json");
    std::fs::write(&rooms_path, serde_json::to_string(&rooms).expect("rooms json"))
        .expect("write rooms");
    std::fs::write(
        &students_path,
        serde_json::to_string(&students).expect("students json"),
    )
    .expect("write students");
    (rooms_path, students_path)
}

fn run_loader(rooms: &Path, students: &Path, db: &Path) -> String {
    let exe = env!("CARGO_BIN_EXE_school-loader");
    let out = Command::new(exe)
        .arg(rooms)
        .arg(students)
        .arg(db)
        .output()
        .expect("spawn school-loader");
    assert!(
        out.status.success(),
        "loader failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8(out.stdout).expect("utf8 stdout")
}

/// The JSON line printed directly under the given heading.
fn report_after(stdout: &str, heading: &str) -> serde_json::Value {
    let mut lines = stdout.lines();
    while let Some(line) = lines.next() {
        if line == heading {
            let payload = lines.next().expect("report line after heading");
            return serde_json::from_str(payload).expect("report json");
        }
    }
    panic!("heading not found: {heading}");
}

#[test]
fn full_pipeline_loads_and_reports() {
    let dir = temp_dir("school-loader-pipeline");
    let (rooms_path, students_path) = write_fixtures(&dir);
    let db_path = dir.join("school.sqlite3");

    let stdout = run_loader(&rooms_path, &students_path, &db_path);

    let counts = report_after(&stdout, "rooms with student count:");
    assert_eq!(
        counts,
        json!([
            {"id": 1, "name": "Room #1", "student_count": 0},
            {"id": 2, "name": "Room #2", "student_count": 2},
            {"id": 3, "name": "Room #3", "student_count": 1}
        ])
    );

    // Age-dependent reports drift with the wall clock on purpose; only check
    // membership and shape here. Fixed-date behavior is locked by the unit
    // tests in src/report.rs.
    let avg = report_after(&stdout, "top 5 rooms by smallest average student age:");
    let avg_ids: Vec<i64> = avg
        .as_array()
        .expect("array")
        .iter()
        .map(|r| r.get("id").and_then(|v| v.as_i64()).expect("id"))
        .collect();
    assert_eq!(avg_ids.len(), 2);
    assert!(avg_ids.contains(&2) && avg_ids.contains(&3));

    let spread = report_after(&stdout, "top 5 rooms by largest age spread:");
    assert_eq!(spread.as_array().expect("array").len(), 2);

    let mixed = report_after(&stdout, "rooms with mixed sex composition:");
    assert_eq!(mixed, json!([{"id": 2, "name": "Room #2"}]));

    // The store outlives the process.
    let conn = rusqlite::Connection::open(&db_path).expect("reopen db");
    let birthday: String = conn
        .query_row("SELECT birthday FROM students WHERE id = 10", [], |row| {
            row.get(0)
        })
        .expect("birthday");
    assert_eq!(birthday, "2005-03-12");
}

#[test]
fn rerunning_the_loader_is_idempotent() {
    let dir = temp_dir("school-loader-idempotent");
    let (rooms_path, students_path) = write_fixtures(&dir);
    let db_path = dir.join("school.sqlite3");

    let first = run_loader(&rooms_path, &students_path, &db_path);
    let second = run_loader(&rooms_path, &students_path, &db_path);

    assert_eq!(
        report_after(&first, "rooms with student count:"),
        report_after(&second, "rooms with student count:")
    );

    let conn = rusqlite::Connection::open(&db_path).expect("reopen db");
    let students: i64 = conn
        .query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))
        .expect("count");
    let rooms: i64 = conn
        .query_row("SELECT COUNT(*) FROM rooms", [], |row| row.get(0))
        .expect("count");
    assert_eq!(students, 3);
    assert_eq!(rooms, 3);
}

#[test]
fn missing_input_file_fails_without_writes() {
    let dir = temp_dir("school-loader-missing-input");
    let (_, students_path) = write_fixtures(&dir);
    let db_path = dir.join("school.sqlite3");

    let exe = env!("CARGO_BIN_EXE_school-loader");
    let out = Command::new(exe)
        .arg(dir.join("no-such-rooms.json"))
        .arg(&students_path)
        .arg(&db_path)
        .output()
        .expect("spawn school-loader");
    assert!(!out.status.success());

    // Schema init ran, ingestion did not.
    let conn = rusqlite::Connection::open(&db_path).expect("reopen db");
    let rooms: i64 = conn
        .query_row("SELECT COUNT(*) FROM rooms", [], |row| row.get(0))
        .expect("count");
    assert_eq!(rooms, 0);
}
