use std::fs::File;
use std::io::Error;
use std::path::Path;

pub const FIXTURE: &str = "tests/fixtures/reservations.csv";

pub const HEADER: [&str; 12] = [
    "id",
    "guest_name",
    "email",
    "phone",
    "room_type",
    "check_in",
    "check_out",
    "guests",
    "status",
    "room_rate",
    "initial_payment",
    "final_payment",
];

/// Writes `rows` one-night confirmed stays spread over consecutive days,
/// `per_day` of them starting on each day from 2025-01-01.
pub fn generate_csv(path: &Path, rows: usize, per_day: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(HEADER)?;

    let start = chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    for i in 0..rows {
        let check_in = start + chrono::Days::new((i / per_day) as u64);
        let check_out = check_in + chrono::Days::new(1);
        wtr.write_record([
            uuid::Uuid::new_v4().to_string(),
            format!("Guest {i}"),
            format!("guest{i}@example.com"),
            "0241234567".to_string(),
            "standard-room-only".to_string(),
            check_in.to_string(),
            check_out.to_string(),
            "1".to_string(),
            "confirmed".to_string(),
            "250".to_string(),
            "0".to_string(),
            "0".to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
