//! Row mapping for the exhibit roster spreadsheet.
//!
//! One data row holds sixteen fixed columns: name, gender, birth date,
//! death date, a precomputed age (ignored and recomputed), moved-out date,
//! moved-out zoo, arrival date, origin zoo, father, mother, three pair
//! mates, personality and feature. A malformed cell degrades to an empty
//! field; mapping never fails for a whole row.

use calamine::Data;
use chrono::{Duration, NaiveDate};
use shared::RedPanda;

use super::derived;

/// Map one roster row into a catalog record. Missing trailing cells read as
/// blank, and the stored age column is replaced by a freshly derived value.
pub fn map_row(cells: &[Data]) -> RedPanda {
    let mut panda = RedPanda {
        name: cell_text(cells.get(0)),
        gender: cell_text(cells.get(1)),
        birth_date: cell_text(cells.get(2)),
        death_date: cell_text(cells.get(3)),
        age: String::new(),
        moved_out_date: cell_text(cells.get(5)),
        moved_out_zoo: cell_text(cells.get(6)),
        arrival_date: cell_text(cells.get(7)),
        origin_zoo: cell_text(cells.get(8)),
        father: cell_text(cells.get(9)),
        mother: cell_text(cells.get(10)),
        pair1: cell_text(cells.get(11)),
        pair2: cell_text(cells.get(12)),
        pair3: cell_text(cells.get(13)),
        personality: cell_text(cells.get(14)),
        feature: cell_text(cells.get(15)),
    };
    panda.age = derived::age_label(&panda.birth_date, &panda.death_date);
    panda
}

/// A row with no usable text in any cell. Such rows are skipped without
/// terminating the scan.
pub fn is_blank_row(cells: &[Data]) -> bool {
    cells.iter().all(|cell| cell_text(Some(cell)).trim().is_empty())
}

/// Resolve one cell to its string form.
///
/// Text passes through literally. Numeric values are read as spreadsheet
/// date serials and rendered `yyyy/mm/dd`; a serial of exactly 0 maps to an
/// empty string so blank date cells misread as numeric do not surface as
/// 1899/12/31. Formula cells arrive here as their cached evaluated value.
/// Anything unrecognized resolves to an empty string.
pub fn cell_text(cell: Option<&Data>) -> String {
    let Some(cell) = cell else {
        return String::new();
    };
    match cell {
        Data::String(s) => s.clone(),
        Data::Float(f) => serial_date_text(*f),
        Data::Int(i) => serial_date_text(*i as f64),
        Data::DateTime(dt) => serial_date_text(dt.as_f64()),
        Data::DateTimeIso(s) => iso_date_text(s),
        Data::Empty | Data::Bool(_) | Data::Error(_) | Data::DurationIso(_) => String::new(),
    }
}

fn serial_date_text(serial: f64) -> String {
    match excel_serial_date(serial) {
        Some(date) => date.format("%Y/%m/%d").to_string(),
        None => String::new(),
    }
}

/// Excel 1900-system day serial to a calendar date. Serial 1 is 1900-01-01;
/// serials below 61 offset from 1899-12-31 and the rest from 1899-12-30 to
/// absorb the phantom 1900-02-29.
fn excel_serial_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial <= 0.0 {
        return None;
    }
    let whole_days = serial.trunc() as i64;
    let epoch = if whole_days < 61 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    epoch.checked_add_signed(Duration::try_days(whole_days)?)
}

fn iso_date_text(s: &str) -> String {
    s.get(0..10)
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        .map(|date| date.format("%Y/%m/%d").to_string())
        .unwrap_or_default()
}
