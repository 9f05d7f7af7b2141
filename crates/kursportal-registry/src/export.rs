//! CSV export of the participant list, formatted for the course office:
//! German column headers, Ja/Nein flags, `dd.mm.yyyy hh:mm` timestamps.

use chrono::{DateTime, Utc};

use crate::store::Participant;
use crate::Result;

const HEADERS: [&str; 13] = [
    "ID",
    "Vorname",
    "Nachname",
    "E-Mail",
    "Telefon",
    "Strasse",
    "Hausnummer",
    "PLZ",
    "Ort",
    "Kurs",
    "Bezahlt",
    "Zahlungsdatum",
    "Anmeldedatum",
];

const DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Serialize participants to CSV bytes, one row per record in the order
/// given.
pub fn to_csv(participants: &[Participant]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;

    for p in participants {
        writer.write_record([
            p.id.to_string(),
            p.first_name.clone(),
            p.last_name.clone(),
            p.email.clone(),
            p.phone.clone().unwrap_or_default(),
            p.street.clone().unwrap_or_default(),
            p.house_number.clone().unwrap_or_default(),
            p.postal_code.clone().unwrap_or_default(),
            p.city.clone().unwrap_or_default(),
            p.course_name.clone().unwrap_or_default(),
            ja_nein(p.paid).to_string(),
            p.payment_date.map(format_dt).unwrap_or_default(),
            format_dt(p.created_at),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()).into())
}

fn ja_nein(flag: bool) -> &'static str {
    if flag { "Ja" } else { "Nein" }
}

fn format_dt(dt: DateTime<Utc>) -> String {
    dt.format(DATE_FORMAT).to_string()
}
