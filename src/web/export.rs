use std::fmt::Write;

use crate::simulation::Detection;

pub const CSV_HEADER: &str = "Timestamp,Latitude,Longitude";
pub const EXPORT_FILENAME: &str = "agrovision_report.csv";

/// Renders detections as CSV, header first, one row per detection in the
/// given order.
pub fn render_csv(detections: &[Detection]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + detections.len() * 48);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for d in detections {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{},{},{}", d.timestamp, d.lat, d.lon);
    }
    out
}
