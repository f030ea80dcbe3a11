//! Parser for the clip analyzer's free-text report.

use regex_lite::Regex;
use std::path::Path;

use super::types::{ClipEvent, ClipReport};

/// Parses an analyzer report into a [`ClipReport`].
///
/// The grammar is line-oriented and order-independent, except that the
/// detail table is entered by its header line and exited by a blank line or
/// a summary line. Out-of-order header or summary lines produce incomplete
/// results rather than failures; malformed numeric fields silently skip
/// their row or field.
pub fn parse_report(output: &str, filename: &str, path: &Path) -> ClipReport {
    let mut report = ClipReport::empty(filename, path);
    let mut in_table = false;

    let channels_re = Regex::new(r"(\d+)\s*ch").ok();
    let hz_re = Regex::new(r"(\d+)\s*Hz").ok();

    for line in output.lines() {
        // Explicit zero-clip phrase; distinct from counters that merely
        // parse to zero.
        if line.contains("no samples clipped") {
            report.has_no_clipping = true;
        }

        // File info line, e.g.: afclip "track.m4a"    2 ch,  48000 Hz, ...
        if line.contains(" ch,") && line.contains(" Hz") {
            if let Some(re) = &channels_re {
                if let Some(n) = first_capture_u32(re, line) {
                    report.channels = n;
                }
            }
            if let Some(re) = &hz_re {
                if let Some(n) = first_capture_u32(re, line) {
                    report.sample_rate = n;
                }
            }
        }

        // Detail table header
        if line.contains("SECONDS") && line.contains("SAMPLE") && line.contains("CHAN") {
            in_table = true;
            continue;
        }

        if in_table {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.contains("total clipped") {
                // A summary line exits the table but still gets matched as a
                // summary below, not consumed as an event.
                in_table = false;
            } else if let Some(event) = parse_event_row(trimmed) {
                report.events.push(event);
            }
        }

        if line.contains("total clipped samples") {
            parse_summary_line(line, &mut report);
        }
    }

    report
}

fn first_capture_u32(re: &Regex, line: &str) -> Option<u32> {
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Parses one detail row: SECONDS SAMPLE CHAN VALUE DECIBELS.
fn parse_event_row(trimmed: &str) -> Option<ClipEvent> {
    let fields: Vec<&str> = trimmed.split_whitespace().collect();
    if fields.len() < 5 {
        return None;
    }

    let seconds: f64 = fields[0].parse().ok()?;
    // Sample indices are printed as floats (e.g. "643681.00")
    let sample: f64 = fields[1].parse().ok()?;
    let amplitude: f64 = fields[3].parse().ok()?;
    let decibels: f64 = fields[4].parse().ok()?;

    let channel = match fields[2] {
        "0" => "L".to_string(),
        "1" => "R".to_string(),
        other => other.to_string(),
    };

    Some(ClipEvent {
        seconds,
        sample: sample as u64,
        channel,
        amplitude,
        decibels,
    })
}

/// Parses a per-channel summary line, attributing the `on-sample:` and
/// `inter-sample:` counts to the left or right counters.
fn parse_summary_line(line: &str, report: &mut ClipReport) {
    let fields: Vec<&str> = line.split_whitespace().collect();

    let on_idx = fields.iter().position(|f| *f == "on-sample:");
    let inter_idx = fields.iter().position(|f| *f == "inter-sample:");

    let (Some(on_idx), Some(inter_idx)) = (on_idx, inter_idx) else {
        return;
    };
    if on_idx + 1 >= fields.len() || inter_idx + 1 >= fields.len() {
        return;
    }

    let on_val: u64 = fields[on_idx + 1].parse().unwrap_or(0);
    let inter_val: u64 = fields[inter_idx + 1].parse().unwrap_or(0);

    if line.contains("Left") || line.contains("channel 0") {
        report.left_on_sample = on_val;
        report.left_inter_sample = inter_val;
    } else if line.contains("Right") || line.contains("channel 1") {
        report.right_on_sample = on_val;
        report.right_inter_sample = inter_val;
    }
}
