//! Plain-text rendering of clip reports for stdout.

use std::fmt::Write;

use clipgate_core::{ClipReport, ClipVerdict};

/// Renders one file's clip report as a short stdout block.
pub fn render(report: &ClipReport) -> String {
    let mut out = String::new();
    match report.verdict() {
        ClipVerdict::Clean => {
            let _ = writeln!(out, "{}: no clipping", report.filename);
        }
        ClipVerdict::Unknown => {
            let _ = writeln!(
                out,
                "{}: analysis inconclusive (no clip summary recognized)",
                report.filename
            );
        }
        ClipVerdict::Clipped => {
            let _ = writeln!(
                out,
                "{}: {} clipped samples ({} ch, {} Hz)",
                report.filename,
                report.total_clips(),
                report.channels,
                report.sample_rate
            );
            let _ = writeln!(
                out,
                "  left   on-sample: {:>6}  inter-sample: {:>6}",
                report.left_on_sample, report.left_inter_sample
            );
            let _ = writeln!(
                out,
                "  right  on-sample: {:>6}  inter-sample: {:>6}",
                report.right_on_sample, report.right_inter_sample
            );
            if let (Some(min), Some(max), Some(avg)) = (
                report.min_decibels(),
                report.max_decibels(),
                report.avg_decibels(),
            ) {
                let _ = writeln!(
                    out,
                    "  overshoot  min: {min:.2} dB  max: {max:.2} dB  avg: {avg:.2} dB"
                );
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipgate_core::ClipEvent;

    fn clipped_report() -> ClipReport {
        let mut report = ClipReport::empty("song.m4a", "/music/song.m4a");
        report.left_on_sample = 2;
        report.right_inter_sample = 1;
        report
    }

    #[test]
    fn test_render_clean() {
        let mut report = ClipReport::empty("song.m4a", "/music/song.m4a");
        report.has_no_clipping = true;
        assert_eq!(render(&report), "song.m4a: no clipping\n");
    }

    #[test]
    fn test_render_unknown() {
        let report = ClipReport::empty("song.m4a", "/music/song.m4a");
        let rendered = render(&report);
        assert!(rendered.contains("inconclusive"));
    }

    #[test]
    fn test_render_clipped_counters() {
        let rendered = render(&clipped_report());
        assert!(rendered.starts_with("song.m4a: 3 clipped samples (2 ch, 48000 Hz)\n"));
        assert!(rendered.contains("left   on-sample:      2  inter-sample:      0"));
        assert!(rendered.contains("right  on-sample:      0  inter-sample:      1"));
        // No detail events, so no overshoot line.
        assert!(!rendered.contains("overshoot"));
    }

    #[test]
    fn test_render_clipped_with_overshoot_stats() {
        let mut report = clipped_report();
        report.events = vec![
            ClipEvent {
                seconds: 1.5,
                sample: 72_000,
                channel: "L".to_string(),
                amplitude: 1.01,
                decibels: 0.10,
            },
            ClipEvent {
                seconds: 2.0,
                sample: 96_000,
                channel: "R".to_string(),
                amplitude: 1.0,
                decibels: 0.00,
            },
        ];
        let rendered = render(&report);
        assert!(rendered.contains("overshoot  min: 0.00 dB  max: 0.10 dB  avg: 0.05 dB"));
    }
}
