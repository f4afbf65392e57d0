//! Terminal rendering of run reports.

use std::fmt::Write;
use std::time::Duration;

use forkscan_core::RunReport;

/// Plain-text report, one fact per line.
pub fn render_report(report: &RunReport, timeout: Option<Duration>) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(
        out,
        "Results received: {}/{}",
        report.results_received, report.total_expected
    );
    match report.extrema {
        Some(extrema) => {
            let _ = writeln!(out, "Min: {}", extrema.min);
            let _ = writeln!(out, "Max: {}", extrema.max);
        }
        None => out.push_str("No results received\n"),
    }
    if report.timed_out {
        let secs = timeout.map_or(0, |t| t.as_secs());
        let _ = writeln!(out, "Warning: timed out after {secs}s; partial results");
    }
    let _ = writeln!(out, "Elapsed time: {:.3}ms", report.elapsed_millis());
    let _ = writeln!(out, "Number of processes: {}", report.dispatched);
    out
}

/// Pretty JSON form of the report.
pub fn render_json(report: &RunReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use forkscan_core::{Aggregate, Extrema};

    fn report(extrema: Option<Extrema>, received: usize, timed_out: bool) -> RunReport {
        let aggregate = Aggregate {
            extrema,
            received,
            expected: 2,
        };
        RunReport::new(aggregate, 2, 2, timed_out, Duration::from_micros(1500), Vec::new())
    }

    #[test]
    fn test_complete_report() {
        let text = render_report(&report(Extrema::new(1, 9), 2, false), None);
        assert_eq!(
            text,
            "Results received: 2/2\nMin: 1\nMax: 9\nElapsed time: 1.500ms\nNumber of processes: 2\n"
        );
    }

    #[test]
    fn test_timed_out_report_without_results() {
        let text = render_report(&report(None, 0, true), Some(Duration::from_secs(3)));
        assert!(text.contains("Results received: 0/2\n"));
        assert!(text.contains("No results received\n"));
        assert!(text.contains("Warning: timed out after 3s; partial results\n"));
        assert!(!text.contains("Min:"));
    }

    #[test]
    fn test_empty_partitions_are_expected_but_not_counted_as_processes() {
        let aggregate = Aggregate {
            extrema: Extrema::new(-2, 7),
            received: 1,
            expected: 8,
        };
        let report = RunReport::new(aggregate, 8, 1, false, Duration::ZERO, Vec::new());
        let text = render_report(&report, None);
        assert!(text.contains("Results received: 1/8\n"), "{text}");
        assert!(text.contains("Number of processes: 1\n"), "{text}");
    }

    #[test]
    fn test_json_report() {
        let json = render_json(&report(Extrema::new(-4, 4), 2, false)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["results_received"], 2);
        assert_eq!(value["timed_out"], false);
        assert_eq!(value["elapsed_ms"], 1.5);
    }
}
