//! Plain-text rendering of simulation outcomes.

use std::fmt::Write;

use cpu_schedule::policies::PolicyKind;
use cpu_schedule::simulator::{DetailRow, SimulationOutcome};
use cpu_schedule::SimulationError;

const TABLE_HEADERS: [&str; 5] = [
    "Process ID",
    "Arrival Time",
    "Burst Time",
    "Waiting Time",
    "Turnaround Time",
];

/// Full report for one run.
pub fn render_outcome(outcome: &SimulationOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Policy: {}", outcome.policy.description());
    let _ = writeln!(out, "Average Waiting Time: {:.2}", outcome.average_waiting_time());
    let _ = writeln!(
        out,
        "Average Turnaround Time: {:.2}",
        outcome.average_turnaround_time()
    );
    out.push('\n');

    if outcome.policy.requires_priority() {
        out.push_str("Note: Small values have high priority.\n");
    }
    out.push_str("Gantt Chart:\n");
    let _ = writeln!(out, "{}", outcome.timeline);
    out.push('\n');
    out.push_str(&render_bar(outcome));

    if let Some(rows) = &outcome.detail_table {
        out.push('\n');
        out.push_str(&render_table(rows));
    }

    let m = &outcome.metrics;
    out.push('\n');
    let _ = writeln!(out, "Makespan: {}", m.makespan);
    let _ = writeln!(out, "CPU Utilization: {:.2}%", m.cpu_utilization * 100.0);
    let _ = writeln!(out, "Throughput: {:.2}", m.throughput);
    let _ = writeln!(out, "Context Switches: {}", m.context_switches);
    out
}

/// Gantt bar with a time axis, one cell per merged segment.
fn render_bar(outcome: &SimulationOutcome) -> String {
    let segments = outcome.timeline.segments();
    if segments.is_empty() {
        return String::new();
    }

    let mut bar = String::from("|");
    let mut axis = String::new();
    let mut cursor = None;
    for segment in &segments {
        // Empty cell for a clock jump
        if let Some(end) = cursor {
            if segment.start > end {
                axis_mark(&mut axis, bar.len() - 1, end);
                bar.push_str("    |");
            }
        }
        let label = segment.occupant.to_string();
        let width = label.len().max(4) + 2;
        axis_mark(&mut axis, bar.len() - 1, segment.start);
        let _ = write!(bar, "{label:^width$}|");
        cursor = Some(segment.end);
    }
    if let Some(end) = cursor {
        axis_mark(&mut axis, bar.len() - 1, end);
    }
    format!("{bar}\n{axis}\n")
}

fn axis_mark(axis: &mut String, column: usize, t: i64) {
    while axis.len() < column {
        axis.push(' ');
    }
    let _ = write!(axis, "{t}");
}

/// Per-process detail table.
pub fn render_table(rows: &[DetailRow]) -> String {
    let mut out = String::new();
    let header: Vec<String> = TABLE_HEADERS.iter().map(|h| format!("{h:>15}")).collect();
    let _ = writeln!(out, "{}", header.join(" "));
    for row in rows {
        let _ = writeln!(
            out,
            "{:>15} {:>15} {:>15} {:>15} {:>15}",
            format!("P{}", row.pid),
            row.arrival_time,
            row.burst_time,
            row.waiting_time,
            row.turnaround_time
        );
    }
    out
}

/// Side-by-side summary of several runs.
pub fn render_comparison(results: &[(PolicyKind, Result<SimulationOutcome, SimulationError>)]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8} {:>12} {:>15} {:>12} {:>9} {:>9}",
        "Policy", "Avg Waiting", "Avg Turnaround", "Avg Response", "Makespan", "Switches"
    );
    for (kind, result) in results {
        match result {
            Ok(outcome) => {
                let m = &outcome.metrics;
                let _ = writeln!(
                    out,
                    "{:<8} {:>12.2} {:>15.2} {:>12.2} {:>9} {:>9}",
                    kind.name(),
                    m.avg_waiting_time,
                    m.avg_turnaround_time,
                    m.avg_response_time,
                    m.makespan,
                    m.context_switches
                );
            }
            Err(e) => {
                let _ = writeln!(
                    out,
                    "{:<8} {:>12} {:>15} {:>12} {:>9} {:>9}  {e}",
                    kind.name(),
                    "-",
                    "-",
                    "-",
                    "-",
                    "-"
                );
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpu_schedule::models::ProcessSpec;
    use cpu_schedule::simulator;

    #[test]
    fn test_render_fcfs() {
        let specs = vec![ProcessSpec::new(0, 5), ProcessSpec::new(2, 3)];
        let text = render_outcome(&simulator::fcfs(&specs).unwrap());
        assert!(text.contains("Average Waiting Time: 1.50\n"));
        assert!(text.contains("Average Turnaround Time: 5.50\n"));
        assert!(text.contains("Gantt Chart:\nP1 | P2\n"));
        assert!(text.contains("Process ID"));
        assert!(!text.contains("Note:"));
    }

    #[test]
    fn test_render_priority_note() {
        let specs = vec![ProcessSpec::new(0, 2).with_priority(1)];
        let text = render_outcome(&simulator::preemptive_priority(&specs).unwrap());
        assert!(text.contains("Note: Small values have high priority.\n"));
        // No detail table for preemptive policies
        assert!(!text.contains("Process ID"));
    }

    #[test]
    fn test_bar_axis() {
        let specs = vec![ProcessSpec::new(0, 2), ProcessSpec::new(6, 1)];
        let outcome = simulator::fcfs(&specs).unwrap();
        let bar = render_bar(&outcome);
        let mut lines = bar.lines();
        assert_eq!(lines.next(), Some("|  P1  |    |  P2  |"));
        let axis = lines.next().unwrap();
        assert!(axis.starts_with('0'));
        assert!(axis.contains('2'));
        assert!(axis.contains('6'));
        assert!(axis.ends_with('7'));
    }

    #[test]
    fn test_bar_long_burst() {
        let outcome = simulator::fcfs(&[ProcessSpec::new(0, 100_000)]).unwrap();
        let bar = render_bar(&outcome);
        let mut lines = bar.lines();
        assert_eq!(lines.next(), Some("|  P1  |"));
        let axis = lines.next().unwrap();
        assert!(axis.starts_with('0'));
        assert!(axis.ends_with("100000"));
    }

    #[test]
    fn test_comparison_error_row_aligned() {
        use cpu_schedule::policies::Variant;
        use cpu_schedule::Simulator;

        let specs = vec![ProcessSpec::new(0, 5), ProcessSpec::new(1, 2)];
        let results = Simulator::new().compare(&specs, Some(0), Variant::Legacy);
        let text = render_comparison(&results);
        let header = text.lines().next().unwrap();
        let rr = text.lines().find(|l| l.starts_with("RR")).unwrap();
        // Placeholder cells end on the header's last column
        assert!(rr[..header.len()].ends_with('-'));
        assert!(rr[header.len()..].starts_with("  invalid input"));
        assert!(rr.contains("quantum"));
    }

    #[test]
    fn test_table_rows() {
        let rows = [DetailRow {
            pid: 3,
            arrival_time: 1,
            burst_time: 4,
            waiting_time: 2,
            turnaround_time: 6,
        }];
        let table = render_table(&rows);
        assert_eq!(table.lines().count(), 2);
        assert!(table.lines().nth(1).unwrap().trim_start().starts_with("P3"));
    }
}
