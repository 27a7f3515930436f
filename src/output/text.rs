//! Human-readable text output

use crate::coordinator::ExperimentReport;
use crate::traffic::RunSummary;
use crate::util::time::{calculate_rate, format_duration, format_optional_duration, format_rate};

/// Print experiment results to console
///
/// One section per distribution run: query outcomes, cache statistics and
/// the distribution of scheduled waits.
pub fn print_report(report: &ExperimentReport) {
    println!("═══════════════════════════════════════════════════════════");
    println!("                  EXPERIMENT RESULTS");
    println!("═══════════════════════════════════════════════════════════");
    println!();
    println!("Corpus size:  {} records", report.event_count);
    println!("Queries/run:  {}", report.plan.query_count);
    println!(
        "Elapsed Time: {:.3}s",
        (report.finished_at - report.started_at).num_milliseconds() as f64 / 1000.0
    );
    if report.cancelled() {
        println!("Status:       cancelled by shutdown");
    }
    println!();

    for run in &report.runs {
        print!("{}", format_run(run));
        println!();
    }

    println!("═══════════════════════════════════════════════════════════");
}

/// Format one run section
pub fn format_run(run: &RunSummary) -> String {
    let mut out = String::new();
    let stats = &run.statistics;

    out.push_str(&format!("Distribution: {}\n", run.distribution));
    out.push_str("  Queries:\n");
    out.push_str(&format!("    Issued:    {} / {}\n", run.issued, run.requested));
    out.push_str(&format!("    Served:    {}\n", run.served));
    if run.empty > 0 {
        out.push_str(&format!("    Empty:     {}\n", run.empty));
    }
    if run.abandoned > 0 {
        out.push_str(&format!("    Abandoned: {}\n", run.abandoned));
    }
    out.push_str("  Cache:\n");
    out.push_str(&format!("    Hits:      {}\n", stats.hits));
    out.push_str(&format!("    Misses:    {}\n", stats.misses));
    out.push_str(&format!("    Hit rate:  {}\n", stats.hit_rate_display()));
    out.push_str("  Timing:\n");
    out.push_str(&format!("    Elapsed:   {}\n", format_duration(run.elapsed)));
    out.push_str(&format!(
        "    Rate:      {} queries/s\n",
        format_rate(calculate_rate(run.issued, run.elapsed))
    ));

    let intervals = &run.intervals;
    if !intervals.is_empty() {
        out.push_str(&format!("  Intervals ({} waits):\n", intervals.len()));
        out.push_str(&format!("    Min:       {}\n", format_optional_duration(intervals.min())));
        out.push_str(&format!("    Mean:      {}\n", format_optional_duration(intervals.mean())));
        out.push_str(&format!("    p50:       {}\n", format_optional_duration(intervals.percentile(50.0))));
        out.push_str(&format!("    p99:       {}\n", format_optional_duration(intervals.percentile(99.0))));
        out.push_str(&format!("    Max:       {}\n", format_optional_duration(intervals.max())));
    }
    if run.cancelled {
        out.push_str("  (cancelled)\n");
    }
    out
}
