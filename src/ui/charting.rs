/// Points for the answer-time chart: (answer number, seconds)
pub fn answer_points(durations: &[f64]) -> Vec<(f64, f64)> {
    durations
        .iter()
        .enumerate()
        .map(|(i, secs)| ((i + 1) as f64, *secs))
        .collect()
}

/// Compute X (answers) and Y (seconds) bounds for the answer-time chart
pub fn compute_chart_params(durations: &[f64]) -> (f64, f64) {
    let slowest = durations.iter().copied().fold(0.0_f64, f64::max);
    let answers = (durations.len() as f64).max(2.0);
    (answers, slowest.ceil().max(1.0))
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
