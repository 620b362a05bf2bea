//! Answer checking and the speed-increase policy.

/// Levels between speed-ups when speed increase is enabled
pub const SPEED_STEP_LEVELS: u32 = 10;
/// Each speed-up leaves this share of the base fall time
pub const SPEED_FACTOR: f64 = 0.9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    /// Not a number; ignored without any state change
    Invalid,
    /// A number, but not the square, or nothing to answer right now
    Rejected,
}

pub fn square(number: u32) -> u64 {
    let n = u64::from(number);
    n * n
}

pub fn parse_answer(input: &str) -> Option<i64> {
    input.trim().parse::<i64>().ok()
}

pub fn judge(input: &str, number: u32) -> Outcome {
    match parse_answer(input) {
        None => Outcome::Invalid,
        Some(answer) if u64::try_from(answer).ok() == Some(square(number)) => Outcome::Correct,
        Some(_) => Outcome::Rejected,
    }
}

/// Fall time for `level`, always derived from the base so repeated
/// speed-ups do not accumulate rounding error
pub fn scaled_speed(base_secs: f64, level: u32) -> f64 {
    let steps = (level / SPEED_STEP_LEVELS) as i32;
    base_secs * SPEED_FACTOR.powi(steps)
}

pub fn is_speed_step(level: u32) -> bool {
    level > 0 && level % SPEED_STEP_LEVELS == 0
}
