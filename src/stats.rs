use crate::config::LEADERBOARD_LIVES;
use crate::leaderboard::{Category, LeaderboardStore};
use crate::mode::{Hardness, SpeedMode};
use crate::session::{Phase, Session};

pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Population standard deviation
pub fn std_dev(samples: &[f64]) -> Option<f64> {
    let avg = mean(samples)?;
    let variance = samples
        .iter()
        .map(|value| {
            let diff = avg - value;
            diff * diff
        })
        .sum::<f64>()
        / samples.len() as f64;
    Some(variance.sqrt())
}

/// A score enters the leaderboard only for preset modes played with the
/// default number of lives, and only if at least one brick was squared
pub fn is_eligible(speed_mode: SpeedMode, hardness: Hardness, lives_setting: u32, level: u32) -> bool {
    !speed_mode.is_custom()
        && !hardness.is_custom()
        && lives_setting == LEADERBOARD_LIVES
        && level > 0
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub speed_mode: SpeedMode,
    pub hardness: Hardness,
    pub level: u32,
    pub correct_answers: u32,
    pub average_answer_secs: Option<f64>,
    pub answer_spread_secs: Option<f64>,
    pub failed_numbers: Vec<u32>,
    pub eligible: bool,
    /// Whether this session's score has been committed
    pub saved: bool,
    pub rank: Option<usize>,
}

impl SessionSummary {
    pub fn average_label(&self) -> String {
        match self.average_answer_secs {
            Some(avg) => format!("{avg:.2}s"),
            None => "N/A".to_string(),
        }
    }
}

pub fn summarize(session: &Session) -> SessionSummary {
    let durations = session.answer_durations();
    SessionSummary {
        speed_mode: session.speed_mode(),
        hardness: session.hardness(),
        level: session.level(),
        correct_answers: session.correct_count(),
        average_answer_secs: mean(durations),
        answer_spread_secs: std_dev(durations),
        failed_numbers: session.failed_numbers().to_vec(),
        eligible: is_eligible(
            session.speed_mode(),
            session.hardness(),
            session.settings().lives,
            session.level(),
        ),
        saved: session.is_committed(),
        rank: session.leaderboard_rank(),
    }
}

/// Compute the end-of-game summary and, the first time it is asked for after
/// game over, commit an eligible score. Save failures are logged and
/// swallowed; the session is marked committed either way so a retry cannot
/// double count.
pub fn finalize(session: &mut Session, store: &dyn LeaderboardStore) -> SessionSummary {
    let summary = summarize(session);
    if session.phase() != Phase::GameOver || session.is_committed() || !summary.eligible {
        return summary;
    }
    let Some(category) = Category::new(summary.speed_mode, summary.hardness) else {
        return summary;
    };

    let mut board = store.load();
    let rank = board.record(category, summary.level);
    if let Err(e) = store.save(&board) {
        log::warn!("could not save leaderboard: {}", e);
    } else {
        log::info!("level {} saved to {} (rank {:?})", summary.level, category.key(), rank);
    }
    session.mark_committed(rank);
    summarize(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::judge;
    use crate::leaderboard::{MemoryLeaderboardStore, MAX_ENTRIES};
    use crate::mode::GameConfig;
    use crate::round::RoundGenerator;
    use std::time::{Duration, Instant};

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.5, 2.5, 3.5]), Some(2.5));
        assert_eq!(mean(&[4.0]), Some(4.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), Some(2.0));
        assert_eq!(std_dev(&[3.0, 3.0]), Some(0.0));
        assert_eq!(std_dev(&[]), None);
    }

    #[test]
    fn eligibility_over_all_sixteen_combinations() {
        for custom_mode in [false, true] {
            for custom_hardness in [false, true] {
                for default_lives in [false, true] {
                    for scored in [false, true] {
                        let mode = if custom_mode { SpeedMode::Custom } else { SpeedMode::Expert };
                        let hardness = if custom_hardness { Hardness::Custom } else { Hardness::Hard };
                        let lives = if default_lives { 3 } else { 4 };
                        let level = if scored { 7 } else { 0 };
                        let expected = !custom_mode && !custom_hardness && default_lives && scored;
                        assert_eq!(
                            is_eligible(mode, hardness, lives, level),
                            expected,
                            "mode={mode} hardness={hardness} lives={lives} level={level}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn custom_values_matching_a_preset_stay_ineligible() {
        assert!(!is_eligible(SpeedMode::Custom, Hardness::Medium, 3, 10));
        assert!(!is_eligible(SpeedMode::Beginner, Hardness::Custom, 3, 10));
    }

    fn finished_session(config: GameConfig, lives: u32, correct: u32) -> Session {
        let t0 = Instant::now();
        let settings = Settings {
            lives,
            speed_increase: false,
        };
        let mut session = Session::new(config, settings, RoundGenerator::seeded(5), t0);
        for i in 0..correct {
            let n = session.current_number().unwrap();
            let now = t0 + Duration::from_secs(u64::from(i + 1));
            session.submit(&judge::square(n).to_string(), now);
            session.spawn_round(now);
        }
        let mut now = t0 + Duration::from_secs(u64::from(correct + 1));
        while session.phase() != Phase::GameOver {
            now += Duration::from_secs(100);
            session.tick(now);
        }
        session
    }

    fn preset() -> GameConfig {
        GameConfig::resolve(SpeedMode::Beginner, Hardness::Medium, None, None).unwrap()
    }

    #[test]
    fn finalize_commits_once() {
        let store = MemoryLeaderboardStore::new();
        let mut session = finished_session(preset(), 3, 4);

        let first = finalize(&mut session, &store);
        assert!(first.saved);
        assert_eq!(first.rank, Some(1));
        assert_eq!(first.level, 4);

        let second = finalize(&mut session, &store);
        assert_eq!(second, first);
        assert_eq!(store.saves(), 1);
        let cat = Category::new(SpeedMode::Beginner, Hardness::Medium).unwrap();
        assert_eq!(store.load().scores(cat), &[4]);
    }

    #[test]
    fn finalize_skips_ineligible_sessions() {
        let store = MemoryLeaderboardStore::new();

        let mut no_score = finished_session(preset(), 3, 0);
        assert!(!finalize(&mut no_score, &store).saved);

        let mut extra_lives = finished_session(preset(), 5, 2);
        assert!(!finalize(&mut extra_lives, &store).saved);

        let custom = GameConfig::resolve(SpeedMode::Custom, Hardness::Medium, Some(12), None).unwrap();
        let mut custom_session = finished_session(custom, 3, 2);
        let summary = finalize(&mut custom_session, &store);
        assert!(!summary.eligible);
        assert!(!summary.saved);

        assert_eq!(store.saves(), 0);
        assert!(store.load().is_empty());
    }

    #[test]
    fn finalize_before_game_over_only_summarizes() {
        let store = MemoryLeaderboardStore::new();
        let t0 = Instant::now();
        let mut session = Session::new(preset(), Settings::default(), RoundGenerator::seeded(5), t0);
        let n = session.current_number().unwrap();
        session.submit(&judge::square(n).to_string(), t0 + Duration::from_secs(2));

        let summary = finalize(&mut session, &store);
        assert!(summary.eligible);
        assert!(!summary.saved);
        assert_eq!(summary.average_answer_secs, Some(2.0));
        assert_eq!(store.saves(), 0);
    }

    #[test]
    fn leaderboard_stays_sorted_and_capped_across_sessions() {
        let store = MemoryLeaderboardStore::new();
        let cat = Category::new(SpeedMode::Beginner, Hardness::Medium).unwrap();
        for correct in [2, 6, 1, 9, 3, 5, 4] {
            let mut session = finished_session(preset(), 3, correct);
            finalize(&mut session, &store);
            let board = store.load();
            let scores = board.scores(cat);
            assert!(scores.len() <= MAX_ENTRIES);
            assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        }
        assert_eq!(store.load().scores(cat), &[9, 6, 5, 4, 3]);
    }

    #[test]
    fn failed_save_is_swallowed() {
        let store = MemoryLeaderboardStore::failing();
        let mut session = finished_session(preset(), 3, 1);
        let summary = finalize(&mut session, &store);
        assert!(summary.saved);
        assert!(session.is_committed());
    }

    #[test]
    fn average_label_formats_or_reports_na() {
        let mut session = finished_session(preset(), 3, 0);
        let summary = finalize(&mut session, &MemoryLeaderboardStore::new());
        assert_eq!(summary.average_label(), "N/A");
        assert_eq!(summary.failed_numbers.len(), 3);
    }
}
