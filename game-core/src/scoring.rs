use crate::GUESSES_PER_PLAYER;

/// Points for solving, keyed by the 1-based number of guesses taken.
pub const EFFICIENCY_POINTS: [u32; GUESSES_PER_PLAYER] = [50, 40, 30, 20, 10, 5];

/// Flat bonus for the first player to solve in a round.
pub const SPEED_BONUS: u32 = 10;

/// Ceiling on what a chooser can earn from one round of guesser mistakes.
pub const MAX_CHOOSER_POINTS: u32 = 60;

pub struct ScoringEngine;

impl ScoringEngine {
    /// Efficiency award for solving in `guesses_taken` guesses. Zero for
    /// anything outside the table, which covers failing to solve within the
    /// per-round cap.
    pub fn efficiency_points(guesses_taken: usize) -> u32 {
        match guesses_taken {
            1..=GUESSES_PER_PLAYER => EFFICIENCY_POINTS[guesses_taken - 1],
            _ => 0,
        }
    }

    pub fn speed_bonus() -> u32 {
        SPEED_BONUS
    }

    /// Per-guess credit to the chooser, paid each time a guesser submits an
    /// accepted guess beyond their first of the round.
    ///
    /// `player_count` is the room's live player count, chooser included.
    /// Over a round where every guesser burns all their guesses the credits
    /// sum to at most [`MAX_CHOOSER_POINTS`].
    pub fn chooser_reward(player_count: usize) -> u32 {
        debug_assert!(player_count >= 2, "a round needs at least one guesser");
        let guessers = player_count.saturating_sub(1).max(1) as u32;
        MAX_CHOOSER_POINTS / (GUESSES_PER_PLAYER as u32 * guessers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_efficiency_table_is_monotonically_decreasing() {
        for pair in EFFICIENCY_POINTS.windows(2) {
            assert!(pair[0] > pair[1]);
        }
    }

    #[test]
    fn test_efficiency_extremes() {
        assert_eq!(
            ScoringEngine::efficiency_points(1),
            EFFICIENCY_POINTS[0]
        );
        assert_eq!(
            ScoringEngine::efficiency_points(GUESSES_PER_PLAYER),
            EFFICIENCY_POINTS[GUESSES_PER_PLAYER - 1]
        );
    }

    #[test]
    fn test_no_efficiency_points_outside_the_table() {
        assert_eq!(ScoringEngine::efficiency_points(0), 0);
        assert_eq!(ScoringEngine::efficiency_points(GUESSES_PER_PLAYER + 1), 0);
    }

    #[test]
    fn test_chooser_reward_scales_with_guesser_count() {
        // 60 / (6 * guessers)
        assert_eq!(ScoringEngine::chooser_reward(2), 10);
        assert_eq!(ScoringEngine::chooser_reward(3), 5);
        assert_eq!(ScoringEngine::chooser_reward(4), 3);
        assert_eq!(ScoringEngine::chooser_reward(6), 2);
    }

    #[test]
    fn test_chooser_round_total_stays_under_cap() {
        for player_count in 2..=6usize {
            let guessers = (player_count - 1) as u32;
            // Every guesser exhausting the cap yields cap-1 crediting guesses.
            let total = ScoringEngine::chooser_reward(player_count)
                * (GUESSES_PER_PLAYER as u32 - 1)
                * guessers;
            assert!(total <= MAX_CHOOSER_POINTS);
        }
    }
}
