/// Gravity interval at the start of a game.
pub const BASE_DROP_INTERVAL_MS: u64 = 1000;
/// Gravity never gets faster than this.
pub const MIN_DROP_INTERVAL_MS: u64 = 100;
/// How much the interval shrinks per speed-up.
pub const DROP_INTERVAL_STEP_MS: u64 = 100;
/// A speed-up is granted for every multiple of this score crossed.
pub const SPEED_UP_SCORE_STEP: u64 = 1000;
/// Points per cleared row.
pub const SCORE_PER_LINE: u64 = 100;

/// Game statistics tracking score, speed, lines cleared and piece count.
///
/// # Scoring
///
/// Every cleared row is worth [`SCORE_PER_LINE`] points; clearing several rows
/// at once gives no bonus. Each time the score crosses a multiple of
/// [`SPEED_UP_SCORE_STEP`], the gravity interval drops by
/// [`DROP_INTERVAL_STEP_MS`], floored at [`MIN_DROP_INTERVAL_MS`]. A single
/// lock that crosses two multiples speeds up twice.
///
/// # Example
///
/// ```
/// use blockfall_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.complete_piece_drop(4);
///
/// assert_eq!(stats.score(), 400);
/// assert_eq!(stats.total_cleared_lines(), 4);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// assert_eq!(stats.drop_interval_ms(), 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameStats {
    score: u64,
    drop_interval_ms: u64,
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    /// Creates a new tracker with all counters at zero and the base interval.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            drop_interval_ms: BASE_DROP_INTERVAL_MS,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Returns the current gravity interval in milliseconds.
    #[must_use]
    pub const fn drop_interval_ms(&self) -> u64 {
        self.drop_interval_ms
    }

    /// Returns the total number of pieces that have been locked into place.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Returns a histogram of locks by number of rows cleared.
    ///
    /// Index 0 counts locks that cleared nothing; index 4 counts four-row
    /// clears.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Updates statistics after a piece lock and returns the points gained.
    pub fn complete_piece_drop(&mut self, cleared_lines: usize) -> u64 {
        self.completed_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        if let Some(count) = self.line_cleared_counter.get_mut(cleared_lines) {
            *count += 1;
        }

        let gained = cleared_lines as u64 * SCORE_PER_LINE;
        let old_score = self.score;
        self.score += gained;

        let speed_ups = self.score / SPEED_UP_SCORE_STEP - old_score / SPEED_UP_SCORE_STEP;
        for _ in 0..speed_ups {
            self.drop_interval_ms = self
                .drop_interval_ms
                .saturating_sub(DROP_INTERVAL_STEP_MS)
                .max(MIN_DROP_INTERVAL_MS);
        }
        gained
    }
}
