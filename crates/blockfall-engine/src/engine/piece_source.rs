use std::str::FromStr;

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{EmptySequenceError, core::piece::PieceKind};

/// Supplies the kind of each newly spawned piece.
///
/// Any `FnMut() -> PieceKind` closure is a source, which keeps scripted tests
/// short:
///
/// ```
/// use blockfall_engine::{GameSession, PieceKind};
///
/// let session = GameSession::new(|| PieceKind::O);
/// ```
pub trait PieceSource {
    fn next_piece(&mut self) -> PieceKind;
}

impl<F> PieceSource for F
where
    F: FnMut() -> PieceKind,
{
    fn next_piece(&mut self) -> PieceKind {
        self()
    }
}

/// Seed for deterministic piece generation.
///
/// A 128-bit seed for the generator behind [`RandomPieceSource`]. It
/// serializes as 32 lowercase hex digits and parses from the same format.
///
/// # Example
///
/// ```
/// use blockfall_engine::{PieceSource as _, PieceSeed, RandomPieceSource};
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
/// let mut a = RandomPieceSource::with_seed(seed);
/// let mut b = RandomPieceSource::with_seed(seed);
/// assert_eq!(a.next_piece(), b.next_piece());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(value.to_be_bytes())
    }

    #[must_use]
    pub const fn to_u128(self) -> u128 {
        u128::from_be_bytes(self.0)
    }

    #[must_use]
    pub fn to_hex(self) -> String {
        format!("{:032x}", self.to_u128())
    }
}

/// Error returned when parsing a [`PieceSeed`] from a string fails.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid seed {input:?}: expected 32 hex digits")]
pub struct ParsePieceSeedError {
    input: String,
}

impl FromStr for PieceSeed {
    type Err = ParsePieceSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePieceSeedError {
            input: s.to_owned(),
        };
        if s.len() != 32 {
            return Err(err());
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| err())?;
        Ok(Self::from_u128(num))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `PieceSeed` values with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

/// Uniformly random pieces from a seeded generator.
///
/// Each draw is independent; there is no bag, so repeats and droughts are
/// possible.
#[derive(Debug, Clone)]
pub struct RandomPieceSource {
    seed: PieceSeed,
    rng: Pcg32,
}

impl Default for RandomPieceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomPieceSource {
    /// Creates a source with a seed taken from the thread-local generator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self {
            seed,
            rng: Pcg32::from_seed(seed.0),
        }
    }

    /// Returns the seed this source was created with.
    #[must_use]
    pub const fn seed(&self) -> PieceSeed {
        self.seed
    }
}

impl PieceSource for RandomPieceSource {
    fn next_piece(&mut self) -> PieceKind {
        self.rng.random()
    }
}

/// Cycles through a fixed list of pieces.
#[derive(Debug, Clone)]
pub struct SequencePieceSource {
    pieces: Vec<PieceKind>,
    next: usize,
}

impl SequencePieceSource {
    pub fn new<I>(pieces: I) -> Result<Self, EmptySequenceError>
    where
        I: IntoIterator<Item = PieceKind>,
    {
        let pieces: Vec<_> = pieces.into_iter().collect();
        if pieces.is_empty() {
            return Err(EmptySequenceError);
        }
        Ok(Self { pieces, next: 0 })
    }
}

impl PieceSource for SequencePieceSource {
    fn next_piece(&mut self) -> PieceKind {
        let kind = self.pieces[self.next];
        self.next = (self.next + 1) % self.pieces.len();
        kind
    }
}
