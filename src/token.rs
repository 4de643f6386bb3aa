use {
    crate::{Error, Result},
    rand::{
        rngs::{StdRng, ThreadRng},
        Rng,
        SeedableRng,
    },
    std::{
        cmp::Ordering,
        fmt,
        hash::{Hash, Hasher},
    },
};

/// Position on the normalized ring, a real number in `[0, 1)`.
///
/// Tokens are totally ordered (using IEEE 754 total ordering), so they can be
/// used as keys of ordered containers. Construction rejects anything outside
/// of the token space, `NaN` included.
#[derive(Clone, Copy, Debug, Default)]
pub struct Token(f64);

impl Token {
    /// The smallest token, i.e. the origin of the ring.
    pub const MIN: Self = Self(0.0);

    /// Creates a token, checking that `value` lies in `[0, 1)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use overcommit::Token;
    ///
    /// assert_eq!(Token::new(0.25).unwrap().value(), 0.25);
    /// assert!(Token::new(1.0).is_err());
    /// assert!(Token::new(f64::NAN).is_err());
    /// ```
    pub fn new(value: f64) -> Result<Self> {
        if (0.0..1.0).contains(&value) {
            // Normalizes `-0.0` to `0.0`, so that both compare equal.
            Ok(Self(value + 0.0))
        } else {
            Err(Error::TokenOutOfRange(value))
        }
    }

    /// Returns the position of the token on the ring.
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Token {}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl TryFrom<f64> for Token {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Token> for f64 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Source of uniformly distributed ring tokens.
///
/// Ring construction draws every vnode token from a `TokenSource`, which makes
/// the source of randomness an explicit capability: simulations use
/// [`RandomTokens`], while tests can substitute deterministic draws.
pub trait TokenSource {
    /// Returns the next token, drawn uniformly from `[0, 1)`.
    fn next_token(&mut self) -> Token;
}

/// Token source backed by a `rand` generator.
#[derive(Clone, Debug)]
pub struct RandomTokens<R = ThreadRng> {
    rng: R,
}

impl Default for RandomTokens<ThreadRng> {
    /// Uses the thread-local generator, lazily seeded from OS entropy.
    fn default() -> Self {
        Self::new(rand::rng())
    }
}

impl RandomTokens<StdRng> {
    /// Creates a reproducible source: the same seed yields the same tokens.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomTokens<R> {
    /// Creates a source drawing tokens from the given generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> TokenSource for RandomTokens<R> {
    fn next_token(&mut self) -> Token {
        // The standard distribution for `f64` samples from `[0, 1)`.
        Token(self.rng.random::<f64>())
    }
}
