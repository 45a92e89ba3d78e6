//! Sources of randomness
//!
//! Every cryptographic random value in this crate is drawn through [`RandomSource`]. There are two
//! implementations: [`OsSource`], backed by the operating system, and [`EntropyPool`], which
//! relies on entropy supplied by the caller for platforms without an OS generator. A process
//! picks one of them once with [`platform_source`].
use crate::{arithmetics::from_be_bytes, BigInt, Error, Result};
use rand::{
    rngs::{OsRng, StdRng},
    RngCore, SeedableRng,
};
use sha3::{Digest, Sha3_256};
use tracing::{info, warn};

/// Estimated bits of entropy the pool must receive before it produces output
pub const SEED_BITS: usize = 256;

/// Callback fired once a source becomes ready to produce randomness
pub type OnReady = Box<dyn FnOnce() + Send>;

pub trait RandomSource {
    /// Mix caller-supplied entropy into the source. The strength of the input is advisory.
    fn add_entropy(&mut self, seed: &[u8]);

    /// Make sure the source is seeded and call `on_ready` exactly once when it is: immediately
    /// if that is already the case, otherwise as soon as enough entropy has arrived
    fn autoseed(&mut self, on_ready: Option<OnReady>);

    /// Return true iff the source can produce output
    fn is_ready(&self) -> bool;

    /// Fill the buffer with random bytes, failing if the source is not seeded
    fn next_bytes(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Sample uniformly from [0, max) by rejection: draw as many random bits as max has, and
    /// draw again whenever the result is not below max
    fn random_integer(&mut self, max: &BigInt) -> Result<BigInt> {
        if *max == BigInt::ZERO {
            return Err(Error::InvalidParameters("cannot sample below zero".into()));
        }
        let bits = max.bits();
        let len = (bits + 7) / 8;
        let excess_bits = len * 8 - bits;
        let mut buf = vec![0u8; len];
        loop {
            self.next_bytes(&mut buf)?;
            buf[0] &= 0xffu8 >> excess_bits;
            let candidate = from_be_bytes(&buf)?;
            if candidate < *max {
                return Ok(candidate);
            }
        }
    }
}

/// Randomness from the operating system, which is always seeded
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSource;

impl OsSource {
    pub fn new() -> Self {
        Self
    }
}

impl RandomSource for OsSource {
    /// The operating system collects its own entropy
    fn add_entropy(&mut self, _seed: &[u8]) {}

    fn autoseed(&mut self, on_ready: Option<OnReady>) {
        if let Some(on_ready) = on_ready {
            on_ready();
        }
    }

    fn is_ready(&self) -> bool {
        true
    }

    fn next_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        OsRng.try_fill_bytes(buf)?;
        return Ok(());
    }
}

/// A pool that accumulates caller-supplied entropy into a SHA3-256 state. Once the pool has
/// received an estimated `SEED_BITS` bits, the state seeds a ChaCha-based `StdRng`; later
/// entropy reseeds it.
///
/// Each supplied byte is credited with 8 bits, which is only as good as the caller's input.
pub struct EntropyPool {
    state: [u8; 32],
    credited_bits: usize,
    generator: Option<StdRng>,
    listeners: Vec<OnReady>,
}

impl EntropyPool {
    pub fn new() -> Self {
        Self {
            state: [0u8; 32],
            credited_bits: 0,
            generator: None,
            listeners: vec![],
        }
    }

    /// Estimated bits of entropy received so far
    pub fn get_credited_bits(&self) -> usize {
        self.credited_bits
    }
}

impl Default for EntropyPool {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EntropyPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntropyPool")
            .field("credited_bits", &self.credited_bits)
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl RandomSource for EntropyPool {
    fn add_entropy(&mut self, seed: &[u8]) {
        let mut hasher = Sha3_256::new();
        hasher.update(self.state);
        hasher.update(seed);
        self.state = hasher.finalize().into();
        self.credited_bits = self.credited_bits.saturating_add(seed.len() * 8);

        if self.credited_bits < SEED_BITS {
            return;
        }
        let newly_seeded = self.generator.is_none();
        self.generator = Some(StdRng::from_seed(self.state));
        if newly_seeded {
            info!(credited_bits = self.credited_bits, "entropy pool seeded");
            for listener in self.listeners.drain(..) {
                listener();
            }
        }
    }

    fn autoseed(&mut self, on_ready: Option<OnReady>) {
        match (self.is_ready(), on_ready) {
            (true, Some(on_ready)) => on_ready(),
            (false, Some(on_ready)) => self.listeners.push(on_ready),
            (_, None) => {}
        }
    }

    fn is_ready(&self) -> bool {
        self.generator.is_some()
    }

    fn next_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        match self.generator.as_mut() {
            Some(generator) => {
                generator.fill_bytes(buf);
                return Ok(());
            }
            None => return Err(Error::NotSeeded),
        }
    }
}

/// Pick the source for this process: the operating system generator when it works, otherwise a
/// pool that waits for entropy from the caller
pub fn platform_source() -> Box<dyn RandomSource + Send> {
    let mut buf = [0u8; 8];
    match OsRng.try_fill_bytes(&mut buf) {
        Ok(()) => Box::new(OsSource::new()),
        Err(e) => {
            warn!(
                error = %e,
                "operating system randomness unavailable, using entropy pool"
            );
            Box::new(EntropyPool::new())
        }
    }
}
