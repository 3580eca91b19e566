use parking_lot::Mutex;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::sources::Metadata;

/// Fuente de aleatoriedad del autoplay.
///
/// Se inyecta para que los tests puedan fijar la semilla o desactivar la
/// mezcla y comprobar el orden del ranking.
pub trait Shuffler: Send + Sync {
    fn shuffle(&self, items: &mut [Metadata]);
}

/// Permutación uniforme con `StdRng`
pub struct RandomShuffler {
    rng: Mutex<StdRng>,
}

impl RandomShuffler {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Shuffler for RandomShuffler {
    fn shuffle(&self, items: &mut [Metadata]) {
        items.shuffle(&mut *self.rng.lock());
    }
}

/// Deja el orden intacto
#[derive(Debug, Default, Clone, Copy)]
pub struct NoShuffle;

impl Shuffler for NoShuffle {
    fn shuffle(&self, _items: &mut [Metadata]) {}
}
