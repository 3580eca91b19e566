use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Fuente de tiempo de los cachés.
///
/// Se inyecta en [`super::TtlCache`] para que los tests puedan avanzar el
/// reloj sin dormir.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Reloj monotónico del sistema
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Reloj manual para tests: sólo avanza cuando se llama a [`ManualClock::advance`].
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock()
    }
}
