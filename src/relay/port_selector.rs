
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::net::TcpListener;

/// `PortSelector` finds a currently free port in the inclusive range `[min_port, max_port]`
/// by probing random candidates.
///
/// A probe is only a hint: it binds a throwaway TCP listener on the loopback interface, while
/// the relay socket is later bound with another transport and possibly on another interface.
/// The port may also be taken between the probe and the real bind, so that bind stays
/// authoritative and callers must handle its failure.
pub struct PortSelector {
    min_port: u16,
    max_port: u16,
    rng: Mutex<StdRng>,
}

impl PortSelector {
    /// Creates a selector whose random source is seeded from the OS.
    pub fn new(min_port: u16, max_port: u16) -> Self {
        Self::with_rng(min_port, max_port, StdRng::from_entropy())
    }

    /// Creates a selector with a fixed seed, so the sequence of probed ports is reproducible.
    pub fn with_seed(min_port: u16, max_port: u16, seed: u64) -> Self {
        Self::with_rng(min_port, max_port, StdRng::seed_from_u64(seed))
    }

    fn with_rng(min_port: u16, max_port: u16, rng: StdRng) -> Self {
        PortSelector {
            min_port,
            max_port,
            rng: Mutex::new(rng),
        }
    }

    pub fn min_port(&self) -> u16 {
        self.min_port
    }

    pub fn max_port(&self) -> u16 {
        self.max_port
    }

    /// Number of probes made by [`PortSelector::select`] before giving up.
    /// A single-port range still gets one probe.
    pub fn max_attempts(&self) -> u32 {
        if self.max_port < self.min_port {
            0
        } else {
            2 * u32::from(self.max_port - self.min_port) + 1
        }
    }

    /// Returns the first probed port that looks free, or `None` once the attempt budget
    /// is spent.
    pub async fn select(&self) -> Option<u16> {
        let attempts = self.max_attempts();
        for attempt in 1..=attempts {
            let port = self.random_port();
            if check_free_port(port).await {
                log::trace!("port {} is free (attempt {}/{})", port, attempt, attempts);
                return Some(port);
            }
            log::trace!("port {} is busy (attempt {}/{})", port, attempt, attempts);
        }

        log::warn!(
            "no free port in [{}, {}] after {} attempts",
            self.min_port,
            self.max_port,
            attempts
        );
        None
    }

    fn random_port(&self) -> u16 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(self.min_port..=self.max_port)
    }
}

/// Reports whether a TCP listener can currently be bound to `port` on the loopback interface.
/// The listener is closed before returning.
pub async fn check_free_port(port: u16) -> bool {
    // port 0 would be an ephemeral port, not 0 itself
    if port == 0 {
        return false;
    }

    TcpListener::bind(SocketAddr::new(Ipv4Addr::LOCALHOST.into(), port))
        .await
        .is_ok()
}
