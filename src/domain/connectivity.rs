//! Service reachability state

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Process-wide view of whether the service answered its last probe.
/// Clones share the same flag. Only an explicit probe updates it.
#[derive(Debug, Clone)]
pub struct ConnectivityState {
    online: Arc<AtomicBool>,
}

impl ConnectivityState {
    pub fn new(online: bool) -> Self {
        Self {
            online: Arc::new(AtomicBool::new(online)),
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl Default for ConnectivityState {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let state = ConnectivityState::new(true);
        let other = state.clone();
        other.set_online(false);
        assert!(!state.is_online());
    }
}
