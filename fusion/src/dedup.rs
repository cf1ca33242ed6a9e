//! Lightning Notification Deduplication
//!
//! A storm sitting at the same distance keeps re-reporting itself; the
//! gate lets the first report through and suppresses repeats until the
//! distance changes. State lives in memory only.

/// Remembers the last storm distance that was alerted on.
#[derive(Debug, Default)]
pub struct LightningGate {
    last_alerted: Option<f64>,
}

impl LightningGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a consumed storm distance; returns whether to alert.
    ///
    /// Alerts whenever the distance differs from the last alerted one,
    /// including the very first observation.
    pub fn observe(&mut self, distance_km: f64) -> bool {
        if self.last_alerted == Some(distance_km) {
            return false;
        }
        self.last_alerted = Some(distance_km);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_alerts() {
        let mut gate = LightningGate::new();
        assert!(gate.observe(12.0));
    }

    #[test]
    fn repeat_distance_is_suppressed() {
        let mut gate = LightningGate::new();
        assert!(gate.observe(12.0));
        assert!(!gate.observe(12.0));
        assert!(!gate.observe(12.0));
    }

    #[test]
    fn changed_distance_alerts_again() {
        let mut gate = LightningGate::new();
        assert!(gate.observe(12.0));
        assert!(gate.observe(8.0));
        assert!(!gate.observe(8.0));
        // Returning to a previously alerted distance still counts as a change.
        assert!(gate.observe(12.0));
    }
}
