use std::time::Duration;

/// Registry-facing tuning knobs. The CLI layer (`relay`'s `Config`) owns the raw
/// `--flag` parsing and builds one of these; the registry never sees `clap`.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Default per-group member cap applied at `!CREATE` time. `None` means
    /// unlimited.
    pub default_cap: Option<usize>,
    /// Ownership cap: max live groups a single client may own at once.
    pub max_groups_per_client: usize,
    /// Seconds advertised in `PONG` and used to derive the 3x inactivity threshold.
    pub heartbeat_interval: Duration,
    /// How long an emptied group survives before the sweeper reaps it.
    pub empty_ttl: Duration,
}

impl RegistryConfig {
    /// `3 × heartbeat_interval`, the inactivity threshold from §3.
    pub fn inactivity_threshold(&self) -> Duration {
        self.heartbeat_interval * 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactivity_threshold_is_triple_heartbeat() {
        let cfg = RegistryConfig {
            default_cap: Some(128),
            max_groups_per_client: 3,
            heartbeat_interval: Duration::from_secs(60),
            empty_ttl: Duration::from_secs(300),
        };
        assert_eq!(cfg.inactivity_threshold(), Duration::from_secs(180));
    }
}
