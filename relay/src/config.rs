use std::time::Duration;

use clap::Parser;
use relay_core::RegistryConfig;

/// CLI surface for the relay process, per SPEC_FULL §6.
#[derive(Parser, Debug, Clone)]
#[command(name = "relay", about = "Connectionless group-messaging relay")]
pub struct Cli {
    /// Bind address.
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Bind port.
    #[arg(long, default_value_t = 5000)]
    pub port: u16,

    /// Seconds an emptied group survives before the sweeper reaps it.
    #[arg(long = "empty-ttl", default_value_t = 300)]
    pub empty_ttl: u64,

    /// Sweep interval, in seconds.
    #[arg(long = "sweep", default_value_t = 30)]
    pub sweep: u64,

    /// Advertised heartbeat interval, in seconds. Used in `PONG` replies and as the
    /// base of the 3x inactivity eviction threshold.
    #[arg(long = "heartbeat", default_value_t = 60)]
    pub heartbeat: u64,

    /// Default per-group member cap. Omit for unlimited.
    #[arg(long, default_value_t = 128)]
    pub cap: usize,

    /// Unlimited group size instead of the default/explicit `--cap`.
    #[arg(long = "no-cap", default_value_t = false)]
    pub no_cap: bool,

    /// Max number of live groups a single client may own at once.
    #[arg(long = "max-groups-per-client", default_value_t = 3)]
    pub max_groups_per_client: usize,
}

impl Cli {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            default_cap: if self.no_cap { None } else { Some(self.cap) },
            max_groups_per_client: self.max_groups_per_client,
            heartbeat_interval: Duration::from_secs(self.heartbeat),
            empty_ttl: Duration::from_secs(self.empty_ttl),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn defaults_match_spec_table() {
        let cli = Cli::parse_from(["relay"]);
        assert_eq!(cli.host, "0.0.0.0");
        assert_eq!(cli.port, 5000);
        assert_eq!(cli.empty_ttl, 300);
        assert_eq!(cli.sweep, 30);
        assert_eq!(cli.heartbeat, 60);
        assert_eq!(cli.cap, 128);
        assert_eq!(cli.max_groups_per_client, 3);
        assert_eq!(cli.registry_config().default_cap, Some(128));
    }

    #[test]
    fn no_cap_overrides_default_cap() {
        let cli = Cli::parse_from(["relay", "--no-cap"]);
        assert_eq!(cli.registry_config().default_cap, None);
    }
}
