//! One function per verb, per SPEC_FULL §4.D. Each handler touches the registry
//! first (any valid-framed command counts as activity) and always produces a reply
//! string — success or `ERR ...` — there is no handler path that raises past here.

use std::time::Instant;

use relay_core::{reply, ClientAddr, Command, Registry, RelayError};

pub fn handle(registry: &Registry, addr: ClientAddr, cmd: Command, now: Instant, heartbeat_secs: u64) -> String {
    registry.touch(addr, now);

    let result = match cmd {
        Command::Create => registry.create_group(addr, now).map(|id| reply::created(&id)),
        Command::Join(id) => registry.join(addr, &id, now).map(|_| reply::joined(&id)),
        Command::Leave(id) => registry.leave(addr, &id, now).map(|_| reply::left(&id)),
        Command::Ping => Ok(reply::pong(heartbeat_secs)),
        Command::Who => registry.who(addr).map(|(id, count)| reply::who(&id, count)),
    };

    render(result)
}

pub fn render(result: Result<String, RelayError>) -> String {
    match result {
        Ok(s) => s,
        Err(e) => e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::RegistryConfig;
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::time::Duration;

    fn addr(port: u16) -> ClientAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
    }

    fn registry() -> Registry {
        Registry::new(RegistryConfig {
            default_cap: Some(2),
            max_groups_per_client: 3,
            heartbeat_interval: Duration::from_secs(60),
            empty_ttl: Duration::from_secs(5),
        })
    }

    #[test]
    fn ping_replies_with_configured_heartbeat() {
        let reg = registry();
        let reply = handle(&reg, addr(1), Command::Ping, Instant::now(), 60);
        assert_eq!(reply, "PONG 60");
    }

    #[test]
    fn create_then_join_then_who() {
        let reg = registry();
        let now = Instant::now();
        let created = handle(&reg, addr(1), Command::Create, now, 60);
        assert!(created.starts_with("OK CREATED "));
        let id_str = created.strip_prefix("OK CREATED ").unwrap();
        let id = relay_core::GroupId::parse(id_str).unwrap();

        let joined = handle(&reg, addr(1), Command::Join(id.clone()), now, 60);
        assert_eq!(joined, format!("OK JOINED {id}"));

        let who = handle(&reg, addr(1), Command::Who, now, 60);
        assert_eq!(who, format!("OK WHO {id} 1"));

        let left = handle(&reg, addr(1), Command::Leave(id.clone()), now, 60);
        assert_eq!(left, format!("OK LEFT {id}"));
    }

    #[test]
    fn who_without_membership_is_not_in_group() {
        let reg = registry();
        let reply = handle(&reg, addr(1), Command::Who, Instant::now(), 60);
        assert_eq!(reply, "ERR NOT_IN_GROUP NotInGroup");
    }
}
