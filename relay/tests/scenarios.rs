//! End-to-end scenarios from SPEC_FULL §8, driven over a real loopback UDP socket
//! against a live `Server`. Time-based eviction/expiry is covered by `relay-core`'s
//! registry unit tests instead, since those need to control `Instant` directly —
//! nothing here waits on wall-clock sweeps.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use relay::server::Server;
use relay_core::{Registry, RegistryConfig};
use tokio::net::UdpSocket;
use tokio::time::timeout;

async fn spawn_server(cfg: RegistryConfig, heartbeat: u64) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let registry = Arc::new(Registry::new(cfg));
    let server = Server::bind("127.0.0.1:0", registry, heartbeat, Duration::from_secs(3600))
        .await
        .expect("bind");
    let addr = server.local_addr().expect("local addr");
    let handle = tokio::spawn(async move {
        server.run(std::future::pending()).await;
    });
    (addr, handle)
}

async fn client() -> UdpSocket {
    UdpSocket::bind("127.0.0.1:0").await.expect("bind client")
}

async fn send(sock: &UdpSocket, to: SocketAddr, msg: &[u8]) {
    sock.send_to(msg, to).await.expect("send");
}

async fn recv_string(sock: &UdpSocket) -> String {
    let mut buf = vec![0u8; 4096];
    let (n, _) = timeout(Duration::from_secs(2), sock.recv_from(&mut buf))
        .await
        .expect("reply timeout")
        .expect("recv");
    String::from_utf8(buf[..n].to_vec()).expect("utf8 reply")
}

fn default_config() -> RegistryConfig {
    RegistryConfig {
        default_cap: Some(2),
        max_groups_per_client: 3,
        heartbeat_interval: Duration::from_secs(60),
        empty_ttl: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn scenario_1_create_join_who() {
    let (addr, handle) = spawn_server(default_config(), 60).await;
    let a = client().await;

    send(&a, addr, b"!CREATE").await;
    let created = recv_string(&a).await;
    assert!(created.starts_with("OK CREATED "));
    let id = created.strip_prefix("OK CREATED ").unwrap().to_string();
    assert_eq!(id.len(), 8);

    send(&a, addr, format!("!JOIN {id}").as_bytes()).await;
    assert_eq!(recv_string(&a).await, format!("OK JOINED {id}"));

    send(&a, addr, b"!WHO").await;
    assert_eq!(recv_string(&a).await, format!("OK WHO {id} 1"));

    handle.abort();
}

#[tokio::test]
async fn scenario_2_group_full() {
    let (addr, handle) = spawn_server(default_config(), 60).await; // cap = 2
    let a = client().await;
    let b = client().await;
    let c = client().await;

    send(&a, addr, b"!CREATE").await;
    let id = recv_string(&a).await.strip_prefix("OK CREATED ").unwrap().to_string();

    send(&a, addr, format!("!JOIN {id}").as_bytes()).await;
    recv_string(&a).await;
    send(&b, addr, format!("!JOIN {id}").as_bytes()).await;
    assert_eq!(recv_string(&b).await, format!("OK JOINED {id}"));

    send(&b, addr, b"!WHO").await;
    assert_eq!(recv_string(&b).await, format!("OK WHO {id} 2"));

    send(&c, addr, format!("!JOIN {id}").as_bytes()).await;
    assert_eq!(recv_string(&c).await, format!("ERR GROUP_FULL {id}"));

    handle.abort();
}

#[tokio::test]
async fn scenario_3_broadcast_excludes_sender_and_is_verbatim() {
    let (addr, handle) = spawn_server(default_config(), 60).await;
    let a = client().await;
    let b = client().await;

    send(&a, addr, b"!CREATE").await;
    let id = recv_string(&a).await.strip_prefix("OK CREATED ").unwrap().to_string();
    send(&a, addr, format!("!JOIN {id}").as_bytes()).await;
    recv_string(&a).await;
    send(&b, addr, format!("!JOIN {id}").as_bytes()).await;
    recv_string(&b).await;

    send(&a, addr, b"hello").await;

    // b receives the payload verbatim.
    let mut buf = vec![0u8; 4096];
    let (n, _) = timeout(Duration::from_secs(2), b.recv_from(&mut buf)).await.unwrap().unwrap();
    assert_eq!(&buf[..n], b"hello");

    // a receives nothing: no reply on broadcast success.
    let mut buf = vec![0u8; 4096];
    let result = timeout(Duration::from_millis(300), a.recv_from(&mut buf)).await;
    assert!(result.is_err(), "sender should not receive anything back");

    handle.abort();
}

#[tokio::test]
async fn scenario_4_heartbeat_and_bad_command_framing() {
    let (addr, handle) = spawn_server(default_config(), 60).await;
    let a = client().await;

    send(&a, addr, b"!PING").await;
    assert_eq!(recv_string(&a).await, "PONG 60");

    send(&a, addr, b"!FOO").await;
    assert_eq!(recv_string(&a).await, "ERR BAD_CMD UnknownCommand");

    send(&a, addr, b"!JOIN").await;
    assert_eq!(recv_string(&a).await, "ERR BAD_ARG Usage:!JOIN <GROUPID>");

    handle.abort();
}

#[tokio::test]
async fn scenario_5_owner_limit() {
    let (addr, handle) = spawn_server(default_config(), 60).await; // max_groups_per_client = 3
    let a = client().await;

    for _ in 0..3 {
        send(&a, addr, b"!CREATE").await;
        let reply = recv_string(&a).await;
        assert!(reply.starts_with("OK CREATED "));
    }

    send(&a, addr, b"!CREATE").await;
    assert_eq!(recv_string(&a).await, "ERR OWNER_LIMIT OwnerLimit");

    handle.abort();
}

#[tokio::test]
async fn payload_over_4096_bytes_is_rejected() {
    let (addr, handle) = spawn_server(default_config(), 60).await;
    let a = client().await;

    send(&a, addr, b"!CREATE").await;
    let id = recv_string(&a).await.strip_prefix("OK CREATED ").unwrap().to_string();
    send(&a, addr, format!("!JOIN {id}").as_bytes()).await;
    recv_string(&a).await;

    // Our socket write itself won't exceed the OS UDP limit, but the server's
    // buffer check is exercised directly by registry/broadcast unit tests for the
    // exact boundary; here we confirm a deliberately oversized application message
    // within UDP's practical limits still gets rejected end-to-end.
    let oversized = vec![b'x'; 4097];
    send(&a, addr, &oversized).await;
    assert_eq!(recv_string(&a).await, "ERR TOO_LARGE PayloadTooLarge");

    handle.abort();
}
