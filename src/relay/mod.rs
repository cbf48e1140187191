pub mod port_selector;
pub mod relay_range;

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use util::conn::Listener;
use util::vnet::net::Net;
use util::Conn;

use crate::error::Result;

/// `RelayAddressGenerator` is used to generate a relay address when creating an allocation.
/// You can use the provided one or provide your own.
#[async_trait]
pub trait RelayAddressGenerator {
    /// Confirms that the generator is properly configured. Called once at server startup,
    /// before any allocation.
    fn validate(&mut self) -> Result<()>;

    /// Allocates a packet-oriented (UDP) relay conn and the address to advertise for it.
    async fn allocate_packet_conn(
        &self,
        network: &str,
        requested_port: u16,
    ) -> Result<(Arc<dyn Conn + Send + Sync>, SocketAddr)>;

    /// Allocates a connection-oriented (TCP) relay listener and the address to advertise for it.
    async fn allocate_conn(
        &self,
        network: &str,
        requested_port: u16,
    ) -> Result<(Arc<dyn Listener + Send + Sync>, SocketAddr)>;
}

/// `RelayNet` opens the sockets backing relay allocations. It is implemented by
/// [`Net`], so either the host network stack or a virtual network can be plugged in.
///
/// Only the connectionless operation is offered. A connection-oriented `listen` is left out
/// until [`RelayAddressGenerator::allocate_conn`] is implemented and needs one.
#[async_trait]
pub trait RelayNet {
    /// Opens a connectionless endpoint bound to `address` ("host:port").
    async fn listen_packet(
        &self,
        network: &str,
        address: &str,
    ) -> util::Result<Arc<dyn Conn + Send + Sync>>;
}

#[async_trait]
impl RelayNet for Net {
    async fn listen_packet(
        &self,
        network: &str,
        address: &str,
    ) -> util::Result<Arc<dyn Conn + Send + Sync>> {
        let use_ipv4 = match network {
            "udp4" => true,
            "udp6" => false,
            "udp" => !address.starts_with('['),
            _ => {
                return Err(util::Error::Other(format!(
                    "turn: unsupported packet network {}",
                    network
                )))
            }
        };

        let addr = self.resolve_addr(use_ipv4, address).await?;
        self.bind(addr).await
    }
}
