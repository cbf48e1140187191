
use std::net::{IpAddr, Ipv6Addr};

use super::port_selector::PortSelector;
use super::*;
use crate::error::*;

/// `RelayAddressGeneratorRange` binds each relay inside a port range and returns a static IP
/// address to the user. This can be used when the server sits behind a NAT or on a multi-homed
/// host and only a range of ports is forwarded or allowed.
pub struct RelayAddressGeneratorRange {
    relay_address: IpAddr,
    address: String,
    net: Option<Arc<dyn RelayNet + Send + Sync>>,
    port_selector: PortSelector,
}

impl RelayAddressGeneratorRange {
    /// `relay_address` is the IP returned to the user when the relay is created.
    /// `address` is the host the relay sockets are bound to.
    /// Relay ports are picked from the inclusive range `[min_port, max_port]`.
    pub fn new(relay_address: IpAddr, address: String, min_port: u16, max_port: u16) -> Self {
        RelayAddressGeneratorRange {
            relay_address,
            address,
            net: None,
            port_selector: PortSelector::new(min_port, max_port),
        }
    }

    /// Uses `net` to open relay sockets instead of the host network stack.
    pub fn with_net(mut self, net: Arc<dyn RelayNet + Send + Sync>) -> Self {
        self.net = Some(net);
        self
    }

    /// Seeds the port scan, making the sequence of probed ports reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.port_selector = PortSelector::with_seed(self.min_port(), self.max_port(), seed);
        self
    }

    pub fn relay_address(&self) -> IpAddr {
        self.relay_address
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn min_port(&self) -> u16 {
        self.port_selector.min_port()
    }

    pub fn max_port(&self) -> u16 {
        self.port_selector.max_port()
    }

    fn listen_address(&self, port: u16) -> String {
        if self.address.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]:{}", self.address, port)
        } else {
            format!("{}:{}", self.address, port)
        }
    }
}

#[async_trait]
impl RelayAddressGenerator for RelayAddressGeneratorRange {
    fn validate(&mut self) -> Result<()> {
        if self.net.is_none() {
            self.net = Some(Arc::new(Net::new(None)));
        }

        if self.relay_address.is_unspecified() {
            Err(Error::ErrRelayAddressInvalid)
        } else if self.address.is_empty() {
            Err(Error::ErrListeningAddressInvalid)
        } else if self.min_port() == 0 {
            Err(Error::ErrMinPortNotZero)
        } else if self.max_port() == 0 {
            Err(Error::ErrMaxPortNotZero)
        } else if self.max_port() < self.min_port() {
            Err(Error::ErrMaxPortLessThanMinPort)
        } else {
            Ok(())
        }
    }

    async fn allocate_packet_conn(
        &self,
        network: &str,
        requested_port: u16,
    ) -> Result<(Arc<dyn Conn + Send + Sync>, SocketAddr)> {
        let net = self.net.as_ref().ok_or(Error::ErrNetUnset)?;

        // the scanned port always wins over the one asked for
        if requested_port != 0 {
            log::trace!(
                "ignoring requested port {}, scanning [{}, {}]",
                requested_port,
                self.min_port(),
                self.max_port()
            );
        }

        let port = self
            .port_selector
            .select()
            .await
            .ok_or(Error::ErrNoFreePort)?;

        let address = self.listen_address(port);
        let conn = match net.listen_packet(network, &address).await {
            Ok(conn) => conn,
            Err(err) => {
                log::debug!("failed to bind relay conn on {}: {}", address, err);
                return Err(Error::Bind(err));
            }
        };

        let mut relay_addr = match conn.local_addr().await {
            Ok(addr) => addr,
            Err(err) => {
                let _ = conn.close().await;
                return Err(err.into());
            }
        };
        relay_addr.set_ip(self.relay_address);

        log::debug!("relay conn bound on {} advertised as {}", address, relay_addr);
        Ok((conn, relay_addr))
    }

    async fn allocate_conn(
        &self,
        network: &str,
        _requested_port: u16,
    ) -> Result<(Arc<dyn Listener + Send + Sync>, SocketAddr)> {
        log::trace!("refusing {} relay allocation", network);
        Err(Error::ErrNotImplemented)
    }
}
