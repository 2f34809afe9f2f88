//! Uplink UDP para o hub.

use devkit_core::config::TransportConfig;
use devkit_core::transport::TransportPort;
use std::io;
use std::net::{SocketAddr, UdpSocket};
use tracing::{info, warn};

/// Transporte que envia cada payload como um datagrama.
pub struct UdpTransport {
    sock: UdpSocket,
    dest: SocketAddr,
}

impl UdpTransport {
    pub fn new(cfg: &TransportConfig) -> io::Result<Self> {
        let dest: SocketAddr = cfg
            .hub_addr
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let sock = UdpSocket::bind(if cfg.bind_ip.is_empty() {
            "0.0.0.0:0".to_string()
        } else {
            format!("{}:0", cfg.bind_ip)
        })?;

        info!("Uplink UDP → {dest}");
        Ok(Self { sock, dest })
    }
}

impl TransportPort for UdpTransport {
    fn send(&self, payload: &[u8]) -> bool {
        match self.sock.send_to(payload, self.dest) {
            Ok(sent) if sent == payload.len() => true,
            Ok(sent) => {
                warn!("Envio parcial para {}: {sent}/{} bytes", self.dest, payload.len());
                false
            }
            Err(e) => {
                warn!("Erro ao enviar UDP: {e}");
                false
            }
        }
    }
}
