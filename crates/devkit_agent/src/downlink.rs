//! Thread de downlink: escuta UDP e entrega twin updates e acks ao agente.
//!
//! Cada datagrama é um envelope JSON:
//!
//! ```text
//! {"type":"twin","complete":true,"payload":"{\"desired\":{\"interval\":1000}}"}
//! {"type":"ack"}
//! ```

use devkit_core::agent::AgentHandle;
use devkit_core::twin::TwinUpdateState;
use serde::Deserialize;
use std::net::UdpSocket;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Mensagem vinda do hub.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DownlinkMessage {
    /// Atualização do device twin; `payload` é o JSON cru do serviço
    Twin { complete: bool, payload: String },
    /// Confirmação do último shake
    Ack,
}

/// Inicia a thread de downlink.
pub fn spawn_downlink_thread(port: u16, handle: AgentHandle) {
    let spawned = std::thread::Builder::new()
        .name("downlink".into())
        .spawn(move || downlink_loop(port, &handle));

    if let Err(e) = spawned {
        error!("Falha ao criar thread de downlink: {e}");
    }
}

fn downlink_loop(port: u16, handle: &AgentHandle) {
    loop {
        match UdpSocket::bind(format!("0.0.0.0:{port}")) {
            Ok(sock) => {
                info!("Downlink escutando em 0.0.0.0:{port}");

                let mut buf = [0u8; 4096];
                loop {
                    match sock.recv_from(&mut buf) {
                        Ok((size, addr)) => {
                            debug!("Downlink: {size} bytes de {addr}");
                            handle_datagram(&buf[..size], handle);
                        }
                        Err(e) => {
                            warn!("Erro ao receber UDP: {e}");
                        }
                    }
                }
            }
            Err(e) => {
                error!("Falha ao bind porta {port}: {e}. Tentando novamente em 2s...");
                std::thread::sleep(Duration::from_secs(2));
            }
        }
    }
}

/// Decodifica e despacha um datagrama. Envelope inválido é descartado.
pub fn handle_datagram(data: &[u8], handle: &AgentHandle) -> Option<DownlinkMessage> {
    let msg: DownlinkMessage = match serde_json::from_slice(data) {
        Ok(msg) => msg,
        Err(e) => {
            debug!("Envelope inválido no downlink: {e}");
            return None;
        }
    };

    match &msg {
        DownlinkMessage::Twin { complete, payload } => {
            let state = if *complete {
                TwinUpdateState::Complete
            } else {
                TwinUpdateState::Partial
            };
            handle.apply_twin(payload, state);
        }
        DownlinkMessage::Ack => handle.signal_ack(),
    }

    Some(msg)
}
