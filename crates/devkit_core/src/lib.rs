//! # DevKit Core
//!
//! Lógica do agente de telemetria da placa, sem dependência de hardware:
//! sensores e transporte entram como traits injetadas.
//!
//! ## Módulos
//! - [`types`] – Snapshot de leituras e mensagens do hub
//! - [`sensors`] – Trait do driver e leitura tolerante a falhas
//! - [`protocol`] – Encode/decode JSON da telemetria e do evento de shake
//! - [`alerts`] – Threshold de temperatura
//! - [`config`] – Intervalo ao vivo + configuração TOML
//! - [`twin`] – Atualizações do device twin
//! - [`gesture`] – Máquina de estados do shake
//! - [`transport`] – Porta de envio para o hub
//! - [`agent`] – Loop principal

pub mod agent;
pub mod alerts;
pub mod config;
pub mod gesture;
pub mod protocol;
pub mod sensors;
pub mod transport;
pub mod twin;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports convenientes
pub use agent::{AckSignal, Agent, AgentHandle, TickReport};
pub use config::{AgentConfig, DeviceConfig, MIN_INTERVAL_MS};
pub use gesture::{GestureDetector, GestureOutcome, GesturePhase};
pub use protocol::{MAX_MESSAGE_LEN, decode_telemetry, encode_telemetry};
pub use sensors::{SensorReadings, SensorSource};
pub use transport::TransportPort;
pub use twin::{TwinUpdateState, apply_twin_update};
pub use types::ReadingSnapshot;
