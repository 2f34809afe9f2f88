//! Protocolo JSON do hub.
//!
//! Telemetria sai como objeto JSON plano, pretty-printed:
//!
//! ```text
//! {
//!   "deviceId": "AZ3166",
//!   "messageId": 12,
//!   "temperature": 24.5,
//!   "humidity": null,
//!   "pressure": 1013.2
//! }
//! ```
//!
//! - Todos os campos sempre presentes; leitura ausente é `null`
//! - NaN nunca aparece como número (não é JSON válido)
//! - Evento de shake é compacto: `{"topic":"iot"}`

use crate::alerts::check_temperature;
use crate::types::{GestureEvent, ReadingSnapshot, TelemetryMessage};

/// Tamanho do buffer de mensagem do hub (bytes).
pub const MAX_MESSAGE_LEN: usize = 256;

/// Erros do protocolo.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Payload muito grande ({0} bytes, máximo {MAX_MESSAGE_LEN})")]
    TooLarge(usize),

    #[error("Erro de serialização: {0}")]
    Serialize(String),

    #[error("Erro de deserialização: {0}")]
    Deserialize(String),
}

/// Telemetria pronta para envio.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedTelemetry {
    pub payload: Vec<u8>,
    /// Temperatura acima do threshold
    pub alert: bool,
}

/// Codifica um snapshot em JSON e avalia o alerta de temperatura.
pub fn encode_telemetry(
    snapshot: &ReadingSnapshot,
    device_id: &str,
    message_id: u64,
    temperature_alert: f32,
) -> Result<EncodedTelemetry, ProtocolError> {
    let message = TelemetryMessage::from_snapshot(snapshot, device_id, message_id);
    let payload =
        serde_json::to_vec_pretty(&message).map_err(|e| ProtocolError::Serialize(e.to_string()))?;

    Ok(EncodedTelemetry {
        payload,
        alert: check_temperature(snapshot, temperature_alert).is_some(),
    })
}

/// Decodifica uma mensagem de telemetria (lado do hub / debug).
pub fn decode_telemetry(data: &[u8]) -> Result<TelemetryMessage, ProtocolError> {
    serde_json::from_slice(data).map_err(|e| ProtocolError::Deserialize(e.to_string()))
}

/// Codifica o marcador de shake.
pub fn encode_gesture_event(topic: &str) -> Result<Vec<u8>, ProtocolError> {
    let event = GestureEvent {
        topic: topic.to_owned(),
    };
    serde_json::to_vec(&event).map_err(|e| ProtocolError::Serialize(e.to_string()))
}

/// Recusa payloads que não cabem no buffer do hub.
///
/// Truncar geraria JSON inválido, então o payload é descartado inteiro.
pub fn ensure_fits(payload: &[u8]) -> Result<(), ProtocolError> {
    if payload.len() > MAX_MESSAGE_LEN {
        return Err(ProtocolError::TooLarge(payload.len()));
    }
    Ok(())
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
