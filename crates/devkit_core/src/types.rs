//! Tipos de dados trocados entre sensores, encoder e hub.

use serde::{Deserialize, Serialize};

// ──────────────────────────────────────────────
// Snapshot
// ──────────────────────────────────────────────

/// Uma leitura de todos os sensores ambientais num ciclo.
///
/// `None` significa sensor falhou ou valor fisicamente impossível.
/// Nunca carrega NaN: o marcador de ausência é o `Option`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReadingSnapshot {
    /// Temperatura (°C)
    pub temperature: Option<f32>,
    /// Umidade relativa (%RH)
    pub humidity: Option<f32>,
    /// Pressão atmosférica (hPa)
    pub pressure: Option<f32>,
}

// ──────────────────────────────────────────────
// Mensagem de telemetria
// ──────────────────────────────────────────────

/// Mensagem de telemetria enviada ao hub.
///
/// Esquema fixo: todos os campos sempre presentes, leituras ausentes
/// viram `null` em vez de serem omitidas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryMessage {
    pub device_id: String,
    pub message_id: u64,
    pub temperature: Option<f32>,
    pub humidity: Option<f32>,
    pub pressure: Option<f32>,
}

impl TelemetryMessage {
    /// Monta a mensagem a partir de um snapshot.
    pub fn from_snapshot(snapshot: &ReadingSnapshot, device_id: &str, message_id: u64) -> Self {
        Self {
            device_id: device_id.to_owned(),
            message_id,
            temperature: snapshot.temperature,
            humidity: snapshot.humidity,
            pressure: snapshot.pressure,
        }
    }
}

// ──────────────────────────────────────────────
// Evento de shake
// ──────────────────────────────────────────────

/// Marcador enviado ao hub quando um shake é reconhecido.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureEvent {
    pub topic: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_is_empty() {
        let s = ReadingSnapshot::default();
        assert!(s.temperature.is_none());
        assert!(s.humidity.is_none());
        assert!(s.pressure.is_none());
    }

    #[test]
    fn message_copies_snapshot_fields() {
        let snapshot = ReadingSnapshot {
            temperature: Some(24.5),
            humidity: None,
            pressure: Some(1013.25),
        };
        let msg = TelemetryMessage::from_snapshot(&snapshot, "AZ3166", 7);
        assert_eq!(msg.device_id, "AZ3166");
        assert_eq!(msg.message_id, 7);
        assert_eq!(msg.temperature, Some(24.5));
        assert_eq!(msg.humidity, None);
        assert_eq!(msg.pressure, Some(1013.25));
    }
}
