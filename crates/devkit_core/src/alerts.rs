//! Alerta de temperatura.

use crate::types::ReadingSnapshot;

/// Um alerta disparado.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alert {
    pub value: f32,
    pub threshold: f32,
}

/// Avalia a temperatura do snapshot contra o threshold.
///
/// Desigualdade estrita: exatamente no threshold não dispara.
pub fn check_temperature(snapshot: &ReadingSnapshot, threshold: f32) -> Option<Alert> {
    // Sensor não disponível nunca gera alerta
    let value = snapshot.temperature?;
    (value > threshold).then_some(Alert { value, threshold })
}
