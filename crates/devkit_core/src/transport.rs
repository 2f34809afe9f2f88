//! Porta de envio para o hub.
//!
//! A pilha real (Wi-Fi + MQTT) pertence à aplicação. O núcleo só precisa
//! de uma tentativa de envio, sem retry nem backoff.

/// Envio best-effort de um payload para o hub.
///
/// Retorna `false` se o envio falhou. Quem chama decide o que a falha
/// significa (o shake volta para `Idle`, a telemetria espera o próximo tick).
pub trait TransportPort: Send + Sync {
    fn send(&self, payload: &[u8]) -> bool;
}

impl<T: TransportPort + ?Sized> TransportPort for std::sync::Arc<T> {
    fn send(&self, payload: &[u8]) -> bool {
        (**self).send(payload)
    }
}
