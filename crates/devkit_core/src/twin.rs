//! Atualizações do device twin.
//!
//! O serviço de gerenciamento empurra mudanças de configuração de forma
//! assíncrona, em dois formatos:
//!
//! ```text
//! { "desired": { "interval": 1000, ... }, ... }   // documento completo
//! { "interval": 1000, ... }                       // delta
//! ```
//!
//! Só o intervalo é aplicado. Payload corrompido é descartado com log;
//! valor fora da faixa é ignorado em silêncio.

use crate::config::DeviceConfig;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Formato da atualização recebida.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwinUpdateState {
    /// Documento completo, intervalo em `desired.interval`
    Complete,
    /// Delta, intervalo no topo
    Partial,
}

/// Erros de parse do twin.
#[derive(Debug, thiserror::Error)]
pub enum TwinError {
    #[error("JSON inválido: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Raiz do twin não é um objeto")]
    NotAnObject,
}

/// Extrai o intervalo proposto.
///
/// Objeto ou campo ausente (ou não numérico) resulta em candidato `0`,
/// que o piso rejeita depois.
pub fn parse_twin_candidate(payload: &str, state: TwinUpdateState) -> Result<f64, TwinError> {
    let root: Value = serde_json::from_str(payload)?;
    let Value::Object(root) = root else {
        return Err(TwinError::NotAnObject);
    };

    let interval = match state {
        TwinUpdateState::Complete => root
            .get("desired")
            .and_then(Value::as_object)
            .and_then(|desired| desired.get("interval")),
        TwinUpdateState::Partial => root.get("interval"),
    };

    Ok(interval.and_then(Value::as_f64).unwrap_or(0.0))
}

/// Aplica uma atualização do twin no intervalo ao vivo.
///
/// Retorna o novo intervalo se aceito. Pode ser chamado de qualquer thread.
pub fn apply_twin_update(
    config: &DeviceConfig,
    payload: &str,
    state: TwinUpdateState,
) -> Option<u32> {
    let candidate = match parse_twin_candidate(payload, state) {
        Ok(candidate) => candidate,
        Err(e) => {
            warn!("Falha ao parsear twin ({e}): {payload}");
            return None;
        }
    };

    match config.propose_interval(candidate) {
        Some(interval) => {
            info!(">>> Device twin atualizado: intervalo = {interval} ms");
            Some(interval)
        }
        None => {
            debug!("Intervalo do twin ignorado: {candidate}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn complete_document_updates_interval() {
        let cfg = DeviceConfig::new(2000);
        let payload = r#"{"desired":{"interval":1000}}"#;
        let applied = apply_twin_update(&cfg, payload, TwinUpdateState::Complete);
        assert_eq!(applied, Some(1000));
        assert_eq!(cfg.interval_ms(), 1000);
    }

    #[test]
    fn complete_document_below_floor_is_ignored() {
        let cfg = DeviceConfig::new(2000);
        let payload = r#"{"desired":{"interval":100}}"#;
        let applied = apply_twin_update(&cfg, payload, TwinUpdateState::Complete);
        assert_eq!(applied, None);
        assert_eq!(cfg.interval_ms(), 2000);
    }

    #[test]
    fn partial_update_reads_top_level() {
        let cfg = DeviceConfig::new(1000);
        let payload = r#"{"interval":2000,"$version":4}"#;
        let applied = apply_twin_update(&cfg, payload, TwinUpdateState::Partial);
        assert_eq!(applied, Some(2000));
        assert_eq!(cfg.interval_ms(), 2000);
    }

    #[test]
    fn state_selects_where_interval_is_read() {
        let cfg = DeviceConfig::new(1000);
        // Delta lido como documento completo: sem "desired", candidato 0
        assert_eq!(
            apply_twin_update(&cfg, r#"{"interval":3000}"#, TwinUpdateState::Complete),
            None
        );
        // Documento completo lido como delta: sem "interval" no topo
        assert_eq!(
            apply_twin_update(&cfg, r#"{"desired":{"interval":3000}}"#, TwinUpdateState::Partial),
            None
        );
        assert_eq!(cfg.interval_ms(), 1000);
    }

    #[test]
    fn non_object_payloads_leave_config_unchanged() {
        let cfg = DeviceConfig::new(1000);
        for payload in ["[1,2,3]", "42", "\"interval\"", "null", "{\"desired\":", ""] {
            assert_eq!(apply_twin_update(&cfg, payload, TwinUpdateState::Partial), None);
            assert_eq!(apply_twin_update(&cfg, payload, TwinUpdateState::Complete), None);
        }
        assert_eq!(cfg.interval_ms(), 1000);
    }

    #[test]
    fn parse_reports_reason() {
        assert!(matches!(
            parse_twin_candidate("[]", TwinUpdateState::Partial),
            Err(TwinError::NotAnObject)
        ));
        assert!(matches!(
            parse_twin_candidate("{", TwinUpdateState::Partial),
            Err(TwinError::Malformed(_))
        ));
    }

    #[test]
    fn absent_and_zero_are_both_candidate_zero() {
        let complete = |payload| parse_twin_candidate(payload, TwinUpdateState::Complete).unwrap();
        assert_eq!(complete(r#"{"desired":{}}"#), 0.0);
        assert_eq!(complete(r#"{"desired":{"interval":0}}"#), 0.0);
        assert_eq!(complete(r#"{"desired":5}"#), 0.0);
        let partial = parse_twin_candidate(r#"{"interval":"900"}"#, TwinUpdateState::Partial);
        assert_eq!(partial.unwrap(), 0.0);
    }

    #[test]
    fn concurrent_updates_never_tear() {
        let cfg = Arc::new(DeviceConfig::new(1000));
        let handles: Vec<_> = [600u32, 700, 800, 900]
            .into_iter()
            .map(|v| {
                let cfg = Arc::clone(&cfg);
                std::thread::spawn(move || {
                    let payload = format!(r#"{{"interval":{v}}}"#);
                    apply_twin_update(&cfg, &payload, TwinUpdateState::Partial)
                })
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap().is_some());
        }
        assert!([600, 700, 800, 900].contains(&cfg.interval_ms()));
    }
}
