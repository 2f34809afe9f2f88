//! Configuração do agente.
//!
//! - [`DeviceConfig`]: intervalo de telemetria ao vivo, alterado pelo
//!   device twin e lido pelo loop a cada tick.
//! - [`AgentConfig`]: arquivo `config.toml` com os valores de boot.

use crate::sensors::PressurePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::{info, warn};

/// Piso do intervalo: só valores estritamente maiores são aceitos (ms).
pub const MIN_INTERVAL_MS: u32 = 500;

// ──────────────────────────────────────────────
// Estado ao vivo
// ──────────────────────────────────────────────

/// Intervalo de telemetria compartilhado entre o loop e o handler do twin.
///
/// Uma única palavra atômica: não existe invariante entre campos, então
/// load/store bastam.
#[derive(Debug)]
pub struct DeviceConfig {
    interval_ms: AtomicU32,
}

impl DeviceConfig {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: AtomicU32::new(interval_ms),
        }
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms.load(Ordering::Acquire)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.interval_ms()))
    }

    /// Propõe um novo intervalo. Aceita apenas `candidate > MIN_INTERVAL_MS`;
    /// caso contrário o valor anterior fica intacto.
    pub fn propose_interval(&self, candidate: f64) -> Option<u32> {
        if candidate > f64::from(MIN_INTERVAL_MS) {
            // Cast satura em u32::MAX e descarta a parte fracionária
            let interval = candidate as u32;
            self.interval_ms.store(interval, Ordering::Release);
            Some(interval)
        } else {
            None
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::new(TelemetryConfig::default().interval_ms)
    }
}

// ──────────────────────────────────────────────
// Arquivo TOML
// ──────────────────────────────────────────────

/// Identidade da placa.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSection {
    /// ID registrado no hub
    pub device_id: String,
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            device_id: "AZ3166".into(),
        }
    }
}

/// Telemetria periódica.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Intervalo inicial de envio (ms), até o twin mandar outro
    pub interval_ms: u32,
    /// Temperatura que dispara alerta (°C, estritamente maior)
    pub temperature_alert: f32,
    /// Pressão pode ser `null` (true) ou é sempre numérica (false)
    pub pressure_nullable: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            temperature_alert: 30.0,
            pressure_nullable: false,
        }
    }
}

impl TelemetryConfig {
    pub fn pressure_policy(&self) -> PressurePolicy {
        PressurePolicy::from_nullable(self.pressure_nullable)
    }
}

/// Detecção de shake.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Tópico enviado no evento de shake
    pub topic: String,
    /// Passos desde o último shake necessários (estritamente maior)
    pub step_threshold: u32,
    /// Janela de espera pelo ack do hub (ms)
    pub ack_timeout_ms: u64,
    /// Intervalo de polling do pedômetro (ms)
    pub poll_interval_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            topic: "iot".into(),
            step_threshold: 2,
            ack_timeout_ms: 30_000,
            poll_interval_ms: 100,
        }
    }
}

impl GestureConfig {
    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Uplink para o hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Endereço `ip:porta` do hub
    pub hub_addr: String,
    /// IP local para bind (vazio = auto)
    pub bind_ip: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            hub_addr: "127.0.0.1:5005".into(),
            bind_ip: String::new(),
        }
    }
}

/// Downlink (twin e acks vindos do hub).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownlinkConfig {
    pub enabled: bool,
    /// Porta UDP para escutar
    pub port: u16,
}

impl Default for DownlinkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 5006,
        }
    }
}

/// Configuração raiz do agente.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub device: DeviceSection,
    pub telemetry: TelemetryConfig,
    pub gesture: GestureConfig,
    pub transport: TransportConfig,
    pub downlink: DownlinkConfig,
}

/// Erros de persistência da configuração.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Erro de I/O em {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Erro ao parsear TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Erro ao serializar TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl AgentConfig {
    /// Carrega configuração de um arquivo TOML, com fallback para o padrão.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match Self::read(path) {
                Ok(config) => {
                    info!("Configuração carregada de {}", path.display());
                    return config;
                }
                Err(e) => warn!("{e}"),
            }
        }

        info!("Usando configuração padrão");
        AgentConfig::default()
    }

    /// Lê e parseia o arquivo sem fallback.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.device.device_id.trim().is_empty() {
            errors.push("device_id não pode ser vazio".into());
        }
        if self.telemetry.interval_ms <= MIN_INTERVAL_MS {
            errors.push(format!(
                "Intervalo de telemetria inválido: {} (deve ser > {MIN_INTERVAL_MS} ms)",
                self.telemetry.interval_ms
            ));
        }
        if !self.telemetry.temperature_alert.is_finite() {
            errors.push("temperature_alert deve ser um número finito".into());
        }
        if self.gesture.poll_interval_ms == 0 {
            errors.push("Intervalo de polling do pedômetro não pode ser 0".into());
        }
        if self.transport.hub_addr.parse::<std::net::SocketAddr>().is_err() {
            errors.push(format!("Endereço do hub inválido: {}", self.transport.hub_addr));
        }
        if self.downlink.enabled && self.downlink.port == 0 {
            errors.push("Porta do downlink não pode ser 0".into());
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn default_config_is_valid() {
        let config = AgentConfig::default();
        let errors = config.validate();
        assert!(errors.is_empty(), "Erros: {:?}", errors);
    }

    #[test]
    fn roundtrip_toml() {
        let config = AgentConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AgentConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.device.device_id, parsed.device.device_id);
        assert_eq!(config.telemetry.interval_ms, parsed.telemetry.interval_ms);
        assert_eq!(config.gesture.topic, parsed.gesture.topic);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let partial = r#"
[telemetry]
interval_ms = 5000
pressure_nullable = true
"#;
        let config: AgentConfig = toml::from_str(partial).unwrap();
        assert_eq!(config.telemetry.interval_ms, 5000);
        assert_eq!(config.telemetry.pressure_policy(), PressurePolicy::Nullable);
        // Outros campos devem ter valor padrão
        assert_eq!(config.telemetry.temperature_alert, 30.0);
        assert_eq!(config.gesture.step_threshold, 2);
        assert_eq!(config.downlink.port, 5006);
    }

    #[test]
    fn validate_rejects_floor_interval() {
        let mut config = AgentConfig::default();
        config.telemetry.interval_ms = MIN_INTERVAL_MS;
        config.transport.hub_addr = "hub".into();
        let errors = config.validate();
        assert_eq!(errors.len(), 2, "Erros: {:?}", errors);
    }

    #[test]
    fn load_missing_file_falls_back_to_default() {
        let config = AgentConfig::load(Path::new("/nonexistent/devkit/config.toml"));
        assert_eq!(config.device.device_id, "AZ3166");
    }

    #[test]
    fn save_then_read() {
        let path = std::env::temp_dir().join(format!("devkit-config-{}.toml", std::process::id()));
        let mut config = AgentConfig::default();
        config.device.device_id = "bench-01".into();
        config.save(&path).unwrap();
        let read = AgentConfig::read(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(read.device.device_id, "bench-01");
    }

    #[test]
    fn interval_accepts_only_above_floor() {
        let cfg = DeviceConfig::new(2000);
        assert_eq!(cfg.propose_interval(500.0), None);
        assert_eq!(cfg.propose_interval(0.0), None);
        assert_eq!(cfg.propose_interval(f64::NAN), None);
        assert_eq!(cfg.interval_ms(), 2000);

        assert_eq!(cfg.propose_interval(501.0), Some(501));
        assert_eq!(cfg.interval_ms(), 501);
        assert_eq!(cfg.propose_interval(1500.9), Some(1500));
        assert_eq!(cfg.interval(), Duration::from_millis(1500));
    }

    #[test]
    fn interval_updates_visible_across_threads() {
        let cfg = Arc::new(DeviceConfig::new(1000));
        let writer = Arc::clone(&cfg);
        std::thread::spawn(move || {
            writer.propose_interval(4000.0);
        })
        .join()
        .unwrap();
        assert_eq!(cfg.interval_ms(), 4000);
    }
}
