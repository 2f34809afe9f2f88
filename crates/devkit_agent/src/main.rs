//! # DevKit Agent
//!
//! Lê os sensores da placa, envia telemetria JSON para o hub via UDP e
//! aplica atualizações do device twin recebidas pelo downlink.
//!
//! ## Uso
//! ```bash
//! devkit_agent                      # config.toml ao lado do executável
//! RUST_LOG=debug devkit_agent       # log detalhado
//! ```

mod board;
mod downlink;
mod uplink;

use board::SimulatedBoard;
use devkit_core::Agent;
use devkit_core::config::AgentConfig;
use std::sync::atomic::AtomicBool;
use tracing::{error, info, warn};
use uplink::UdpTransport;

fn main() {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Carregar config ──
    let config_path = AgentConfig::default_path();
    let mut config = AgentConfig::load(&config_path);

    // Salva config padrão se não existir
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            warn!("Config: {e}");
        }
        warn!("Configuração inválida, usando padrão");
        config = AgentConfig::default();
    }

    // ── Uplink ──
    let transport = match UdpTransport::new(&config.transport) {
        Ok(transport) => transport,
        Err(e) => {
            error!("Falha ao criar socket UDP: {e}");
            return;
        }
    };

    // ── Agente ──
    let mut agent = match Agent::new(&config, SimulatedBoard::new(), transport) {
        Ok(agent) => agent,
        Err(e) => {
            error!("Falha ao montar evento de shake: {e}");
            return;
        }
    };

    if config.downlink.enabled {
        downlink::spawn_downlink_thread(config.downlink.port, agent.handle());
    } else {
        info!("Downlink desativado: twin e acks não serão recebidos");
    }

    // ── Banner ──
    println!();
    println!("══════════════════════════════════════════════");
    println!("   ⚡ DEVKIT AGENT – ATIVO");
    println!("══════════════════════════════════════════════");
    println!("  Device:    {}", config.device.device_id);
    println!("  Hub:       {}", config.transport.hub_addr);
    println!("  Intervalo: {} ms", config.telemetry.interval_ms);
    println!("  Alerta:    > {:.1}°C", config.telemetry.temperature_alert);
    println!("══════════════════════════════════════════════");
    println!();

    // ── Loop principal ──
    let stop = AtomicBool::new(false);
    agent.run(&stop);
}
