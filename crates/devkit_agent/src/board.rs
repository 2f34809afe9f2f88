//! Placa simulada – substitui os drivers HTS221/LPS22HB/LSM6DSL.
//!
//! Gera leituras plausíveis a partir do tempo desde o boot, com uma falha
//! de barramento ocasional na temperatura e um "shake" periódico no
//! pedômetro, para exercitar todos os caminhos do agente sem hardware.

use devkit_core::sensors::{SensorError, SensorSource};
use std::time::Instant;
use tracing::debug;

/// Uma leitura de temperatura a cada N falha.
const TEMPERATURE_GLITCH_EVERY: u64 = 25;
/// Passos de caminhada: um a cada N segundos.
const WALK_STEP_SECS: u64 = 2;
/// Um shake (4 passos de uma vez) a cada N segundos.
const SHAKE_EVERY_SECS: u64 = 45;

/// Placa simulada.
pub struct SimulatedBoard {
    boot: Instant,
    temperature_reads: u64,
}

impl SimulatedBoard {
    pub fn new() -> Self {
        debug!("Placa simulada inicializada");
        Self {
            boot: Instant::now(),
            temperature_reads: 0,
        }
    }

    fn uptime_secs(&self) -> f64 {
        self.boot.elapsed().as_secs_f64()
    }
}

impl SensorSource for SimulatedBoard {
    fn reset(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    fn temperature(&mut self) -> Result<f32, SensorError> {
        self.temperature_reads += 1;
        if self.temperature_reads % TEMPERATURE_GLITCH_EVERY == 0 {
            return Err(SensorError::Bus("HTS221 NACK".into()));
        }
        let t = self.uptime_secs();
        Ok((26.0 + 6.0 * (t / 90.0).sin()) as f32)
    }

    fn humidity(&mut self) -> Result<f32, SensorError> {
        let t = self.uptime_secs();
        Ok((45.0 + 10.0 * (t / 120.0).cos()) as f32)
    }

    fn pressure(&mut self) -> Result<f32, SensorError> {
        let t = self.uptime_secs();
        Ok((1012.0 + 1.5 * (t / 300.0).sin()) as f32)
    }

    fn step_count(&mut self) -> Result<u32, SensorError> {
        let secs = self.boot.elapsed().as_secs();
        let steps = secs / WALK_STEP_SECS + 4 * (secs / SHAKE_EVERY_SECS);
        Ok(u32::try_from(steps).unwrap_or(u32::MAX))
    }
}
