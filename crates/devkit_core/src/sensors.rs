//! Leitura dos sensores ambientais com fallback por grandeza.
//!
//! O driver real (HTS221, LPS22HB, LSM6DSL) fica atrás da trait
//! [`SensorSource`]. [`SensorReadings`] converte falhas e valores
//! impossíveis em `None`, de modo que um sensor com problema nunca
//! bloqueia o envio dos outros.

use crate::types::ReadingSnapshot;
use std::ops::RangeInclusive;
use tracing::debug;

/// Faixa de operação do HTS221 (°C).
pub const TEMPERATURE_RANGE: RangeInclusive<f32> = -40.0..=120.0;
/// Faixa de umidade relativa (%RH).
pub const HUMIDITY_RANGE: RangeInclusive<f32> = 0.0..=100.0;
/// Faixa de operação do LPS22HB (hPa).
pub const PRESSURE_RANGE: RangeInclusive<f32> = 260.0..=1260.0;

/// Erros do driver de sensores.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("Erro no barramento I2C: {0}")]
    Bus(String),

    #[error("Sensor não inicializado")]
    NotInitialized,

    #[error("Leitura indisponível: {0}")]
    Unavailable(&'static str),
}

/// Acesso ao hardware da placa.
pub trait SensorSource: Send {
    /// Pulso de reset/re-arm exigido pelo sensor entre amostras.
    fn reset(&mut self) -> Result<(), SensorError>;
    fn temperature(&mut self) -> Result<f32, SensorError>;
    fn humidity(&mut self) -> Result<f32, SensorError>;
    fn pressure(&mut self) -> Result<f32, SensorError>;
    /// Contador de passos do pedômetro (acumulado desde o boot).
    fn step_count(&mut self) -> Result<u32, SensorError>;
}

/// Como tratar a pressão quando o driver falha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PressurePolicy {
    /// Sempre presente: falha vira `0.0`, qualquer valor finito passa.
    #[default]
    AlwaysPresent,
    /// Mesmas regras da temperatura e umidade.
    Nullable,
}

impl PressurePolicy {
    pub fn from_nullable(nullable: bool) -> Self {
        if nullable {
            Self::Nullable
        } else {
            Self::AlwaysPresent
        }
    }
}

/// Leitor de sensores que nunca propaga falhas.
pub struct SensorReadings<S> {
    source: S,
    pressure_policy: PressurePolicy,
}

impl<S: SensorSource> SensorReadings<S> {
    pub fn new(source: S, pressure_policy: PressurePolicy) -> Self {
        Self {
            source,
            pressure_policy,
        }
    }

    /// Lê temperatura, umidade e pressão num snapshot.
    pub fn read(&mut self) -> ReadingSnapshot {
        self.rearm();
        let temperature = checked("temperature", self.source.temperature(), &TEMPERATURE_RANGE);

        self.rearm();
        let humidity = checked("humidity", self.source.humidity(), &HUMIDITY_RANGE);

        self.rearm();
        let pressure = match self.pressure_policy {
            PressurePolicy::Nullable => {
                checked("pressure", self.source.pressure(), &PRESSURE_RANGE)
            }
            PressurePolicy::AlwaysPresent => Some(match self.source.pressure() {
                Ok(v) if v.is_finite() => v,
                Ok(v) => {
                    debug!("Pressão não finita ({v}), enviando 0");
                    0.0
                }
                Err(e) => {
                    debug!("Falha ao ler pressão: {e}, enviando 0");
                    0.0
                }
            }),
        };

        ReadingSnapshot {
            temperature,
            humidity,
            pressure,
        }
    }

    /// Lê o contador do pedômetro.
    pub fn steps(&mut self) -> Result<u32, SensorError> {
        self.source.step_count()
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    fn rearm(&mut self) {
        if let Err(e) = self.source.reset() {
            debug!("Reset do sensor falhou (ignorado): {e}");
        }
    }
}

fn checked(
    name: &str,
    reading: Result<f32, SensorError>,
    range: &RangeInclusive<f32>,
) -> Option<f32> {
    match reading {
        Ok(v) if range.contains(&v) => Some(v),
        Ok(v) => {
            // NaN também cai aqui: contains() é falso para NaN
            debug!("{name} fora da faixa: {v}");
            None
        }
        Err(e) => {
            debug!("Falha ao ler {name}: {e}");
            None
        }
    }
}
