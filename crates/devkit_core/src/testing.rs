//! Fakes de hardware e transporte para os testes.

use crate::sensors::{SensorError, SensorSource};
use crate::transport::TransportPort;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Sensores com valores fixos e contador de passos roteirizado.
#[derive(Debug, Default)]
pub struct ScriptedSensors {
    pub temperature: f32,
    pub humidity: f32,
    pub pressure: f32,
    pub fail_temperature: bool,
    pub fail_pressure: bool,
    pub fail_reset: bool,
    pub resets: usize,
    pub steps: VecDeque<Option<u32>>,
}

impl ScriptedSensors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_readings(mut self, temperature: f32, humidity: f32, pressure: f32) -> Self {
        self.temperature = temperature;
        self.humidity = humidity;
        self.pressure = pressure;
        self
    }

    /// `None` na sequência simula falha do pedômetro.
    pub fn with_steps(mut self, steps: &[Option<u32>]) -> Self {
        self.steps = steps.iter().copied().collect();
        self
    }

    pub fn failing_temperature(mut self) -> Self {
        self.fail_temperature = true;
        self
    }

    pub fn failing_pressure(mut self) -> Self {
        self.fail_pressure = true;
        self
    }

    pub fn failing_reset(mut self) -> Self {
        self.fail_reset = true;
        self
    }
}

impl SensorSource for ScriptedSensors {
    fn reset(&mut self) -> Result<(), SensorError> {
        self.resets += 1;
        if self.fail_reset {
            return Err(SensorError::Bus("NACK".into()));
        }
        Ok(())
    }

    fn temperature(&mut self) -> Result<f32, SensorError> {
        if self.fail_temperature {
            return Err(SensorError::NotInitialized);
        }
        Ok(self.temperature)
    }

    fn humidity(&mut self) -> Result<f32, SensorError> {
        Ok(self.humidity)
    }

    fn pressure(&mut self) -> Result<f32, SensorError> {
        if self.fail_pressure {
            return Err(SensorError::Bus("timeout".into()));
        }
        Ok(self.pressure)
    }

    fn step_count(&mut self) -> Result<u32, SensorError> {
        match self.steps.pop_front() {
            Some(Some(steps)) => Ok(steps),
            _ => Err(SensorError::Unavailable("pedometer")),
        }
    }
}

/// Transporte que grava tudo que foi enviado.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<Vec<u8>>>,
    pub fail: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let t = Self::default();
        t.fail.store(true, Ordering::SeqCst);
        t
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn sent_json(&self) -> Vec<serde_json::Value> {
        self.sent()
            .iter()
            .map(|p| serde_json::from_slice(p).unwrap())
            .collect()
    }
}

impl TransportPort for RecordingTransport {
    fn send(&self, payload: &[u8]) -> bool {
        if self.fail.load(Ordering::SeqCst) {
            return false;
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(payload.to_vec());
        }
        true
    }
}
