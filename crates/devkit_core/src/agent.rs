//! Loop principal do agente.
//!
//! Dois caminhos independentes dividem o mesmo transporte:
//! - telemetria periódica, no intervalo ao vivo do [`DeviceConfig`]
//! - polling contínuo do pedômetro para o shake
//!
//! Falha de um caminho não afeta o outro.

use crate::config::{AgentConfig, DeviceConfig};
use crate::gesture::{GestureDetector, GestureOutcome};
use crate::protocol::{ProtocolError, encode_gesture_event, encode_telemetry, ensure_fits};
use crate::sensors::{SensorReadings, SensorSource};
use crate::transport::TransportPort;
use crate::twin::{TwinUpdateState, apply_twin_update};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Flag setada pelo callback de ack, consumida pelo loop.
pub type AckSignal = Arc<AtomicBool>;

/// Acesso ao agente para callbacks assíncronos (twin, ack).
#[derive(Debug, Clone)]
pub struct AgentHandle {
    config: Arc<DeviceConfig>,
    ack: AckSignal,
}

impl AgentHandle {
    /// Aplica uma atualização do twin. Seguro a partir de qualquer thread.
    pub fn apply_twin(&self, payload: &str, state: TwinUpdateState) -> Option<u32> {
        apply_twin_update(&self.config, payload, state)
    }

    /// Sinaliza que o hub confirmou o último shake.
    pub fn signal_ack(&self) {
        self.ack.store(true, Ordering::Release);
    }

    /// Ack sinalizado e ainda não consumido pelo loop.
    pub fn ack_pending(&self) -> bool {
        self.ack.load(Ordering::Acquire)
    }

    pub fn interval_ms(&self) -> u32 {
        self.config.interval_ms()
    }
}

/// Resultado de um ciclo de telemetria.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub message_id: u64,
    pub alert: bool,
    pub sent: bool,
}

/// Agente de telemetria + configuração remota.
pub struct Agent<S, T> {
    device_id: String,
    temperature_alert: f32,
    readings: SensorReadings<S>,
    transport: T,
    config: Arc<DeviceConfig>,
    gesture: GestureDetector,
    gesture_poll: Duration,
    ack: AckSignal,
    next_message_id: u64,
}

impl<S: SensorSource, T: TransportPort> Agent<S, T> {
    pub fn new(settings: &AgentConfig, source: S, transport: T) -> Result<Self, ProtocolError> {
        let event = encode_gesture_event(&settings.gesture.topic)?;

        Ok(Self {
            device_id: settings.device.device_id.clone(),
            temperature_alert: settings.telemetry.temperature_alert,
            readings: SensorReadings::new(source, settings.telemetry.pressure_policy()),
            transport,
            config: Arc::new(DeviceConfig::new(settings.telemetry.interval_ms)),
            gesture: GestureDetector::new(
                event,
                settings.gesture.step_threshold,
                settings.gesture.ack_timeout(),
            ),
            gesture_poll: settings.gesture.poll_interval(),
            ack: Arc::new(AtomicBool::new(false)),
            next_message_id: 1,
        })
    }

    pub fn handle(&self) -> AgentHandle {
        AgentHandle {
            config: Arc::clone(&self.config),
            ack: Arc::clone(&self.ack),
        }
    }

    pub fn device_config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn gesture(&self) -> &GestureDetector {
        &self.gesture
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Lê, codifica e envia uma mensagem de telemetria.
    ///
    /// O `messageId` avança mesmo se o envio falhar: nunca é reutilizado.
    pub fn telemetry_tick(&mut self) -> TickReport {
        let snapshot = self.readings.read();
        let message_id = self.next_message_id;
        // u64 não esgota na vida útil da placa, nunca dá a volta
        self.next_message_id += 1;

        info!(
            "Telemetria: temperatura={}, umidade={}, pressão={}",
            fmt_reading(snapshot.temperature),
            fmt_reading(snapshot.humidity),
            fmt_reading(snapshot.pressure)
        );

        let encoded = match encode_telemetry(
            &snapshot,
            &self.device_id,
            message_id,
            self.temperature_alert,
        ) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!("Erro ao codificar telemetria #{message_id}: {e}");
                return TickReport {
                    message_id,
                    alert: false,
                    sent: false,
                };
            }
        };

        if encoded.alert {
            warn!(
                "Alerta de temperatura: {} > {}",
                fmt_reading(snapshot.temperature),
                self.temperature_alert
            );
        }

        let sent = match ensure_fits(&encoded.payload) {
            Ok(()) => self.transport.send(&encoded.payload),
            Err(e) => {
                error!("Telemetria #{message_id} descartada: {e}");
                false
            }
        };

        if sent {
            debug!("→ {} bytes (#{message_id})", encoded.payload.len());
        } else {
            warn!("Telemetria #{message_id} não enviada, tentando no próximo tick");
        }

        TickReport {
            message_id,
            alert: encoded.alert,
            sent,
        }
    }

    /// Consome um ack pendente e processa uma leitura do pedômetro.
    ///
    /// Retorna `None` se o pedômetro não pôde ser lido.
    pub fn gesture_poll(&mut self, now: Instant) -> Option<GestureOutcome> {
        if self.ack.swap(false, Ordering::AcqRel) {
            self.gesture.acknowledge(now);
        }

        match self.readings.steps() {
            Ok(steps) => Some(self.gesture.poll(steps, now, &self.transport)),
            Err(e) => {
                debug!("Falha ao ler pedômetro: {e}");
                self.gesture.expire(now);
                None
            }
        }
    }

    /// Roda até `stop` ser setada.
    ///
    /// O intervalo é relido a cada volta, então uma mudança do twin vale
    /// já para o próximo tick.
    pub fn run(&mut self, stop: &AtomicBool) {
        info!(
            "Agente ativo: device={} intervalo={} ms",
            self.device_id,
            self.config.interval_ms()
        );

        let mut last_tick: Option<Instant> = None;

        while !stop.load(Ordering::Acquire) {
            let now = Instant::now();
            let interval = self.config.interval();

            if last_tick.is_none_or(|t| now.duration_since(t) >= interval) {
                self.telemetry_tick();
                last_tick = Some(now);
            }

            self.gesture_poll(Instant::now());

            let next_tick = last_tick.map_or(now, |t| t + interval);
            let until_tick = next_tick.saturating_duration_since(Instant::now());
            std::thread::sleep(until_tick.min(self.gesture_poll));
        }

        info!("Agente parado");
    }
}

fn fmt_reading(value: Option<f32>) -> String {
    value.map_or_else(|| "null".to_string(), |v| format!("{v:.2}"))
}
