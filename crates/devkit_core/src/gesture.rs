//! Detecção de shake pelo pedômetro.
//!
//! Máquina de estados:
//!
//! ```text
//!            delta > threshold            envio ok
//!   Idle ─────────────────────▶ ShakeDetected ─────────▶ AwaitingAck
//!    ▲                               │ envio falhou            │
//!    └───────────────────────────────┘◀────────────────────────┘
//!                                          ack ou timeout
//! ```
//!
//! O shake é um *delta* desde o último shake reconhecido: a baseline é
//! re-basada a cada detecção, então sacudir continuamente não gera uma
//! rajada de eventos.

use crate::transport::TransportPort;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Fase atual do detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    ShakeDetected,
    AwaitingAck,
}

/// Resultado de um poll do pedômetro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Primeira leitura: baseline semeada, sem disparo
    Seeded,
    /// Nada mudou
    Quiet,
    /// Contador voltou (reset do sensor): baseline re-semeada
    CounterReset,
    /// Shake reconhecido e enviado, aguardando ack
    ShakeSent,
    /// Shake reconhecido mas o envio falhou
    SendFailed,
    /// Janela de ack expirou sem resposta
    AckTimedOut,
}

/// Detector de shake com janela de ack.
#[derive(Debug)]
pub struct GestureDetector {
    event: Vec<u8>,
    step_threshold: u32,
    ack_timeout: Duration,
    baseline: Option<u32>,
    phase: GesturePhase,
    phase_since: Option<Instant>,
}

impl GestureDetector {
    /// `event` é o payload enviado a cada shake.
    pub fn new(event: Vec<u8>, step_threshold: u32, ack_timeout: Duration) -> Self {
        Self {
            event,
            step_threshold,
            ack_timeout,
            baseline: None,
            phase: GesturePhase::Idle,
            phase_since: None,
        }
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn baseline(&self) -> Option<u32> {
        self.baseline
    }

    /// Instante em que a fase atual começou.
    pub fn phase_since(&self) -> Option<Instant> {
        self.phase_since
    }

    /// Processa uma leitura do contador de passos.
    pub fn poll<T>(&mut self, steps: u32, now: Instant, transport: &T) -> GestureOutcome
    where
        T: TransportPort + ?Sized,
    {
        let Some(baseline) = self.baseline else {
            debug!("Pedômetro: baseline inicial = {steps}");
            self.baseline = Some(steps);
            return GestureOutcome::Seeded;
        };

        let timed_out = self.expire(now);

        if steps < baseline {
            debug!("Pedômetro voltou de {baseline} para {steps}, re-semeando");
            self.baseline = Some(steps);
            return GestureOutcome::CounterReset;
        }

        if timed_out {
            return GestureOutcome::AckTimedOut;
        }

        // Baseline fica parada durante a janela: o delta acumulado dispara
        // no primeiro poll em Idle
        if self.phase == GesturePhase::AwaitingAck {
            return GestureOutcome::Quiet;
        }

        if steps - baseline <= self.step_threshold {
            return GestureOutcome::Quiet;
        }

        self.baseline = Some(steps);
        self.enter(GesturePhase::ShakeDetected, now);
        info!("Shake detectado! (passos {steps})");

        if transport.send(&self.event) {
            info!("Shake enviado");
            self.enter(GesturePhase::AwaitingAck, now);
            GestureOutcome::ShakeSent
        } else {
            warn!("Falha ao enviar shake para o hub");
            self.enter(GesturePhase::Idle, now);
            GestureOutcome::SendFailed
        }
    }

    /// Volta para `Idle` se a janela de ack expirou. Retorna se expirou.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.phase != GesturePhase::AwaitingAck || !self.window_elapsed(now) {
            return false;
        }
        info!("Sem ack do hub em {:?}, voltando para Idle", self.ack_timeout);
        self.enter(GesturePhase::Idle, now);
        true
    }

    /// Ack do hub chegou. Retorna `true` se estava dentro da janela.
    pub fn acknowledge(&mut self, now: Instant) -> bool {
        if self.phase != GesturePhase::AwaitingAck {
            debug!("Ack ignorado: nenhum shake pendente");
            return false;
        }
        if self.window_elapsed(now) {
            debug!("Ack chegou depois da janela, ignorado");
            self.enter(GesturePhase::Idle, now);
            return false;
        }
        info!("Ack do shake recebido");
        self.enter(GesturePhase::Idle, now);
        true
    }

    fn window_elapsed(&self, now: Instant) -> bool {
        self.phase_since
            .is_some_and(|since| now.saturating_duration_since(since) >= self.ack_timeout)
    }

    fn enter(&mut self, phase: GesturePhase, now: Instant) {
        self.phase = phase;
        self.phase_since = Some(now);
    }
}
