use crate::error::GenerationError;
use crate::generation::client::{ChatTransport, Generated, GenerationClient};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::JoinHandle;

#[derive(Debug)]
pub struct GenerationOutcome {
    pub run_id: u64,
    pub prompt: String,
    pub result: Result<Generated, GenerationError>,
}

struct InFlight {
    run_id: u64,
    prompt: String,
    worker: JoinHandle<()>,
}

/// Runs generation calls off the event loop, at most one at a time.
pub struct GenerationRunner<T: ChatTransport + 'static> {
    client: Arc<GenerationClient<T>>,
    outcome_tx: Sender<GenerationOutcome>,
    outcome_rx: Receiver<GenerationOutcome>,
    in_flight: Option<InFlight>,
    sequence: u64,
}

impl<T: ChatTransport + 'static> GenerationRunner<T> {
    pub fn new(client: GenerationClient<T>) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel::<GenerationOutcome>();
        Self {
            client: Arc::new(client),
            outcome_tx,
            outcome_rx,
            in_flight: None,
            sequence: 0,
        }
    }

    pub fn client(&self) -> &GenerationClient<T> {
        &self.client
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Starts a generation call unless one is already outstanding.
    pub fn start(&mut self, prompt: &str) -> Result<u64, GenerationError> {
        if self.in_flight.is_some() {
            return Err(GenerationError::Busy);
        }
        if prompt.trim().is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }

        self.sequence = self.sequence.saturating_add(1);
        let run_id = self.sequence;
        let client = Arc::clone(&self.client);
        let outcome_tx = self.outcome_tx.clone();
        let owned_prompt = prompt.to_string();
        let worker = std::thread::spawn(move || {
            let result = client.generate(&owned_prompt);
            let _ = outcome_tx.send(GenerationOutcome {
                run_id,
                prompt: owned_prompt,
                result,
            });
        });

        tracing::debug!(run_id, "generation started");
        self.in_flight = Some(InFlight {
            run_id,
            prompt: prompt.to_string(),
            worker,
        });
        Ok(run_id)
    }

    /// Collects finished calls and clears the busy flag.
    pub fn drain_ready(&mut self) -> Vec<GenerationOutcome> {
        let mut out = self.receive_pending();

        let worker_gone = self
            .in_flight
            .as_ref()
            .is_some_and(|flight| flight.worker.is_finished());
        if worker_gone && out.is_empty() {
            out = self.receive_pending();
            if out.is_empty() {
                if let Some(flight) = self.in_flight.take() {
                    tracing::error!(run_id = flight.run_id, "generation worker died");
                    out.push(GenerationOutcome {
                        run_id: flight.run_id,
                        prompt: flight.prompt,
                        result: Err(GenerationError::Runner),
                    });
                }
            }
        }

        for outcome in &out {
            if self
                .in_flight
                .as_ref()
                .is_some_and(|flight| flight.run_id == outcome.run_id)
            {
                self.in_flight = None;
            }
            tracing::debug!(run_id = outcome.run_id, ok = outcome.result.is_ok(), "generation finished");
        }
        out
    }

    fn receive_pending(&self) -> Vec<GenerationOutcome> {
        let mut out = Vec::<GenerationOutcome>::new();
        loop {
            match self.outcome_rx.try_recv() {
                Ok(outcome) => out.push(outcome),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        out
    }
}
