//! Async driver that connects a controller to a [`GraphService`].
//!
//! Every fetch runs as its own tokio task and reports back over a channel, so
//! completions reach the controller one at a time, in arrival order. The
//! controller itself never leaves the task that owns the session.

use crate::controller::GraphViewController;
use crate::render::RenderSurface;
use crate::request::{Completion, Fetch};
use crate::service::{GraphService, ServiceError};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{trace, warn};

pub struct Session<S, R>
where
    S: GraphService + 'static,
    R: RenderSurface,
{
    controller: GraphViewController<R>,
    service: Arc<S>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl<S, R> Session<S, R>
where
    S: GraphService + 'static,
    R: RenderSurface,
{
    pub fn new(service: S, controller: GraphViewController<R>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            controller,
            service: Arc::new(service),
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn controller(&self) -> &GraphViewController<R> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut GraphViewController<R> {
        &mut self.controller
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Issues the startup fetches.
    pub fn start(&mut self) {
        let fetches = self.controller.initialize();
        self.dispatch(fetches);
    }

    /// Runs a user gesture against the controller and sends whatever it asks for.
    pub fn gesture<F>(&mut self, gesture: F)
    where
        F: FnOnce(&mut GraphViewController<R>) -> Vec<Fetch>,
    {
        let fetches = gesture(&mut self.controller);
        self.dispatch(fetches);
        self.pump_surface();
    }

    pub fn dispatch(&mut self, fetches: Vec<Fetch>) {
        for fetch in fetches {
            trace!(request = ?fetch.request, generation = fetch.ticket.generation, "dispatching");
            self.in_flight += 1;
            let service = Arc::clone(&self.service);
            let tx = self.tx.clone();
            let request = fetch.request.clone();
            let task = tokio::spawn(async move { service.fetch(&request).await });
            tokio::spawn(async move {
                // A panicking fetch still has to complete its ticket.
                let outcome = task.await.unwrap_or_else(|e| {
                    warn!(error = %e, "fetch task failed");
                    Err(ServiceError::TaskFailed(e.to_string()))
                });
                // The receiver only goes away with the session itself.
                let _ = tx.send(fetch.complete(outcome));
            });
        }
    }

    /// Waits for the next completion. `None` once nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.rx.recv().await?;
        self.in_flight -= 1;
        Some(completion)
    }

    pub fn apply(&mut self, completion: Completion) {
        let follow_up = self.controller.apply(completion);
        self.dispatch(follow_up);
        self.pump_surface();
    }

    /// Applies one completion. Returns false when there was nothing to wait for.
    pub async fn step(&mut self) -> bool {
        match self.next_completion().await {
            Some(completion) => {
                self.apply(completion);
                true
            }
            None => false,
        }
    }

    /// Runs until every fetch, including follow-ups, has completed.
    pub async fn settle(&mut self) {
        while self.step().await {}
    }

    fn pump_surface(&mut self) {
        let fetches = self.controller.pump_surface_events();
        self.dispatch(fetches);
    }
}
