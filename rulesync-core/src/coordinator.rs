// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Download coordination (singleflight)
//!
//! Concurrent requests for the same ruleset id share one transfer. The
//! transfer runs as its own task, so a caller that stops waiting does
//! not cancel it for the others. The in-flight entry is removed before
//! the outcome is broadcast; any request arriving afterwards starts a
//! fresh transfer. [`DownloadCoordinator::forget_all`] detaches running
//! transfers the same way ahead of time.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;
use tokio::sync::broadcast;

use crate::store::{TransportError, TransportResult};

/// Outcome shared with every waiter of a transfer.
type Outcome = TransportResult<Arc<Vec<u8>>>;

type InFlight = Arc<Mutex<Flights>>;

#[derive(Debug, Default)]
struct Flights {
    next_token: u64,
    by_id: HashMap<String, Flight>,
}

#[derive(Debug)]
struct Flight {
    token: u64,
    sender: broadcast::Sender<Outcome>,
}

/// Deduplicates concurrent downloads per ruleset id
#[derive(Debug, Default)]
pub struct DownloadCoordinator {
    in_flight: InFlight,
}

/// Removes the in-flight entry when the transfer task ends, including
/// by panic. An entry that was forgotten and replaced by a newer flight
/// is left alone.
struct FlightGuard {
    in_flight: InFlight,
    id: String,
    token: u64,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        let mut flights = lock(&self.in_flight);
        if flights.by_id.get(&self.id).map(|f| f.token) == Some(self.token) {
            flights.by_id.remove(&self.id);
        }
    }
}

impl DownloadCoordinator {
    /// Create a coordinator with no transfers in flight
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transfers currently in flight
    pub fn in_flight_count(&self) -> usize {
        lock(&self.in_flight).by_id.len()
    }

    /// Detach every running transfer
    ///
    /// Running transfers still finish and answer the callers already
    /// waiting on them, but later requests start fresh transfers.
    pub fn forget_all(&self) {
        let mut flights = lock(&self.in_flight);
        if !flights.by_id.is_empty() {
            debug!("Detaching {} in-flight downloads", flights.by_id.len());
            flights.by_id.clear();
        }
    }

    /// Wait for the outcome of the transfer for `id`
    ///
    /// Attaches to the running transfer if there is one; otherwise calls
    /// `transfer` and spawns the returned future on the current tokio
    /// runtime. Every waiter receives the same bytes or the same error.
    ///
    /// Dropping the returned future only detaches this caller.
    pub async fn request<F, Fut>(&self, id: &str, transfer: F) -> Outcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = TransportResult<Vec<u8>>> + Send + 'static,
    {
        let (mut receiver, leader) = {
            let mut flights = lock(&self.in_flight);
            match flights.by_id.get(id) {
                Some(flight) => {
                    debug!("Joining in-flight download of '{}'", id);
                    (flight.sender.subscribe(), None)
                }
                None => {
                    let token = flights.next_token;
                    flights.next_token += 1;
                    let (sender, receiver) = broadcast::channel(1);
                    flights.by_id.insert(
                        id.to_string(),
                        Flight {
                            token,
                            sender: sender.clone(),
                        },
                    );
                    (receiver, Some((sender, token)))
                }
            }
        };

        // Started outside the map lock: the guard takes it on drop
        if let Some((sender, token)) = leader {
            let guard = FlightGuard {
                in_flight: Arc::clone(&self.in_flight),
                id: id.to_string(),
                token,
            };
            let fut = transfer();
            tokio::spawn(async move {
                let outcome = fut.await.map(Arc::new);
                drop(guard);
                // No receivers left means every waiter gave up
                let _ = sender.send(outcome);
            });
        }

        // A closed channel means the task died before sending
        receiver
            .recv()
            .await
            .unwrap_or(Err(TransportError::Interrupted))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
