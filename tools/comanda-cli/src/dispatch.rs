//! Messaging channel that prints to the terminal.

use std::sync::Mutex;

use async_trait::async_trait;
use comanda_commerce::backend::{DispatchError, MessageDispatch};
use tracing::info;

/// Prints the kitchen message instead of sending it.
///
/// Keeps the last payload so JSON output can include it.
#[derive(Default)]
pub struct ConsoleDispatch {
    quiet: bool,
    sent: Mutex<Vec<(String, String)>>,
}

impl ConsoleDispatch {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Destinations and payloads handed over so far.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl MessageDispatch for ConsoleDispatch {
    async fn dispatch(&self, destination: &str, payload: &str) -> Result<(), DispatchError> {
        if destination.trim().is_empty() {
            return Err(DispatchError::InvalidDestination(
                "no messaging destination configured".to_string(),
            ));
        }
        info!(destination, bytes = payload.len(), "kitchen message handed to console");
        if !self.quiet {
            println!("\n--- message to {} ---", destination);
            println!("{}", payload);
            println!("--- end of message ---");
        }
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((destination.to_string(), payload.to_string()));
        Ok(())
    }
}
