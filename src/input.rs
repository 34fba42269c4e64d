use crate::messages::InputCommand;
use std::io::BufRead;
use tokio::sync::mpsc;

/// Read operator input (keyboard or barcode scanner) on a dedicated thread.
///
/// Scanners type the code followed by Enter, so every line is one submission.
/// The thread ends when stdin closes or the receiver is dropped.
pub fn monitor_stdin(tx: mpsc::Sender<InputCommand>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    let command = InputCommand::parse(&line);
                    tracing::debug!("Input: {:?}", command);
                    if tx.blocking_send(command).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to read input: {}", e);
                    break;
                }
            }
        }
        tracing::debug!("Input closed");
    });
}
