//! Keyboard stand-in for the two front-panel buttons.
//!
//! A helper thread reads lines and forwards `u` / `d` key presses over a
//! channel; `poll` drains whatever arrived since the last call.

use std::io::BufRead;
use std::thread;

use crossbeam_channel::{Receiver, TryRecvError, unbounded};
use trainsign_traits::{ButtonEdges, InputSource};

pub struct StdinInput {
    rx: Receiver<ButtonEdges>,
    closed: bool,
}

impl StdinInput {
    /// Read from the process's stdin.
    pub fn spawn() -> Self {
        Self::from_reader(std::io::BufReader::new(std::io::stdin()))
    }

    pub fn from_reader<R: BufRead + Send + 'static>(reader: R) -> Self {
        let (tx, rx) = unbounded();
        let spawned = thread::Builder::new()
            .name("trainsign-stdin".into())
            .spawn(move || {
                for line in reader.lines() {
                    let Ok(line) = line else { break };
                    let edges = keys_to_edges(&line);
                    if edges.any() && tx.send(edges).is_err() {
                        break;
                    }
                }
            });
        if let Err(e) = spawned {
            tracing::warn!(error = %e, "stdin reader thread failed to start");
        }
        Self { rx, closed: false }
    }
}

/// `u` presses up, `d` presses down; anything else is ignored.
pub fn keys_to_edges(line: &str) -> ButtonEdges {
    let mut edges = ButtonEdges::NONE;
    for c in line.chars() {
        match c.to_ascii_lowercase() {
            'u' => edges.up = true,
            'd' => edges.down = true,
            _ => {}
        }
    }
    edges
}

impl InputSource for StdinInput {
    fn poll(&mut self) -> ButtonEdges {
        let mut edges = ButtonEdges::NONE;
        loop {
            match self.rx.try_recv() {
                Ok(e) => {
                    edges.up |= e.up;
                    edges.down |= e.down;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.closed {
                        tracing::debug!("stdin closed, buttons inactive");
                        self.closed = true;
                    }
                    break;
                }
            }
        }
        edges
    }
}
