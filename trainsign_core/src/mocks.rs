//! Helper collaborators for headless runs and tests.

use trainsign_traits::{ButtonEdges, DeviceReset, InputSource};

/// Front panel with no buttons; never reports an edge.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl InputSource for NoInput {
    fn poll(&mut self) -> ButtonEdges {
        ButtonEdges::NONE
    }
}

/// Records reset requests instead of acting on them.
#[derive(Debug, Default, Clone, Copy)]
pub struct CountingReset {
    pub resets: u32,
}

impl DeviceReset for CountingReset {
    fn reset(&mut self) {
        self.resets += 1;
    }
}
