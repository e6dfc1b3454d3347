//! The main loop: poll buttons, tick the controller, sleep one quantum.

use std::sync::atomic::{AtomicBool, Ordering};

use trainsign_traits::{DataSource, DeviceReset, DisplaySink, InputSource, LinkClient, TimeSync};

use crate::config::ButtonMap;
use crate::controller::SignController;
use crate::error::SignError;
use crate::status::TickStatus;

/// Loop parameters that are not part of the controller.
#[derive(Debug, Clone, Default)]
pub struct RunParams {
    pub buttons: ButtonMap,
    /// Stop after this many iterations. `None` runs until shutdown or reset.
    pub max_iterations: Option<u64>,
}

/// Why `run` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    /// The device reset collaborator was invoked.
    Reset { errors: u32 },
    /// The shutdown flag was raised.
    Shutdown,
    IterationLimit,
}

/// Drive the sign until shutdown, the iteration limit, or a device reset.
///
/// On `TickStatus::ResetRequired` the reset collaborator is called exactly
/// once and no further iteration runs. A button bound to a line missing from
/// the registry is the only error path.
pub fn run<D, S, L, T, I, R>(
    controller: &mut SignController<D, S, L, T>,
    input: &mut I,
    reset: &mut R,
    params: &RunParams,
    shutdown: &AtomicBool,
) -> Result<RunExit, SignError>
where
    D: DataSource,
    S: DisplaySink,
    L: LinkClient,
    T: TimeSync,
    I: InputSource + ?Sized,
    R: DeviceReset + ?Sized,
{
    params.buttons.check(controller.registry())?;
    let poll = controller.timing().poll;
    let mut iterations: u64 = 0;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!(iterations, "shutdown requested");
            return Ok(RunExit::Shutdown);
        }
        if let Some(limit) = params.max_iterations
            && iterations >= limit
        {
            tracing::debug!(iterations, "iteration limit reached");
            return Ok(RunExit::IterationLimit);
        }
        iterations += 1;

        let edges = input.poll();
        if let Some(line) = params.buttons.resolve(edges) {
            let button = if edges.up { "up" } else { "down" };
            if controller.switch_line(line)? {
                tracing::info!(button, line, "button");
            }
        }

        let now = controller.clock().now();
        let wall = controller.wall_now();
        if let TickStatus::ResetRequired { errors } = controller.tick(now, wall) {
            tracing::error!(errors, "resetting device");
            reset.reset();
            return Ok(RunExit::Reset { errors });
        }

        controller.clock().sleep(poll);
    }
}
