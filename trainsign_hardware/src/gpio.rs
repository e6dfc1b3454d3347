//! Physical buttons on Raspberry Pi GPIO (active low, internal pull-ups).

use rppal::gpio::{Gpio, InputPin};
use trainsign_traits::{ButtonEdges, InputSource};

use crate::debounce::Debouncer;
use crate::error::{HwError, Result};

struct Button {
    pin: InputPin,
    debounce: Debouncer,
}

impl Button {
    fn fell(&mut self) -> bool {
        let high = self.pin.is_high();
        self.debounce.update(high)
    }
}

pub struct GpioButtons {
    up: Button,
    down: Button,
}

impl GpioButtons {
    pub fn new(up_pin: u8, down_pin: u8, samples: u8) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let open = |n: u8| -> Result<Button> {
            let pin = gpio
                .get(n)
                .map_err(|e| HwError::Gpio(format!("pin {n}: {e}")))?
                .into_input_pullup();
            Ok(Button {
                pin,
                debounce: Debouncer::new(samples),
            })
        };
        Ok(Self {
            up: open(up_pin)?,
            down: open(down_pin)?,
        })
    }
}

impl InputSource for GpioButtons {
    fn poll(&mut self) -> ButtonEdges {
        // Sample both every poll so neither debouncer stalls.
        let up = self.up.fell();
        let down = self.down.fell();
        ButtonEdges { up, down }
    }
}
