//! GPIO buses on the Linux GPIO character device, using the gpiod library.
//!
//! Used to wire the keypad matrix of the device to the [MatrixKeyScanner](crate::keypad::MatrixKeyScanner).
use crate::{GpioActiveLevel, GpioBias, GpioBusInput, GpioBusOutput, InputError, InputResult};
use bitvec::vec::BitVec;
use log::debug;
use std::fmt::{Debug, Formatter};
use std::path::Path;
use std::sync::atomic::AtomicU8;

/// GpiodDriver hands out groups of lines of one GPIO chip as input and output buses.
///
/// Every line can be part of one bus at a time; lines are released when the bus is dropped.
pub struct GpiodDriver {
    chip: gpiod::Chip,
    used_lines: BitVec<AtomicU8>,
}

impl GpiodDriver {
    pub fn new(chip: gpiod::Chip) -> Self {
        let n = chip.num_lines() as usize;
        Self {
            chip,
            used_lines: BitVec::repeat(false, n),
        }
    }

    /// Opens the GPIO chip at `path`, e.g. `/dev/gpiochip0`.
    pub fn open(path: impl AsRef<Path>) -> InputResult<Self> {
        let chip = gpiod::Chip::new(path.as_ref())?;
        Ok(Self::new(chip))
    }

    /// Gets the amount of lines of the chip.
    pub fn count(&self) -> usize {
        self.chip.num_lines() as usize
    }

    fn claim<const N: usize>(&self, indices: &[usize; N]) -> InputResult<()> {
        let n = self.count();

        if indices.iter().any(|&index| index >= n) {
            return Err(InputError::InvalidArgument);
        }

        if indices.iter().any(|&index| self.used_lines[index]) {
            return Err(InputError::AlreadyInUse);
        }

        for (i, index) in indices.iter().enumerate() {
            if indices[..i].contains(index) {
                return Err(InputError::InvalidArgument);
            }
        }

        for &index in indices {
            self.used_lines.set_aliased(index, true);
        }
        Ok(())
    }

    fn release(&self, indices: &[usize]) {
        for &index in indices {
            self.used_lines.set_aliased(index, false);
        }
    }

    /// Requests the lines at `indices` as an input bus.
    ///
    /// # Errors
    /// - `InputError::InvalidArgument` if an index is out of range or repeated.
    /// - `InputError::AlreadyInUse` if a line is part of another bus.
    /// - `InputError::Io` if the kernel refuses the request.
    pub fn input_bus<const N: usize>(
        &self,
        indices: [usize; N],
        active_level: GpioActiveLevel,
        bias: GpioBias,
    ) -> InputResult<GpiodBusInput<'_, N>> {
        self.claim(&indices)?;
        let lines = self.chip.request_lines(
            gpiod::Options::input(indices.map(|index| index as u32))
                .consumer(env!("CARGO_PKG_NAME"))
                .active(active_level.into())
                .bias(bias.into()),
        );
        match lines {
            Ok(lines) => {
                debug!("{:?}{:?} requested as input.", self, indices);
                Ok(GpiodBusInput { driver: self, indices, lines })
            }
            Err(err) => {
                self.release(&indices);
                Err(err.into())
            }
        }
    }

    /// Requests the lines at `indices` as an output bus.
    ///
    /// # Errors
    /// Same as [GpiodDriver::input_bus].
    pub fn output_bus<const N: usize>(
        &self,
        indices: [usize; N],
        active_level: GpioActiveLevel,
        bias: GpioBias,
    ) -> InputResult<GpiodBusOutput<'_, N>> {
        self.claim(&indices)?;
        let lines = self.chip.request_lines(
            gpiod::Options::output(indices.map(|index| index as u32))
                .consumer(env!("CARGO_PKG_NAME"))
                .active(active_level.into())
                .bias(bias.into()),
        );
        match lines {
            Ok(lines) => {
                debug!("{:?}{:?} requested as output.", self, indices);
                Ok(GpiodBusOutput { driver: self, indices, lines })
            }
            Err(err) => {
                self.release(&indices);
                Err(err.into())
            }
        }
    }
}

impl Debug for GpiodDriver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "GpiodDriver({})", self.chip.name())
    }
}

impl From<GpioActiveLevel> for gpiod::Active {
    fn from(level: GpioActiveLevel) -> Self {
        match level {
            GpioActiveLevel::High => gpiod::Active::High,
            GpioActiveLevel::Low => gpiod::Active::Low,
        }
    }
}

impl From<GpioBias> for gpiod::Bias {
    fn from(bias: GpioBias) -> Self {
        match bias {
            GpioBias::None => gpiod::Bias::Disable,
            GpioBias::PullUp => gpiod::Bias::PullUp,
            GpioBias::PullDown => gpiod::Bias::PullDown,
        }
    }
}

pub struct GpiodBusInput<'a, const N: usize> {
    driver: &'a GpiodDriver,
    indices: [usize; N],
    lines: gpiod::Lines<gpiod::Input>,
}

impl<const N: usize> Debug for GpiodBusInput<'_, N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}{:?}[input]", self.driver, self.indices)
    }
}

impl<const N: usize> GpioBusInput<N> for GpiodBusInput<'_, N> {
    fn read(&self) -> InputResult<[bool; N]> {
        let values = self.lines.get_values([false; N])?;
        Ok(values)
    }
}

impl<const N: usize> Drop for GpiodBusInput<'_, N> {
    fn drop(&mut self) {
        self.driver.release(&self.indices);
    }
}

pub struct GpiodBusOutput<'a, const N: usize> {
    driver: &'a GpiodDriver,
    indices: [usize; N],
    lines: gpiod::Lines<gpiod::Output>,
}

impl<const N: usize> Debug for GpiodBusOutput<'_, N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}{:?}[output]", self.driver, self.indices)
    }
}

impl<const N: usize> GpioBusOutput<N> for GpiodBusOutput<'_, N> {
    fn write(&self, values: &[bool; N]) -> InputResult<()> {
        self.lines.set_values(*values)?;
        Ok(())
    }
}

impl<const N: usize> Drop for GpiodBusOutput<'_, N> {
    fn drop(&mut self) {
        self.driver.release(&self.indices);
    }
}
