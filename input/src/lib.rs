//! Input subsystem of the access-control device: keypad state machine over a key-scan driver,
//! and the millisecond timebase used for non-blocking timing.

pub mod gpiod;
pub mod debounce;
pub mod keypad;
pub mod timing;

use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum InputError {
    #[error("resource already in use")]
    AlreadyInUse,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("the feature is not supported on this backend")]
    NotSupported,
    #[error("already initialized")]
    AlreadyInitialized,
    #[error("IO error: {0}")]
    Io(std::io::ErrorKind),
    #[error("error: {0}")]
    Other(String),
}

impl From<std::io::Error> for InputError {
    fn from(err: std::io::Error) -> Self {
        InputError::Io(err.kind())
    }
}

pub type InputResult<T> = Result<T, InputError>;

/// Specifies the active level of the GPIO lines.
///
/// By default, the active level is high.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum GpioActiveLevel {
    #[default] High,
    Low,
}

/// Specifies the bias of the GPIO lines.
///
/// You can use this to enable pull-up or pull-down resistors,
/// e.g. on the row lines of a keypad matrix.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum GpioBias {
    #[default] None,
    PullUp,
    PullDown,
}

/// A group of `N` GPIO lines read together.
///
/// Values are logical: the active level has already been applied.
pub trait GpioBusInput<const N: usize>: Debug {
    fn read(&self) -> InputResult<[bool; N]>;
}

/// A group of `N` GPIO lines written together.
pub trait GpioBusOutput<const N: usize>: Debug {
    fn write(&self, values: &[bool; N]) -> InputResult<()>;
}
