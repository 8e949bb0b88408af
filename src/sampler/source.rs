//! Signal source abstraction.

use std::time::Duration;

use thiserror::Error;

use crate::failover::Receiver;

/// Errors a source may report for a single sample.
#[derive(Debug, Error)]
pub enum SampleError {
    /// The source could not produce a reading this tick.
    #[error("{receiver} source unavailable: {reason}")]
    Unavailable { receiver: Receiver, reason: String },

    /// The source produced NaN or an infinity.
    #[error("{receiver} source returned non-finite value {value}")]
    NonFinite { receiver: Receiver, value: f64 },
}

/// Anything that can report a signal-strength reading for a receiver.
///
/// `at` is the time since the sampling loop started.
pub trait SignalSource: Send {
    fn sample(&mut self, receiver: Receiver, at: Duration) -> Result<f64, SampleError>;
}

impl<S: SignalSource + ?Sized> SignalSource for Box<S> {
    fn sample(&mut self, receiver: Receiver, at: Duration) -> Result<f64, SampleError> {
        (**self).sample(receiver, at)
    }
}

/// A source backed by a closure. `None` is reported as unavailable.
///
/// Handy for scripted traces in tests and for embedding the controller
/// behind an existing receiver API.
pub struct FnSource<F> {
    f: F,
}

impl<F> FnSource<F>
where
    F: FnMut(Receiver, Duration) -> Option<f64> + Send,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> SignalSource for FnSource<F>
where
    F: FnMut(Receiver, Duration) -> Option<f64> + Send,
{
    fn sample(&mut self, receiver: Receiver, at: Duration) -> Result<f64, SampleError> {
        (self.f)(receiver, at).ok_or_else(|| SampleError::Unavailable {
            receiver,
            reason: "no reading".to_string(),
        })
    }
}
