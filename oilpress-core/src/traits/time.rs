//! Time Source Abstraction
//!
//! The pull-up calibration waits 300 ms and then samples every 5 ms. Rather
//! than calling a delay, the routine asks a `TimeSource` what time it is and
//! returns `WouldBlock` until its next deadline, so tests can run it against
//! a scripted clock in zero real time.
//!
//! ## Common Implementations
//!
//! - `MonotonicClock`: `std::time::Instant` based, for host builds
//! - `MockTimeSource`: Controllable time for testing
//! - On the device: a thin wrapper over the HAL's millisecond timer

use crate::time::Timestamp;

/// Source of time for the system
///
/// ## Implementation Requirements
///
/// - `now()` must never go backwards for monotonic sources
/// - Timestamp overflow must be handled gracefully (saturate, don't wrap)
///
/// ## Example Implementation
///
/// ```rust
/// use oilpress_core::traits::TimeSource;
/// use oilpress_core::time::Timestamp;
///
/// struct TickTimer {
///     // ... handle to the hardware timer
/// }
///
/// impl TimeSource for TickTimer {
///     fn now(&self) -> Timestamp {
///         // Read the 1 kHz tick counter
///         0 // placeholder
///     }
/// }
/// ```
pub trait TimeSource: Send {
    /// Get current timestamp in milliseconds
    ///
    /// The calibration routine only needs intervals, so any monotonic
    /// source will do.
    fn now(&self) -> Timestamp;
}
