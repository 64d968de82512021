//! Core Traits and Abstractions for Oilpress
//!
//! The core talks to hardware only through these traits, so the same
//! pipeline runs against real peripherals on the device and against
//! scripted sources in tests.
//!
//! ## Module Organization
//!
//! - [`acquisition`] - Ports for the ADC and the temperature probes
//! - [`time`] - Time source abstraction for the calibration state machine
//! - [`core`] - Small helpers shared by the numeric stages
//!
//! ## Usage Example
//!
//! ```rust
//! use oilpress_core::traits::{AdcSource, TemperatureSource};
//!
//! // Replay a fixed ADC trace
//! struct Trace<'a> {
//!     samples: &'a [u16],
//!     pos: usize,
//! }
//!
//! impl AdcSource for Trace<'_> {
//!     fn read_raw(&mut self) -> u16 {
//!         let sample = self.samples[self.pos % self.samples.len()];
//!         self.pos += 1;
//!         sample
//!     }
//! }
//!
//! let mut trace = Trace { samples: &[1200, 1210, 1190], pos: 0 };
//! assert_eq!(trace.read_raw(), 1200);
//! ```

pub mod acquisition;
pub mod core;
pub mod time;

// Re-export commonly used traits at the module level for convenience
pub use acquisition::{AdcSource, ChipTemperatureSource, NoChipTemperature, TemperatureSource};
pub use self::core::Validatable;
pub use time::TimeSource;
