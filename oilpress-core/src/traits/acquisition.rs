//! Acquisition Ports
//!
//! The core treats every sensor as synchronous and always available: a call
//! returns a fresh reading or a documented sentinel, never an error. Bus
//! timeouts and retries belong to the driver behind the port.

/// Analog front end of the pressure channel
pub trait AdcSource {
    /// Take one conversion, in the ADC's native count range
    fn read_raw(&mut self) -> u16;
}

/// Oil temperature probe
///
/// Implementations return the driver's value unmodified, including its
/// "no device" sentinel (anything below -100 °C). The snapshot assembler
/// maps the sentinel to `None`.
pub trait TemperatureSource {
    /// Trigger a conversion and read the result in °C
    fn read_celsius(&mut self) -> f32;
}

/// On-die temperature of the MCU, reported for diagnostics only
pub trait ChipTemperatureSource {
    /// Read the die temperature in °C, `None` if the chip has no sensor
    fn read_chip_celsius(&mut self) -> Option<f32>;
}

/// Placeholder for boards without a die temperature sensor
#[derive(Debug, Clone, Copy, Default)]
pub struct NoChipTemperature;

impl ChipTemperatureSource for NoChipTemperature {
    fn read_chip_celsius(&mut self) -> Option<f32> {
        None
    }
}

impl<T: AdcSource + ?Sized> AdcSource for &mut T {
    fn read_raw(&mut self) -> u16 {
        (**self).read_raw()
    }
}

impl<T: TemperatureSource + ?Sized> TemperatureSource for &mut T {
    fn read_celsius(&mut self) -> f32 {
        (**self).read_celsius()
    }
}

impl<T: ChipTemperatureSource + ?Sized> ChipTemperatureSource for &mut T {
    fn read_chip_celsius(&mut self) -> Option<f32> {
        (**self).read_chip_celsius()
    }
}
