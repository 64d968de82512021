//! Numeric helpers shared by the pipeline stages

/// Trait for values that can carry a measurement
pub trait Validatable {
    /// Check if the value is a usable number (not NaN, not infinite)
    fn is_valid(&self) -> bool;

    /// `Some(self)` for usable numbers, `None` otherwise
    fn valid(self) -> Option<Self>
    where
        Self: Sized,
    {
        if self.is_valid() { Some(self) } else { None }
    }
}

impl Validatable for f32 {
    fn is_valid(&self) -> bool {
        self.is_finite()
    }
}

impl Validatable for f64 {
    fn is_valid(&self) -> bool {
        self.is_finite()
    }
}
