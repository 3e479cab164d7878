//! # Unadapted nodes
//!
//! Nodes which cannot be adapted, and therefore can only sit at the root of a WDF tree.
use crate::{Wave, Wdf};
use num_traits::Zero;
use wdfilters_core::Scalar;

/// Ideal voltage source. Imposes its voltage whatever the port resistance is.
#[derive(Debug, Copy, Clone)]
pub struct IdealVoltageSource<T> {
    /// Voltage source value (V)
    pub vs: T,
    a: T,
    b: T,
}

impl<T: Zero> IdealVoltageSource<T> {
    /// Create a new ideal voltage source.
    ///
    /// # Arguments
    ///
    /// * `vs`: Voltage source value (V)
    ///
    /// returns: IdealVoltageSource<T>
    pub fn new(vs: T) -> Self {
        Self {
            vs,
            a: T::zero(),
            b: T::zero(),
        }
    }

    /// Drive the source with a new voltage.
    pub fn set_voltage(&mut self, vs: T) {
        self.vs = vs;
    }
}

impl<T: Scalar> Wdf for IdealVoltageSource<T> {
    type Scalar = T;

    fn wave(&self) -> Wave<Self::Scalar> {
        Wave {
            a: self.a,
            b: self.b,
        }
    }

    fn incident(&mut self, x: Self::Scalar) {
        self.a = x;
    }

    fn reflected(&mut self) -> Self::Scalar {
        self.b = -self.a + self.vs * T::from_f64(2.0);
        self.b
    }

    fn reset(&mut self) {
        self.a.set_zero();
        self.b.set_zero();
    }
}
