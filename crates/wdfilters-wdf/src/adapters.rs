//! # WDF adapters
//!
//! Adapters connect the upward facing ports of their children into a single upward facing port,
//! following Kirchhoff's laws. Children are owned by value.
//!
//! Scattering coefficients are derived from the children's port resistances on every pass, so
//! changing a resistance anywhere below an adapter is picked up on the next sample without any
//! extra bookkeeping.
use crate::{AdaptedWdf, Wave, Wdf};
use num_traits::Zero;
use wdfilters_core::simd::SimdComplexField;

/// Series adapter: the same current flows through both children, and their voltages add up.
#[derive(Debug, Copy, Clone)]
pub struct Series<A: AdaptedWdf, B: AdaptedWdf<Scalar = A::Scalar>> {
    /// Child plugged into the first port
    pub left: A,
    /// Child plugged into the second port
    pub right: B,
    a: A::Scalar,
    b: A::Scalar,
}

impl<A: AdaptedWdf, B: AdaptedWdf<Scalar = A::Scalar>> Series<A, B> {
    /// Create a new series adapter, taking ownership of both children.
    pub fn new(left: A, right: B) -> Self {
        Self {
            left,
            right,
            a: A::Scalar::zero(),
            b: A::Scalar::zero(),
        }
    }
}

impl<A: AdaptedWdf, B: AdaptedWdf<Scalar = A::Scalar>> Wdf for Series<A, B> {
    type Scalar = A::Scalar;

    fn wave(&self) -> Wave<Self::Scalar> {
        Wave {
            a: self.a,
            b: self.b,
        }
    }

    fn incident(&mut self, x: Self::Scalar) {
        let p1z = self.left.impedance() / self.impedance();
        let w1 = self.left.wave();
        let w2 = self.right.wave();
        let b1 = w1.b - p1z * (x + w1.b + w2.b);
        self.left.incident(b1);
        self.right.incident(-x - b1);
        self.a = x;
    }

    fn reflected(&mut self) -> Self::Scalar {
        self.b = -self.left.reflected() - self.right.reflected();
        self.b
    }

    fn set_samplerate(&mut self, samplerate: f64) {
        self.left.set_samplerate(samplerate);
        self.right.set_samplerate(samplerate);
    }

    fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
        self.a.set_zero();
        self.b.set_zero();
    }
}

impl<A: AdaptedWdf, B: AdaptedWdf<Scalar = A::Scalar>> AdaptedWdf for Series<A, B> {
    fn impedance(&self) -> Self::Scalar {
        self.left.impedance() + self.right.impedance()
    }
}

/// Parallel adapter: both children see the same voltage, and their currents add up.
#[derive(Debug, Copy, Clone)]
pub struct Parallel<A: AdaptedWdf, B: AdaptedWdf<Scalar = A::Scalar>> {
    /// Child plugged into the first port
    pub left: A,
    /// Child plugged into the second port
    pub right: B,
    a: A::Scalar,
    b: A::Scalar,
    bdiff: A::Scalar,
    btemp: A::Scalar,
}

impl<A: AdaptedWdf, B: AdaptedWdf<Scalar = A::Scalar>> Parallel<A, B> {
    /// Create a new parallel adapter, taking ownership of both children.
    pub fn new(left: A, right: B) -> Self {
        Self {
            left,
            right,
            a: A::Scalar::zero(),
            b: A::Scalar::zero(),
            bdiff: A::Scalar::zero(),
            btemp: A::Scalar::zero(),
        }
    }
}

impl<A: AdaptedWdf, B: AdaptedWdf<Scalar = A::Scalar>> Wdf for Parallel<A, B> {
    type Scalar = A::Scalar;

    fn wave(&self) -> Wave<Self::Scalar> {
        Wave {
            a: self.a,
            b: self.b,
        }
    }

    fn incident(&mut self, x: Self::Scalar) {
        let b2 = x + self.btemp;
        self.left.incident(self.bdiff + b2);
        self.right.incident(b2);
        self.a = x;
    }

    fn reflected(&mut self) -> Self::Scalar {
        // G1 / (G1 + G2)
        let p1 = (self.left.impedance() / self.impedance()).simd_recip();
        let b1 = self.left.reflected();
        let b2 = self.right.reflected();
        self.bdiff = b2 - b1;
        self.btemp = -p1 * self.bdiff;
        self.b = b2 + self.btemp;
        self.b
    }

    fn set_samplerate(&mut self, samplerate: f64) {
        self.left.set_samplerate(samplerate);
        self.right.set_samplerate(samplerate);
    }

    fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
        self.a.set_zero();
        self.b.set_zero();
        self.btemp.set_zero();
        self.bdiff.set_zero();
    }
}

impl<A: AdaptedWdf, B: AdaptedWdf<Scalar = A::Scalar>> AdaptedWdf for Parallel<A, B> {
    fn admittance(&self) -> Self::Scalar {
        self.left.admittance() + self.right.admittance()
    }
}

/// Polarity inverter: flips the sign of the waves going through it, leaving the port resistance
/// untouched.
#[derive(Debug, Copy, Clone)]
pub struct Inverter<A: AdaptedWdf> {
    /// Inverted child
    pub inner: A,
    a: A::Scalar,
    b: A::Scalar,
}

impl<A: AdaptedWdf> Inverter<A> {
    /// Create a new inverter, taking ownership of its child.
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            a: A::Scalar::zero(),
            b: A::Scalar::zero(),
        }
    }
}

impl<A: AdaptedWdf> Wdf for Inverter<A> {
    type Scalar = A::Scalar;

    fn wave(&self) -> Wave<Self::Scalar> {
        Wave {
            a: self.a,
            b: self.b,
        }
    }

    fn incident(&mut self, x: Self::Scalar) {
        self.inner.incident(-x);
        self.a = x;
    }

    fn reflected(&mut self) -> Self::Scalar {
        self.b = -self.inner.reflected();
        self.b
    }

    fn set_samplerate(&mut self, samplerate: f64) {
        self.inner.set_samplerate(samplerate);
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.a.set_zero();
        self.b.set_zero();
    }
}

impl<A: AdaptedWdf> AdaptedWdf for Inverter<A> {
    fn impedance(&self) -> Self::Scalar {
        self.inner.impedance()
    }

    fn admittance(&self) -> Self::Scalar {
        self.inner.admittance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::*;
    use rstest::rstest;

    #[rstest]
    #[case(100.0, 100.0)]
    #[case(47.0, 2200.0)]
    #[case(1e6, 1.0)]
    fn series_impedance_is_sum(#[case] r1: f64, #[case] r2: f64) {
        let s = series(resistor(r1), resistor(r2));
        assert_eq!(r1 + r2, s.impedance());
    }

    #[rstest]
    #[case(100.0, 100.0)]
    #[case(47.0, 2200.0)]
    #[case(1e6, 1.0)]
    fn parallel_impedance_is_reciprocal_sum(#[case] r1: f64, #[case] r2: f64) {
        let p = parallel(resistor(r1), resistor(r2));
        let expected = r1 * r2 / (r1 + r2);
        assert!((p.impedance() - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn inverter_negates_both_ways() {
        let mut inv = inverter(rvsource(1e3, 0.5));
        assert_eq!(-0.5, inv.reflected());
        inv.incident(0.25);
        assert_eq!(-0.25, inv.inner.wave().a);
        assert_eq!(1e3, inv.impedance());
    }
}
