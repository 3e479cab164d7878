//! # WDF Diode
//!
//! Antiparallel diode pair, solved in closed form with the Wright omega function.
//!
//! Source: K. J. Werner, V. Nangia, A. Bernardini, J. O. Smith III, A. Sarti, "An Improved and
//! Generalized Diode Clipper Model for Wave Digital Filters", AES Convention 139, 2015.
use crate::{Wave, Wdf};
use numeric_literals::replace_float_literals;
use wdfilters_core::math::wright_omega4;
use wdfilters_core::Scalar;

/// Range of saturation currents the solve is stable in (A).
pub const SATURATION_CURRENT_RANGE: (f64, f64) = (1e-12, 1e-6);
/// Range of number of diodes in series the solve is stable in.
pub const NUM_DIODES_RANGE: (f64, f64) = (1.0, 8.0);
/// Thermal voltage at room temperature (V).
pub const THERMAL_VOLTAGE: f64 = 0.02585;

/// Pair of identical diodes (or chains of diodes in series) in antiparallel.
///
/// This node cannot be adapted and must sit at the root of a WDF tree, which sets the port
/// resistance it sees through [`Wdf::set_port_resistance`]. The reflected wave is solved on
/// [`Wdf::incident`], in a fixed number of operations.
///
/// The solve stays passive for port resistances up to 10 kΩ, which covers RC stages at audio
/// sample rates. Above that, with the largest saturation currents, the approximation error of the
/// Wright omega function can reflect slightly more than the incident wave.
#[derive(Debug, Copy, Clone)]
pub struct DiodePair<T> {
    isat: T,
    vt: T,
    num_diodes: T,
    r: T,
    a: T,
    b: T,
}

impl<T: Scalar> DiodePair<T> {
    /// Create a new diode pair node, with room temperature thermal voltage and a single diode in
    /// each direction.
    ///
    /// # Arguments
    ///
    /// * `isat`: Reverse saturation current (A)
    ///
    /// returns: DiodePair<T>
    pub fn new(isat: T) -> Self {
        let mut this = Self {
            isat,
            vt: T::from_f64(THERMAL_VOLTAGE),
            num_diodes: T::one(),
            r: T::zero(),
            a: T::zero(),
            b: T::zero(),
        };
        this.set_diode_parameters(isat, T::from_f64(THERMAL_VOLTAGE), T::one());
        this
    }

    /// Sets the physical parameters of the diodes. The saturation current is clamped to
    /// `1e-12..=1e-6` A and the number of diodes to `1..=8`, the ranges in which the solve stays
    /// well-conditioned.
    ///
    /// # Arguments
    ///
    /// * `isat`: Reverse saturation current (A)
    /// * `vt`: Thermal voltage (V)
    /// * `num_diodes`: Number of diodes in series in each direction. Fractional values are
    ///   allowed, which lets the count be smoothed.
    ///
    /// returns: ()
    pub fn set_diode_parameters(&mut self, isat: T, vt: T, num_diodes: T) {
        self.isat = isat.simd_clamp(
            T::from_f64(SATURATION_CURRENT_RANGE.0),
            T::from_f64(SATURATION_CURRENT_RANGE.1),
        );
        self.num_diodes = num_diodes.simd_clamp(
            T::from_f64(NUM_DIODES_RANGE.0),
            T::from_f64(NUM_DIODES_RANGE.1),
        );
        self.vt = vt;
    }

    /// Saturation current in use, after clamping.
    pub fn saturation_current(&self) -> T {
        self.isat
    }

    /// Number of diodes in use, after clamping.
    pub fn num_diodes(&self) -> T {
        self.num_diodes
    }

    #[replace_float_literals(T::from_f64(literal))]
    fn solve(&self, a: T) -> T {
        let nvt = self.num_diodes * self.vt;
        let log_ris_vt = (self.r * self.isat / nvt).simd_ln();
        let lambda = a.simd_signum();
        let lambda_a_vt = a * lambda / nvt;
        let w0 = wright_omega4(log_ris_vt + lambda_a_vt);
        let w1 = wright_omega4(log_ris_vt - lambda_a_vt);
        a - 2.0 * lambda * nvt * (w0 - w1)
    }
}

impl<T: Scalar> Wdf for DiodePair<T> {
    type Scalar = T;

    fn wave(&self) -> Wave<Self::Scalar> {
        Wave {
            a: self.a,
            b: self.b,
        }
    }

    fn incident(&mut self, x: Self::Scalar) {
        self.a = x;
        self.b = self.solve(x);
    }

    fn reflected(&mut self) -> Self::Scalar {
        self.b
    }

    fn set_port_resistance(&mut self, resistance: Self::Scalar) {
        self.r = resistance;
    }

    fn reset(&mut self) {
        self.a = T::zero();
        self.b = T::zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wdfilters_core::util::tests::{Plot, Series};

    use crate::dsl::*;

    use plotters::style::*;
    use rstest::rstest;
    use std::f64::consts::TAU;

    const FS: f64 = 48000.0;
    const C: f64 = 47e-9;
    const MAX_PASSIVE_RESISTANCE: f64 = 1e4;

    fn clipper(
        cutoff: f64,
        num_diodes: f64,
    ) -> crate::WdfModule<
        DiodePair<f64>,
        crate::Parallel<crate::Capacitor<f64>, crate::ResistiveVoltageSource<f64>>,
    > {
        let r = f64::recip(TAU * C * cutoff);
        let mut diode = diode_pair(2.52e-9);
        diode.set_diode_parameters(2.52e-9, THERMAL_VOLTAGE, num_diodes);
        module(diode, parallel(capacitor(FS, C), rvsource(r, 0.0)))
    }

    #[test]
    fn test_diode_clipper_sine() {
        let mut module = clipper(1000.0, 2.0);

        let input = (0..960)
            .map(|i| 4.0 * f64::sin(TAU * 100.0 * i as f64 / FS))
            .collect::<Vec<_>>();
        let mut output = Vec::with_capacity(input.len());

        for x in input.iter().copied() {
            module.leaf.right.set_voltage(x);
            module.process_sample();
            output.push(voltage(&module.leaf.left));
        }

        let peak = output.iter().copied().map(f64::abs).fold(0.0, f64::max);
        assert!(peak < 1.0, "Output not clipped: peak = {peak}");
        assert!(peak > 0.5, "Output too quiet: peak = {peak}");
        assert!(output.iter().all(|x| x.is_finite()));

        Plot {
            title: "Diode Clipper",
            bode: false,
            series: &[
                Series {
                    label: "Input",
                    samplerate: FS,
                    series: &input,
                    color: &BLUE,
                },
                Series {
                    label: "Output",
                    samplerate: FS,
                    series: &output,
                    color: &RED,
                },
            ],
        }
        .create_svg("plots/wdf/diode_clipper.svg");
    }

    #[rstest]
    fn test_diode_pair_is_odd(#[values(0.01, 0.3, 2.0, 50.0)] drive: f64) {
        let mut pos = clipper(1000.0, 2.0);
        let mut neg = clipper(1000.0, 2.0);
        for _ in 0..64 {
            pos.leaf.right.set_voltage(drive);
            neg.leaf.right.set_voltage(-drive);
            pos.process_sample();
            neg.process_sample();
        }
        let vp = voltage(&pos.leaf.left);
        let vn = voltage(&neg.leaf.left);
        assert!((vp + vn).abs() < 1e-9 * vp.abs().max(1.0), "{vp} != -{vn}");
    }

    #[test]
    fn test_more_diodes_clip_higher() {
        let settle = |num_diodes| {
            let mut module = clipper(1000.0, num_diodes);
            for _ in 0..4800 {
                module.leaf.right.set_voltage(10.0);
                module.process_sample();
            }
            voltage(&module.leaf.left)
        };
        let one = settle(1.0);
        let four = settle(4.0);
        assert!(four > 3.0 * one, "1 diode: {one}, 4 diodes: {four}");
    }

    #[test]
    fn test_small_signals_pass_through() {
        let mut module = clipper(1000.0, 2.0);
        for _ in 0..4800 {
            module.leaf.right.set_voltage(0.01);
            module.process_sample();
        }
        let v = voltage(&module.leaf.left);
        assert!((v - 0.01).abs() < 1e-4, "{v}");
    }

    #[rstest]
    #[case(0.0, 1.0, 1e-12, 1.0)]
    #[case(1.0, 100.0, 1e-6, 8.0)]
    #[case(2.52e-9, 2.5, 2.52e-9, 2.5)]
    fn test_parameters_are_clamped(
        #[case] isat: f64,
        #[case] num_diodes: f64,
        #[case] expected_isat: f64,
        #[case] expected_num_diodes: f64,
    ) {
        let mut diode = DiodePair::<f64>::new(2.52e-9);
        diode.set_diode_parameters(isat, THERMAL_VOLTAGE, num_diodes);
        assert_eq!(expected_isat, diode.saturation_current());
        assert_eq!(expected_num_diodes, diode.num_diodes());
    }

    #[rstest]
    fn test_extreme_inputs_stay_finite(
        #[values(100.0, 221.6, 1330.0, 1e5)] resistance: f64,
        #[values(1e-12, 1e-6)] isat: f64,
        #[values(1.0, 8.0)] num_diodes: f64,
    ) {
        let mut diode = DiodePair::<f64>::new(isat);
        diode.set_diode_parameters(isat, THERMAL_VOLTAGE, num_diodes);
        diode.set_port_resistance(resistance);
        for a in [-1e6, -1.0, -0.05, 0.0, 1e-9, 0.05, 1.0, 1e6] {
            diode.incident(a);
            let b = diode.reflected();
            assert!(b.is_finite(), "b({a}) = {b}");
            if resistance <= MAX_PASSIVE_RESISTANCE {
                // A diode never reflects more energy than it receives
                assert!(b.abs() <= a.abs() + 1e-12, "b({a}) = {b}");
            }
        }
    }
}
