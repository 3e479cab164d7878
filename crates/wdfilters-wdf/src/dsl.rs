//! Short constructors for building WDF trees as nested expressions, e.g.
//! `module(ivsource(0.0), inverter(series(resistor(1e3), capacitor(48e3, 100e-9))))`.
use crate::*;
use num_traits::Zero;
use wdfilters_core::Scalar;

/// Voltage across the port of a node (V).
#[inline]
pub fn voltage<T: Scalar>(node: &impl Wdf<Scalar = T>) -> T {
    node.wave().voltage()
}

/// Current flowing into the port of an adapted node (A).
#[inline]
pub fn current<T: Scalar>(node: &impl AdaptedWdf<Scalar = T>) -> T {
    node.wave().current(node.impedance())
}

/// Resistor of resistance `r` (Ohm).
#[inline]
pub fn resistor<T: Scalar>(r: T) -> Resistor<T> {
    Resistor::new(r)
}

/// Capacitor of capacitance `c` (F), discretized at sample rate `fs` (Hz).
#[inline]
pub fn capacitor<T: Scalar>(fs: T, c: T) -> Capacitor<T> {
    Capacitor::new(fs, c)
}

/// Voltage source `vs` (V) in series with the resistance `r` (Ohm).
#[inline]
pub fn rvsource<T: Scalar>(r: T, vs: T) -> ResistiveVoltageSource<T> {
    ResistiveVoltageSource::new(r, vs)
}

/// Ideal voltage source `vs` (V), to place at the root of a tree.
#[inline]
pub fn ivsource<T: Zero>(vs: T) -> IdealVoltageSource<T> {
    IdealVoltageSource::new(vs)
}

/// Series adapter joining `left` and `right`.
#[inline]
pub fn series<A: AdaptedWdf, B: AdaptedWdf<Scalar = A::Scalar>>(left: A, right: B) -> Series<A, B> {
    Series::new(left, right)
}

/// Parallel adapter joining `left` and `right`.
#[inline]
pub fn parallel<A: AdaptedWdf, B: AdaptedWdf<Scalar = A::Scalar>>(
    left: A,
    right: B,
) -> Parallel<A, B> {
    Parallel::new(left, right)
}

/// Polarity inverter around `inner`.
#[inline]
pub fn inverter<W: AdaptedWdf>(inner: W) -> Inverter<W> {
    Inverter::new(inner)
}

/// Antiparallel diode pair with saturation current `isat` (A), to place at the root of a tree.
#[inline]
pub fn diode_pair<T: Scalar>(isat: T) -> DiodePair<T> {
    DiodePair::new(isat)
}

/// Complete circuit made of a `root` and the adapted tree it is plugged into.
#[inline]
pub fn module<Root: Wdf, Leaf: AdaptedWdf<Scalar = Root::Scalar>>(
    root: Root,
    leaf: Leaf,
) -> WdfModule<Root, Leaf> {
    WdfModule::new(root, leaf)
}
