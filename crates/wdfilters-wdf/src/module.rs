//! # WDF modules
//!
//! A module joins an unadaptable root to the adapted tree below it, and drives the per-sample
//! scattering pass.
use crate::{AdaptedWdf, Wdf};

/// Complete WDF circuit: an unadapted root plugged into the upward facing port of an adapted
/// tree. Both are owned by the module, and reachable through its public fields.
#[derive(Debug, Copy, Clone)]
pub struct WdfModule<Root: Wdf, Leaf: AdaptedWdf<Scalar = Root::Scalar>> {
    /// Root node, which receives the port resistance of the tree
    pub root: Root,
    /// Adapted tree
    pub leaf: Leaf,
}

#[profiling::all_functions]
impl<Root: Wdf, Leaf: AdaptedWdf<Scalar = Root::Scalar>> WdfModule<Root, Leaf> {
    /// Create a new module from its root and adapted tree.
    pub fn new(root: Root, leaf: Leaf) -> Self {
        Self { root, leaf }
    }

    /// Set the sample rate of every node in the circuit.
    pub fn set_samplerate(&mut self, samplerate: f64) {
        self.root.set_samplerate(samplerate);
        self.leaf.set_samplerate(samplerate);
    }

    /// Run one sample of the circuit: waves travel up from the leaves to the root, get reflected
    /// there, and travel back down.
    pub fn process_sample(&mut self) {
        self.scatter_up();
        self.scatter_down();
    }

    /// First half of a sample: the tree reflects its waves up into the root, which sees the
    /// current port resistance of the tree. Leaves still hold the state of the previous sample
    /// until [`Self::scatter_down`] runs.
    pub fn scatter_up(&mut self) {
        self.root.set_port_resistance(self.leaf.impedance());
        self.root.incident(self.leaf.reflected());
    }

    /// Second half of a sample: the wave reflected by the root travels back down the tree.
    pub fn scatter_down(&mut self) {
        self.leaf.incident(self.root.reflected());
    }

    /// Reset the state of every node in the circuit.
    pub fn reset(&mut self) {
        self.root.reset();
        self.leaf.reset();
    }
}
