//! Collision layers and layer masks

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single collision layer (0..=31).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Layer(u8);

impl Layer {
    pub const DEFAULT: Layer = Layer(0);
    /// Number of addressable layers.
    pub const COUNT: u8 = 32;

    /// Create a layer, returning `None` when the index is out of range.
    pub const fn new(index: u8) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Const constructor for named layers. Panics (at compile time in const
    /// contexts) when the index is out of range.
    pub const fn from_index(index: u8) -> Self {
        assert!(index < Self::COUNT, "layer index out of range");
        Self(index)
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    /// The single-bit mask for this layer.
    pub const fn mask(self) -> LayerMask {
        LayerMask(1 << self.0)
    }
}

/// A set of layers stored as a 32-bit mask.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Mask containing every layer in `layers`.
    pub fn of(layers: &[Layer]) -> Self {
        layers.iter().fold(Self::NONE, |mask, layer| mask.with(*layer))
    }

    pub const fn with(self, layer: Layer) -> Self {
        Self(self.0 | (1 << layer.0))
    }

    /// Bitmask membership test.
    pub const fn contains(self, layer: Layer) -> bool {
        self.0 & (1 << layer.0) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate over the layers in this mask, lowest first.
    pub fn layers(self) -> impl Iterator<Item = Layer> {
        (0..Layer::COUNT)
            .map(Layer)
            .filter(move |layer| self.contains(*layer))
    }
}

impl fmt::Debug for LayerMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.layers().map(|layer| layer.index()))
            .finish()
    }
}

impl From<Layer> for LayerMask {
    fn from(layer: Layer) -> Self {
        layer.mask()
    }
}
