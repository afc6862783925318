//! Driver configuration.

use crate::base::Location;

pub use crate::repository::InterpolationOrder;

/// Settings for one [`Driver`](super::Driver).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DriverOptions {
    /// Emit a `trace` event for every reduction.
    pub trace: bool,
    /// Where an all-constant result of an unconstrained parse is broadcast.
    pub default_location: Location,
    /// How foreign-mesh fields are mapped onto this mesh.
    pub interpolation_order: InterpolationOrder,
    /// Seed of the generator behind `rand()` and of the fixed-seed variants.
    pub random_seed: u64,
    /// Value of `cpu()`.
    pub processor_id: u32,
    /// Propagate and check physical dimensions.
    pub check_dimensions: bool,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            trace: false,
            default_location: Location::Volume,
            interpolation_order: InterpolationOrder::default(),
            random_seed: 0,
            processor_id: 0,
            check_dimensions: true,
        }
    }
}

impl DriverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_default_location(mut self, location: Location) -> Self {
        self.default_location = location;
        self
    }

    pub fn with_interpolation_order(mut self, order: InterpolationOrder) -> Self {
        self.interpolation_order = order;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    pub fn with_processor_id(mut self, id: u32) -> Self {
        self.processor_id = id;
        self
    }

    pub fn with_check_dimensions(mut self, check: bool) -> Self {
        self.check_dimensions = check;
        self
    }
}
