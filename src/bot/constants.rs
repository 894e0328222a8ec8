/// Size ratios used to compare two cells: `a` is dwarfed by `b` when
/// `a.size² * RATIO < b.size²`.
pub mod ratio {
    /// Another cell can eat the agent
    pub const THREAT: f64 = 1.30;
    /// The agent can eat another cell
    pub const EDIBLE: f64 = 1.33;
    /// A hazard (virus) is large enough to matter to the agent
    pub const HAZARD: f64 = 1.2;
    /// Lower bound for a split attack to land
    pub const SPLIT_MIN: f64 = 2.8;
    /// Beyond this the target is so small that splitting is pointless
    pub const SPLIT_MAX: f64 = 20.0;
    /// Anything this small is free food regardless of ratio (ambient pellets)
    pub const FREE_FOOD_SIZE: f64 = 13.0;
}

/// Reach distances around obstacles (arena units)
pub mod reach {
    /// How far a split cell travels
    pub const SPLIT_DISTANCE: f64 = 710.0;
    /// Padding added to every threat reach
    pub const SAFETY_PADDING: f64 = 150.0;
    /// Padding around a hazard larger than the agent
    pub const HAZARD_PADDING: f64 = 10.0;
    /// Padding around a hazard the agent could pop
    pub const HAZARD_POP_PADDING: f64 = 50.0;
    /// Tangent radius is pulled this far inside the distance when the agent is within reach
    pub const TANGENT_CLAMP: f64 = 5.0;
}

/// Navigation constants
pub mod nav {
    /// Distance travelled along the bisector of a free sector
    pub const LOOKAHEAD: f64 = 1672.2;
    /// Walls closer than this produce a blocked half-plane
    pub const WALL_MARGIN: f64 = 2000.0;
    /// Food within `CLUSTER_RADIUS_FACTOR * size` of a cluster joins it
    pub const CLUSTER_RADIUS_FACTOR: f64 = 1.5;
    /// Cluster score = weight * CLUSTER_WEIGHT_FACTOR - distance
    pub const CLUSTER_WEIGHT_FACTOR: f64 = 6.0;
    /// Mass = size² / MASS_DIVISOR
    pub const MASS_DIVISOR: f64 = 100.0;
    /// Minimum mass before following the ally instead of foraging
    pub const ALLY_FOLLOW_MIN_MASS: f64 = 50.0;
    /// Initial destination and remembered ally location
    pub const INITIAL_TARGET: (f64, f64) = (100.0, 100.0);
}

/// Ally feeding constants
pub mod feeding {
    /// Edge distance at which the agent commits to the ally
    pub const CONTACT_DISTANCE: f64 = 50.0;
    /// Ally-seeking gives up after this long without a sighting
    pub const ALLY_TIMEOUT_MS: u64 = 5000;
    /// Upper bound on splits in one feeding burst
    pub const MAX_BURST_SPLITS: u32 = 10;
}

/// Host loop constants
pub mod tick {
    /// Decision period in milliseconds
    pub const INTERVAL_MS: u64 = 100;
}
