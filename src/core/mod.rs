/// Type conversion of raw cells into record fields.
pub mod coerce;

/// Column to field index resolution.
pub mod index;

/// Item-at-a-time reader abstraction.
pub mod item;

/// Record shape descriptors.
pub mod record;
