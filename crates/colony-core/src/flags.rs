//! Coarse unit capability markers.
//!
//! A unit's flags decide which specialised processing it is routed to, most
//! notably which navigation graph its path requests are resolved against.

use bitflags::bitflags;

bitflags! {
    /// Capability bitmask attached to an entity through a flag store.
    #[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct UnitFlags: u32 {
        const CART      = 1 << 0;
        const GATHERER  = 1 << 1;
        const BUILDER   = 1 << 2;
        const CARNIVORE = 1 << 3;
        const HERBIVORE = 1 << 4;
    }
}
