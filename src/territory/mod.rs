//! Territory partition: moving, audio-weighted seed sites that split the plane.
//!
//! Every point belongs to the site minimizing `distance / weight`
//! (a multiplicatively weighted Voronoi diagram). Sites drift through a
//! simplex noise field and swell with the energy of their assigned band.

mod partition;
mod site;

// Re-export public types
pub use partition::TerritoryPartition;
pub use site::{create_sites, create_sites_from, SeedSite, SiteId};
