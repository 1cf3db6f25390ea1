//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies
//!
//! Coordinates are in world units (pixels) with y growing downwards.

pub mod collectibles;
pub mod physics;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod terrain;
pub mod tick;
pub mod vehicle;
pub mod world;

pub use collectibles::{Collectible, CollectibleKind, CollectibleSpawner, Pickups};
pub use physics::{BodyState, PhysicsWorld, SurfaceMaterial};
pub use session::GameSession;
pub use snapshot::{HudStats, Snapshot, VehicleView};
pub use state::{FinalStats, GameEvent, GamePhase, OutcomeKind, SessionOutcome, SessionState};
pub use terrain::TerrainProfile;
pub use tick::{TickInput, tick};
pub use vehicle::{FlipTracker, VehicleController, VehicleState};
pub use world::{TerrainPoint, WorldStreamer};
