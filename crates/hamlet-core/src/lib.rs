//! Hamlet Core - Village Economy Simulation Engine
//!
//! An ECS-based simulation of a small village economy: producers fill a
//! shared warehouse on a fixed tick, processors convert raw materials into
//! graded goods, and placement on the hex map decides production bonuses.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Placed buildings
//! - **Components**: Pure data attached to entities ([`components::Building`])
//! - **Systems**: Functions over the world, warehouse and event queue
//!
//! Pure rules (capacity tables, synergy, quality, recipes, catalog) live in
//! `hamlet-logic`; this crate owns the mutable state.
//!
//! | Module        | Purpose                                          |
//! |---------------|--------------------------------------------------|
//! | `warehouse`   | Capacity-bounded store with change notifications |
//! | `map`         | Tiles, roads, claimed land and the world view    |
//! | `materials`   | Current grade of processed materials             |
//! | `scheduler`   | Fixed-interval tick clock                        |
//! | `systems`     | Production, conversion, tool swaps, activation   |
//! | `engine`      | [`VillageEngine`](engine::VillageEngine)         |
//! | `persistence` | Binary save/load                                 |
//!
//! # Example
//!
//! ```rust,no_run
//! use hamlet_core::prelude::*;
//! use hamlet_logic::catalog::BuildingCatalog;
//! use hamlet_logic::config::EconomyConfig;
//!
//! let text = std::fs::read_to_string("data/village_catalog.json").unwrap();
//! let catalog = BuildingCatalog::from_json(&text).unwrap();
//! let mut engine = VillageEngine::new(catalog, EconomyConfig::default());
//! engine.spawn_building("lumber_camp", HexCoord::ZERO).unwrap();
//!
//! // Run simulation
//! loop {
//!     engine.update(1.0 / 60.0); // 60 FPS
//!     for event in engine.drain_events() {
//!         println!("{:?}", event);
//!     }
//! }
//! ```

pub mod components;
pub mod engine;
pub mod error;
pub mod map;
pub mod materials;
pub mod persistence;
pub mod scheduler;
pub mod systems;
pub mod warehouse;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::VillageEngine;
    pub use crate::error::EconomyError;
    pub use crate::map::{TileMap, VillageView};
    pub use crate::systems::{
        ActivationOutcome, BlockReason, ConversionOutcome, ConversionPreview, EconomyEvent, TickReport,
        ToolSwapBlock, ToolSwapOutcome,
    };
    pub use crate::warehouse::{InventoryChanged, Warehouse, WarehouseSnapshot};
    pub use hamlet_logic::world::HexCoord;
}
