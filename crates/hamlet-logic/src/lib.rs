//! Pure economy rules for Hamlet.
//!
//! This crate contains all village economy logic that is independent of any
//! ECS, engine, or runtime. Functions take plain data and return results,
//! making them unit-testable and usable from the simulation engine, the
//! headless harness, and any future front end.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`capacity`] | Warehouse capacity, active slots and tile capacity by level |
//! | [`catalog`] | Building kind definitions loaded from JSON |
//! | [`config`] | Economy tunables (tick interval, catch-up, synergy globals) |
//! | [`constants`] | Resource ids, tile tags and building kind ids |
//! | [`district`] | Terrain-composition bonus over owned tiles |
//! | [`quality`] | Material quality transfer through processor tools |
//! | [`recipe`] | Multi-input processor recipes |
//! | [`resource`] | Resource ids, stacks and the identifier table |
//! | [`synergy`] | Conditional production bonuses with stacking and clamp |
//! | [`tools`] | Static tool catalog (slot type and quality per tool) |
//! | [`world`] | Tiles, terrain and the spatial query capability |

pub mod capacity;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod district;
pub mod quality;
pub mod recipe;
pub mod resource;
pub mod synergy;
pub mod tools;
pub mod world;
