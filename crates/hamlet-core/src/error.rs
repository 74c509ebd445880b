//! Errors raised by engine operations.
//!
//! Ordinary "can't do that right now" outcomes are not errors; they come
//! back as `Blocked` values. These variants are unknown entities and
//! broken invariants.

use hamlet_logic::world::HexCoord;
use hecs::Entity;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EconomyError {
    #[error("entity {0:?} is not a building")]
    UnknownBuilding(Entity),
    #[error("unknown building kind '{0}'")]
    UnknownKind(String),
    #[error("building {0:?} is not a processor")]
    NotAProcessor(Entity),
    #[error("tile {0:?} is already occupied")]
    TileOccupied(HexCoord),
    #[error("conversion invariant violated: {0}")]
    ConversionInvariant(String),
    #[error("tool swap left the warehouse inconsistent: {0}")]
    ToolSwapInconsistent(String),
}
