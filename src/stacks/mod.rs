//! Stacks and the cards placed in them.
//!
//! ## Key Types
//!
//! - `Stack`: a named pile at a grid position, communal or owned, maybe a hand
//! - `StackCard`: one catalog card in a stack, with order and overrides
//! - `CardMeta`: physical attributes shared by both
//! - `StackManager`: placement, ordering and the dense-order invariant
//! - `StackPosition` / `Selection` / `Destination`: how cards are picked and placed

pub mod manager;
pub mod meta;
pub mod stack;
pub mod stack_card;

pub use manager::{Destination, Selection, StackManager, StackPosition};
pub use meta::{CardMeta, Facing, Orientation, TokenSet, TokenTarget};
pub use stack::{NewStack, Stack, STACK_NAME_MAX};
pub use stack_card::StackCard;
