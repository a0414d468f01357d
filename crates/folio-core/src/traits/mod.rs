// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the outbox dispatcher and its collaborators.
//!
//! All async traits use `#[async_trait]` so they can be held as trait objects.

pub mod delivery;
pub mod outbox;

pub use delivery::{KindHandler, KindResolver};
pub use outbox::OutboxStore;
