//! Shared types for the whittle source splitter.
//!
//! Everything downstream crates agree on lives here: byte [`span::Span`]s,
//! shared [`text::SourceText`] buffers and the [`text::Text`] slices cut
//! from them, the D token vocabulary in [`token`], and the [`entity::Tree`]
//! arena that the splitter produces and the reducer consumes.

pub mod entity;
pub mod span;
pub mod text;
pub mod token;

pub use entity::{EntityData, EntityId, Tree};
pub use span::Span;
pub use text::{SourceText, Text};
pub use token::{SeparatorKind, TokenKind};
