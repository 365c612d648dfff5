//! Vellum Core Types and Definitions
//!
//! This crate provides the foundational types for the Vellum diagram
//! library. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Symbols**: The glyph registry mapping category/name pairs to visual
//!   accents ([`symbol`] module)
//! - **Draw**: Backend-neutral draw commands and render layers ([`draw`] module)

pub mod color;
pub mod draw;
pub mod geometry;
pub mod identifier;
pub mod symbol;
