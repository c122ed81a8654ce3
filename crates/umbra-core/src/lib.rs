//! Umbra Core - Shared types for the Umbra viewer
//!
//! This crate provides the small set of types every other crate agrees on:
//! - Mathematical primitives (re-exported from glam)
//! - Model placement (`Transform`)
//! - RGBA tint colors

pub mod types;

pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
pub use types::{Color, Transform};
