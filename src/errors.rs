//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`ShadowError`] covers:
//! - Precondition violations at the pool boundary (use before `setup`,
//!   slot counts above capacity, invalid settings)
//! - Graphics-context contract violations (unknown handles, out-of-range
//!   array layers, mismatched clear values)
//! - Errors reported by the GPU backend itself
//!
//! # Usage
//!
//! All fallible APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, ShadowError>`.
//!
//! ```rust,ignore
//! use npr_shadows::errors::Result;
//!
//! fn prepare_shadows() -> Result<()> {
//!     pool.setup(&mut gfx, true)?;
//!     pool.clear(&mut gfx, 1, 1, 0)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::shadows::LightKind;

/// The main error type for shadow-map storage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShadowError {
    // ========================================================================
    // Pool Precondition Errors
    // ========================================================================
    /// An operation that requires allocated storage ran before `setup`.
    #[error("Shadow maps are not configured: `{operation}` called before `setup`")]
    NotConfigured {
        /// The operation that was attempted
        operation: &'static str,
    },

    /// A per-frame light count exceeds the configured capacity.
    #[error("{kind} shadow count {requested} exceeds capacity {capacity}")]
    CapacityExceeded {
        kind: LightKind,
        requested: u32,
        capacity: u32,
    },

    /// `clear` was asked to touch render targets that were never built
    /// (`setup` ran with target creation disabled).
    #[error("No {kind} render targets: `setup` ran without creating them")]
    NoRenderTargets { kind: LightKind },

    /// Resolution, capacity or cascade count is unusable.
    #[error("Invalid shadow settings: {0}")]
    InvalidSettings(String),

    // ========================================================================
    // Graphics Context Errors
    // ========================================================================
    /// The texture handle does not refer to a live texture.
    #[error("Unknown texture handle")]
    UnknownTexture,

    /// The render-target handle does not refer to a live render target.
    #[error("Unknown render target handle")]
    UnknownRenderTarget,

    /// An attachment addresses a layer past the end of its texture.
    #[error("Array layer {layer} out of range for '{label}' ({layer_count} layers)")]
    LayerOutOfRange {
        label: String,
        layer: u32,
        layer_count: u32,
    },

    /// The number of colour clear values differs from the attachment count.
    #[error("Render target has {attachments} colour attachments but {values} clear values were given")]
    ClearValueMismatch { attachments: usize, values: usize },

    /// The clear value kind does not fit the attachment format.
    #[error("Clear value does not match the format of colour attachment {index}")]
    ClearFormatMismatch { index: usize },

    /// Error reported by the GPU backend.
    #[error("GPU error: {0}")]
    Gpu(String),
}

/// Alias for `Result<T, ShadowError>`.
pub type Result<T> = std::result::Result<T, ShadowError>;
