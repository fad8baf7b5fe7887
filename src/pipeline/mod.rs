//! Pipeline stages for notebook translation.
//!
//! Each submodule implements one piece of the per-cell walk.
//!
//! ## Data Flow
//!
//! ```text
//!              ┌─▶ markdown ──▶ image ──▶ encode ──▶ gateway
//! router ──────┤
//!              └─▶ code ──────────────────────────▶ gateway
//! ```
//!
//! 1. [`router`]: picks the next step and passes unsupported cells through
//! 2. [`markdown`]: splits a markdown cell into sections, describes images,
//!    appends translations
//! 3. [`image`]: turns an image reference into bytes (data URI, URL, path)
//! 4. [`encode`]: sniffs and base64-wraps image bytes for the request body
//! 5. [`code`]: asks for comments and strips fences from the reply
//! 6. [`gateway`]: the only stage that talks to the language model

pub mod code;
pub mod encode;
pub mod gateway;
pub mod image;
pub mod markdown;
pub mod router;
