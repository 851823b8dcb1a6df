//! Pipeline stages for batch PDF-to-Markdown conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different rendering backend) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! fetch ──▶ render ──▶ images ──▶ normalize ──▶ verify
//! (URL/path) (engine)  (save+fix)  (cleanup)    (check refs)
//! ```
//!
//! 1. [`fetch`]     — bring the source PDF to a local temp file
//! 2. [`images`]    — persist extracted image payloads and rewrite the
//!    `![](…)` placeholders the renderer left behind
//! 3. [`normalize`] — deterministic text-cleanup rules that shrink the
//!    Markdown without changing what it renders as
//! 4. [`verify`]    — confirm every image reference resolves on disk
//! 5. [`backup`]    — timestamped copy taken before any in-place rewrite

pub mod backup;
pub mod fetch;
pub mod images;
pub mod normalize;
pub mod verify;
