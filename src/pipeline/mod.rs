//! The lecture-generation pipeline stages.
//!
//! Stages run strictly in sequence; each consumes the previous stage's
//! artifact and writes its own into the request's [`crate::workspace`]:
//!
//! ```text
//! extract ─► refine ─► outline ─► narration
//!                         │           │
//!                         ▼           ▼
//!                       deck ─►    speech
//!                       slides        │
//!                         └─────┬─────┘
//!                               ▼
//!                           assemble
//! ```
//!
//! Orchestration, timing, and the cross-stage count checks live in
//! [`crate::generate`].

pub mod assemble;
pub mod deck;
pub mod extract;
pub mod media;
pub mod narration;
pub mod outline;
pub mod refine;
pub mod slides;
pub mod speech;
