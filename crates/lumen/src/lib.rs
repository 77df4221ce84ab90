//! # LUMEN
//!
//! Frame-driven engine: a task scheduler, a UI node tree and a
//! prepare/consume render pipeline on one timeline.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                              LUMEN ENGINE                            │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │                                                                      │
//! │  ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────┐  │
//! │  │   lumen_core     │   │    lumen_ui      │   │ lumen_rendering  │  │
//! │  │                  │   │                  │   │                  │  │
//! │  │  • FrameClock    │──>│  • NodeTree      │──>│  • Camera        │  │
//! │  │  • Scheduler     │   │  • Lazy images   │   │  • Draw pool     │  │
//! │  │  • ObjectPool    │   │  • Interaction   │   │  • FrameConsumer │  │
//! │  └──────────────────┘   └──────────────────┘   └──────────────────┘  │
//! │            ▲                                             │           │
//! │            └──────────── Engine::frame() ────────────────┘           │
//! │                                                                      │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use lumen::{Engine, EngineConfig, NoPhysics};
//! use lumen::core::ManualTimeSource;
//! use lumen::ui::InputState;
//!
//! let source = ManualTimeSource::new();
//! let mut engine = Engine::init(EngineConfig::default(), source.clone()).unwrap();
//!
//! let handle = engine.scheduler().schedule_next_frame(|| Ok(42));
//! source.advance(Duration::from_millis(16));
//! engine.frame(&InputState::new(), &mut NoPhysics);
//! assert_eq!(handle.take(), Some(Ok(42)));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod engine;
pub mod error;
pub mod physics;

pub use lumen_core as core;
pub use lumen_rendering as rendering;
pub use lumen_ui as ui;

pub use config::{EngineConfig, ViewportConfig};
pub use engine::{Engine, EngineContext, FrameStats, FrameStatsAccumulator};
pub use error::{EngineError, EngineResult};
pub use physics::{NoPhysics, PhysicsStep};
