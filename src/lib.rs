//! # ropeline
//!
//! A rope chain simulated on the GPU that chases the pointer and is drawn as
//! a constant-width ribbon.
//!
//! The chain lives in a 1×N floating point texture, one texel per point.
//! Every frame a compute pass moves the head toward the pointer (or along an
//! idle path while no button is held), smooths every other point against its
//! neighbors and re-projects it to a fixed distance from its predecessor.
//! A render pass then expands the chain into a triangle strip.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ropeline::prelude::*;
//!
//! fn main() -> Result<(), ChainError> {
//!     let config = ChainConfig::default()
//!         .with_point_count(201)
//!         .with_color(ColorLaw::Parametric);
//!     Simulation::new(config).run()
//! }
//! ```
//!
//! ## Headless
//!
//! [`ChainSolver`] runs the same step on the CPU, which is what the tests
//! and benchmarks use:
//!
//! ```
//! use ropeline::{ChainConfig, ChainSolver, StepInput};
//! use ropeline::input::{PointerState, Viewport};
//!
//! let mut solver = ChainSolver::new(ChainConfig::default().with_seed(7));
//! solver.step(&StepInput {
//!     pointer: PointerState::default(),
//!     viewport: Viewport::new(800, 600),
//!     time: 0.0,
//! });
//! assert_eq!(solver.frame(), 1);
//! ```
//!
//! ## Controls
//!
//! | Input | Effect |
//! |-------|--------|
//! | Left button held | Head chases the pointer |
//! | `D` | Toggle the raw state strip |
//! | `Space` | Pause / resume |
//! | `Escape` | Quit |

pub mod chain;
pub mod config;
pub mod error;
mod gpu;
pub mod input;
pub mod ribbon;
mod simulation;
pub mod state;
pub mod time;
pub mod uniforms;

pub use chain::{ChainSolver, StepInput};
pub use config::{
    ChainConfig, ColorLaw, CorrectionSign, ForwardBlend, ForwardProjection, IdleMotion, TangentEstimate,
};
pub use error::{ChainError, GpuError};
pub use glam::{Vec2, Vec4};
pub use simulation::Simulation;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::chain::{ChainSolver, StepInput};
    pub use crate::config::{
        ChainConfig, ColorLaw, CorrectionSign, ForwardBlend, ForwardProjection, IdleMotion,
        TangentEstimate,
    };
    pub use crate::error::ChainError;
    pub use crate::input::{PointerState, Viewport};
    pub use crate::simulation::Simulation;
    pub use crate::time::FrameClock;
    pub use crate::{Vec2, Vec4};
}
