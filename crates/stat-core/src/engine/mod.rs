//! Máquina de estados del workflow: estado explícito + motor de transiciones.

pub mod builder;
pub mod core;
pub mod state;

pub use builder::EngineBuilder;
pub use core::WorkflowEngine;
pub use state::{TipStatus, WorkflowState};
