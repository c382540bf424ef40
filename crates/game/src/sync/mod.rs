mod backend;
mod client;
mod config;
mod hooks;
mod input;
mod interpolation;
mod mode;
mod prediction;
mod replay;

pub use backend::{NetworkSender, RenderFrame, Renderer};
pub use client::{SyncClient, SyncStats};
pub use config::SyncConfig;
pub use hooks::{HookContext, HookFn, HookRegistry, HookToken};
pub use input::InputSequencer;
pub use interpolation::{
    Bracket, InterpolationEngine, InterpolationStats, InterpolationTargets, blend_factor,
    find_bracket,
};
pub use mode::SyncMode;
pub use prediction::{ClientPrediction, Reconciliation, reconcile};
pub use replay::{Spawn, collect_spawns};
