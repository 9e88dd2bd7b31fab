pub mod engine;
pub mod statistical;

pub use engine::MetricsEngine;
pub use statistical::EffectSizeInterpretation;
