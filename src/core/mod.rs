mod engine;
mod solver;
mod types;

pub use engine::project;
pub use solver::required_contribution;
pub use types::{EngineError, GoalResult, MonthSnapshot, SimulationParameters};
