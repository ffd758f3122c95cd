pub mod audit;
pub mod capacity;
pub mod deployment;
pub mod flag_terms;
pub mod red_flags;
pub mod resources;
pub mod risk_score;
pub mod velocity;
