pub mod assessment;
pub mod audit;
pub mod capacity;
pub mod deployment;
pub mod document;
pub mod history;
pub mod plan;
pub mod red_flag;
pub mod resource;
pub mod risk_score;
pub mod velocity;
pub mod workspace;
