pub mod assessment;
pub mod compare;
pub mod db;
pub mod settings;
pub mod workspace;
