pub mod assistant;
pub mod budget;
pub mod health;
pub mod tasks;
