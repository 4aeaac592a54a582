pub mod agent;
pub mod state;
