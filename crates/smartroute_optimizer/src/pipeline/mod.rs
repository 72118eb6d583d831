pub mod cancel;
pub mod geocode_stage;
pub mod planner;
