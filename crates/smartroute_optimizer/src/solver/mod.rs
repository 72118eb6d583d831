pub mod fleet;
pub mod job_id_map;
pub mod merge;
pub mod orchestrator;
pub mod request;
pub mod response;
pub mod settings;
