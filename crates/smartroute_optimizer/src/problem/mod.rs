pub mod coordinate;
pub mod kilometers;
pub mod order;
pub mod route;
pub mod route_config;
