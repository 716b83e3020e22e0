pub mod loader;
pub mod probe;
pub mod resolver;
pub mod table;
pub mod throttle;
