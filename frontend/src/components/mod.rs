pub mod forms;
pub mod handlers;
pub mod harness;
pub mod header;
pub mod results;
pub mod statistics;
pub mod utils;
