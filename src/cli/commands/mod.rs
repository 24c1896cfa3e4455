pub mod cnp;
pub mod db;
pub mod server;
pub mod token;
