pub mod network;
pub mod scenario;
