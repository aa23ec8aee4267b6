pub mod serve;
pub mod setup;
pub mod verify;
