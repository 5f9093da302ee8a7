// Public modules
pub mod time;
