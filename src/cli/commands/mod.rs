mod command_result;
pub mod init;
pub mod languages;
pub mod scan;

pub use command_result::*;
