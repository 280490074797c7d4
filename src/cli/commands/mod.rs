pub mod audit;
mod command_result;
pub mod helper;
pub mod init;
pub mod rename;
pub mod scan;
pub mod sync;
pub mod transform;

pub use command_result::*;
