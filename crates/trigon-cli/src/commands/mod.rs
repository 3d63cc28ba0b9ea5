//! Command implementations.

pub mod calibrate;
pub mod history;
pub mod import;
pub mod init;
pub mod play;

pub use self::calibrate::execute_calibrate;
pub use self::history::execute_history;
pub use self::import::execute_import;
pub use self::init::execute_init;
pub use self::play::execute_play;
