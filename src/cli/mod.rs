pub mod board;
pub mod setup;
pub mod ui;
pub mod watch;
