pub mod daemon;
pub mod shutdown;
pub mod updater;
