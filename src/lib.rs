pub mod carousel;
pub mod cli;
pub mod io;
pub mod model;
pub mod ops;
pub mod session;
pub mod store;
pub mod tui;
