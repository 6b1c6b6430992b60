pub mod clock;
pub mod dir;
pub mod happiness;
pub mod logging;
pub mod runtime;
