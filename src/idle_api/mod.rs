//! Reads how long the user has been idle from the OS. This is how the companion learns about
//! keyboard and mouse input without hooking into the input devices itself.
//! [GenericIdleProbe] picks the implementation enabled through cargo features.

#[cfg(feature = "win")]
pub mod win;
#[cfg(feature = "x11")]
pub mod x11;

#[cfg(feature = "win")]
extern crate windows;

#[cfg(feature = "x11")]
extern crate xcb;

use std::time::Duration;

use anyhow::Result;

/// Contract windows and linux idle sources must implement.
#[cfg_attr(test, mockall::automock)]
pub trait IdleProbe {
    /// Time since the last keyboard or mouse input anywhere in the session.
    fn idle_time(&mut self) -> Result<Duration>;
}

/// Serves as a cross-compatible [IdleProbe] implementation.
pub struct GenericIdleProbe {
    inner: Box<dyn IdleProbe>,
}

impl GenericIdleProbe {
    /// Fails when the platform source can't be opened or no source was compiled in. Callers
    /// are expected to keep running without activity tracking in that case.
    pub fn new() -> Result<Self> {
        cfg_if::cfg_if! {
            if #[cfg(feature = "win")] {
                use win::WindowsIdleProbe;
                Ok(Self {
                    inner: Box::new(WindowsIdleProbe::new()),
                })
            }
            else if #[cfg(feature = "x11")] {
                use x11::LinuxIdleProbe;
                Ok(Self {
                    inner: Box::new(LinuxIdleProbe::new()?),
                })
            }
            else {
                Err(anyhow::anyhow!(
                    "No idle time source was compiled in, enable the `x11` or `win` feature"
                ))
            }
        }
    }
}

impl IdleProbe for GenericIdleProbe {
    fn idle_time(&mut self) -> Result<Duration> {
        self.inner.idle_time()
    }
}
