use std::time::Duration;

use anyhow::{anyhow, Result};
use tracing::error;
use windows::Win32::{
    System::SystemInformation::GetTickCount64,
    UI::Input::KeyboardAndMouse::{GetLastInputInfo, LASTINPUTINFO},
};

use super::IdleProbe;

pub fn get_idle_time() -> Result<Duration> {
    let mut last: LASTINPUTINFO = LASTINPUTINFO {
        cbSize: std::mem::size_of::<LASTINPUTINFO>() as u32,
        dwTime: 0,
    };
    let is_success = unsafe { GetLastInputInfo(&mut last) };
    if !is_success.as_bool() {
        return Err(anyhow!("Failed to retrieve user idle time"));
    }

    // dwTime is a 32 bit tick count, so it wraps around every ~49 days.
    let tick_count = unsafe { GetTickCount64() } as u32;
    Ok(Duration::from_millis(
        tick_count.wrapping_sub(last.dwTime) as u64,
    ))
}

pub struct WindowsIdleProbe {}

impl WindowsIdleProbe {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for WindowsIdleProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl IdleProbe for WindowsIdleProbe {
    fn idle_time(&mut self) -> Result<Duration> {
        get_idle_time().inspect_err(|e| error!("Failed to get idle time {e:?}"))
    }
}
