use std::time::Duration;

use anyhow::{anyhow, Result};
use tracing::instrument;
use xcb::{
    screensaver::{QueryInfo, QueryInfoReply},
    x::{Drawable, Window},
    Connection,
};

use super::IdleProbe;

/// Uses the screensaver extension, which tracks input for the whole X session.
pub struct LinuxIdleProbe {
    connection: Connection,
    root: Window,
}

impl LinuxIdleProbe {
    pub fn new() -> Result<Self> {
        let (connection, preferred_screen) =
            Connection::connect_with_extensions(None, &[xcb::Extension::ScreenSaver], &[])?;
        // Currently only 1 x11 screen is supported.
        let root = connection
            .get_setup()
            .roots()
            .nth(preferred_screen.max(0) as usize)
            .ok_or_else(|| anyhow!("X server has no screen {preferred_screen}"))?
            .root();
        Ok(Self { connection, root })
    }
}

impl IdleProbe for LinuxIdleProbe {
    #[instrument(skip(self))]
    fn idle_time(&mut self) -> Result<Duration> {
        let idle = self.connection.send_request(&QueryInfo {
            drawable: Drawable::Window(self.root),
        });
        let reply: QueryInfoReply = self.connection.wait_for_reply(idle)?;
        Ok(Duration::from_millis(reply.ms_since_user_input() as u64))
    }
}
