//! Opens the handoff link on the desktop.

use std::process::Command;

use anamnese_core::Navigator;

/// Sends the user to a URL through the system browser, or just prints it.
#[derive(Debug, Clone, Copy)]
pub struct BrowserNavigator {
    open_browser: bool,
}

impl BrowserNavigator {
    pub fn new(open_browser: bool) -> Self {
        Self { open_browser }
    }

    fn open_command(url: &str) -> Command {
        if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            cmd.arg(url);
            cmd
        } else if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", "", url]);
            cmd
        } else {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(url);
            cmd
        }
    }
}

impl Navigator for BrowserNavigator {
    fn navigate(&self, url: &str) {
        println!("WhatsApp: {}", url);
        if !self.open_browser {
            return;
        }

        match Self::open_command(url).status() {
            Ok(status) if status.success() => {}
            Ok(status) => tracing::warn!(%status, "browser exited with an error"),
            Err(e) => tracing::warn!(error = %e, "could not open browser"),
        }
    }
}
