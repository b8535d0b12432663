//! Opening resource locators on the user's machine

use std::io;
use std::process::Command;

/// Opens a URL outside the app
pub trait ResourceOpener: Send + Sync {
    fn open(&self, url: &str) -> io::Result<()>;
}

/// Hands URLs to the platform's default handler
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl ResourceOpener for SystemOpener {
    fn open(&self, url: &str) -> io::Result<()> {
        let mut command = if cfg!(target_os = "macos") {
            let mut c = Command::new("open");
            c.arg(url);
            c
        } else if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", "", url]);
            c
        } else {
            let mut c = Command::new("xdg-open");
            c.arg(url);
            c
        };

        command.spawn().map(|_| ())
    }
}
