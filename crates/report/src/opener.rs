// Copyright 2025 devperf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Opening a generated report in the user's browser.

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

/// Something that can show a file to the user.
#[cfg_attr(test, mockall::automock)]
pub trait Opener {
    /// Open `path`. Returns once the viewer has been launched.
    fn open(&self, path: &Path) -> io::Result<()>;
}

/// Opens files with the platform's default handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl SystemOpener {
    fn command(path: &Path) -> Command {
        if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]).arg(path);
            cmd
        } else if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            cmd.arg(path);
            cmd
        } else {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(path);
            cmd
        }
    }
}

impl Opener for SystemOpener {
    fn open(&self, path: &Path) -> io::Result<()> {
        Self::command(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(())
    }
}
