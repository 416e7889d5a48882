use crate::error::RenderError;
use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};
use std::thread::{self, JoinHandle};

#[cfg(target_os = "macos")]
fn viewer_command(path: &Path) -> Command {
    let mut command = Command::new("open");
    command.arg(path);
    command
}

#[cfg(target_os = "windows")]
fn viewer_command(path: &Path) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", ""]).arg(path);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn viewer_command(path: &Path) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(path);
    command
}

/// Hands a written document to the platform's default viewer without waiting for it.
pub fn open_in_viewer(path: &Path) -> Result<(), RenderError> {
    launch(viewer_command(path))
        .map(|_| ())
        .map_err(|source| RenderError::Viewer {
            path: path.to_path_buf(),
            source,
        })
}

/// Spawns the opener and reaps it on a background thread so it never lingers as a
/// zombie.
fn launch(mut command: Command) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = command.spawn()?;
    Ok(thread::spawn(move || child.wait()))
}
