//! Copies rendered PNGs to the system clipboard through the platform's
//! command line tools.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use tempfile::NamedTempFile;

use crate::error::{Error, Result};

fn temp_png(png: &[u8]) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("code-picture-")
        .suffix(".png")
        .tempfile()?;
    file.write_all(png)?;
    file.flush()?;
    Ok(file)
}

/// Command that loads the PNG at `path` into the clipboard. The flag is set
/// when the command reads the image from stdin instead.
fn clipboard_command(path: &Path) -> (Command, bool) {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("osascript");
        cmd.arg("-e").arg(format!(
            "set the clipboard to (read (POSIX file \"{}\") as «class PNGf»)",
            path.display()
        ));
        (cmd, false)
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("powershell");
        cmd.arg("-command")
            .arg(format!("Set-Clipboard -Path '{}'", path.display()));
        (cmd, false)
    } else if std::env::var_os("WAYLAND_DISPLAY").is_some() {
        let mut cmd = Command::new("wl-copy");
        cmd.args(["--type", "image/png"]);
        (cmd, true)
    } else {
        let mut cmd = Command::new("xclip");
        cmd.args(["-selection", "clipboard", "-t", "image/png", "-i"])
            .arg(path);
        (cmd, false)
    }
}

/// Places a PNG on the clipboard. The temporary file is removed when the
/// copy finishes, successful or not.
pub fn copy_png_to_clipboard(png: &[u8]) -> Result<()> {
    let file = temp_png(png)?;
    let (cmd, pipe_stdin) = clipboard_command(file.path());
    run_clipboard_command(cmd, pipe_stdin, png)
}

fn run_clipboard_command(mut cmd: Command, pipe_stdin: bool, png: &[u8]) -> Result<()> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    log::debug!("copying image with {}", program);

    let spawn_error = |e: std::io::Error| Error::Clipboard(format!("Failed to run {}: {}", program, e));

    let output = if pipe_stdin {
        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        // stdin is closed at the end of this block so the child sees EOF.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(png),
            None => Ok(()),
        };
        let output = child.wait_with_output().map_err(spawn_error)?;

        if let Err(e) = written {
            return Err(Error::Clipboard(format!(
                "Failed to send image to {}: {}",
                program, e
            )));
        }
        output
    } else {
        cmd.output().map_err(spawn_error)?
    };

    if output.status.success() {
        Ok(())
    } else {
        Err(Error::Clipboard(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }
}
