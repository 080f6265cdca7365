//! Open a URL in the desktop browser

use std::process::{Command, Stdio};

/// Launcher command for the current platform.
fn launcher(url: &str) -> Command {
    let mut cmd = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(windows) {
        let mut cmd = Command::new("rundll32");
        cmd.arg("url.dll,FileProtocolHandler");
        cmd
    } else {
        Command::new("xdg-open")
    };
    cmd.arg(url);
    cmd
}

/// Spawn the platform launcher without waiting for it. `AH_NO_BROWSER`
/// disables this. Returns whether a launcher was started.
pub fn open(url: &str) -> bool {
    if std::env::var_os("AH_NO_BROWSER").is_some() {
        tracing::debug!("AH_NO_BROWSER set; not opening browser");
        return false;
    }

    match launcher(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Could not open browser");
            false
        }
    }
}
