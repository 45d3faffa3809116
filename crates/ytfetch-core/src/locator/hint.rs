//! Installation hints shown when ffmpeg is missing.

use super::search::BinarySearch;

/// Platform-specific instructions for installing ffmpeg.
pub fn install_hint() -> String {
    if cfg!(target_os = "macos") {
        let has_brew = BinarySearch::from_env("brew").find().is_some();
        macos_hint(has_brew)
    } else if cfg!(target_os = "linux") {
        linux_hint()
    } else {
        other_hint()
    }
}

fn macos_hint(has_brew: bool) -> String {
    let cmd = "brew install ffmpeg";
    if has_brew {
        cmd.to_string()
    } else {
        format!("First install Homebrew from https://brew.sh, then run: {cmd}")
    }
}

fn linux_hint() -> String {
    "sudo apt-get install ffmpeg  # For Ubuntu/Debian\nsudo dnf install ffmpeg  # For Fedora".to_string()
}

fn other_hint() -> String {
    "Download from https://ffmpeg.org/download.html".to_string()
}
