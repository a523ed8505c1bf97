use std::time::Duration;

use log::{info, warn};
use ratatui_image::picker::{Capability, Picker, ProtocolType, cap_parser::QueryStdioOptions};

/// Environment hints about the terminal hosting us.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TerminalHints {
    pub kitty_window: bool,
    pub xterm_kitty: bool,
    pub iterm: bool,
    pub tmux: bool,
}

impl TerminalHints {
    pub fn from_env() -> Self {
        let non_empty = |key: &str| {
            std::env::var(key)
                .ok()
                .is_some_and(|value| !value.trim().is_empty())
        };
        let contains = |key: &str, needle: &str| {
            std::env::var(key)
                .ok()
                .is_some_and(|value| value.contains(needle))
        };
        Self {
            kitty_window: non_empty("KITTY_WINDOW_ID"),
            // TERM survives ssh, KITTY_WINDOW_ID does not.
            xterm_kitty: std::env::var("TERM")
                .ok()
                .is_some_and(|term| term.trim().starts_with("xterm-kitty")),
            iterm: non_empty("ITERM_SESSION_ID")
                || contains("TERM_PROGRAM", "iTerm")
                || contains("LC_TERMINAL", "iTerm"),
            tmux: std::env::var_os("TMUX").is_some(),
        }
    }

    fn graphics_likely(&self) -> bool {
        self.kitty_window || self.xterm_kitty || self.iterm
    }

    /// Querying stdio stalls on terminals that never answer, so only ask when hinted.
    pub fn should_query(&self) -> bool {
        self.graphics_likely() || self.tmux
    }

    pub fn query_timeout(&self) -> Duration {
        if self.graphics_likely() {
            Duration::from_millis(1500)
        } else if self.tmux {
            Duration::from_millis(300)
        } else {
            Duration::ZERO
        }
    }

    pub fn kitty_supported(&self, capabilities: &[Capability]) -> bool {
        if self.iterm {
            return false;
        }
        self.kitty_window
            || capabilities
                .iter()
                .any(|cap| matches!(cap, Capability::Kitty))
    }
}

/// Picks the best image protocol the terminal offers, falling back to halfblocks.
pub(crate) fn detect_picker() -> Picker {
    let hints = TerminalHints::from_env();
    if hints.tmux {
        allow_tmux_passthrough();
    }

    let mut picker = if hints.should_query() {
        let options = QueryStdioOptions {
            timeout: hints.query_timeout(),
            text_sizing_protocol: false,
        };
        Picker::from_query_stdio_with_options(options).unwrap_or_else(|err| {
            warn!("terminal graphics query failed: {err:?}");
            Picker::halfblocks()
        })
    } else {
        Picker::halfblocks()
    };
    picker.set_background_color(image::Rgba([0u8, 0u8, 0u8, 255u8]));
    if hints.kitty_supported(picker.capabilities()) {
        picker.set_protocol_type(ProtocolType::Kitty);
    }
    info!(
        "image protocol {} ({hints:?})",
        protocol_label(picker.protocol_type())
    );
    picker
}

// Kitty graphics inside tmux need passthrough; failures are ignored.
fn allow_tmux_passthrough() {
    let _ = std::process::Command::new("tmux")
        .args(["set-option", "-g", "allow-passthrough", "on"])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status();
}

pub(crate) fn protocol_label(protocol: ProtocolType) -> &'static str {
    match protocol {
        ProtocolType::Halfblocks => "halfblocks",
        ProtocolType::Sixel => "sixel",
        ProtocolType::Kitty => "kitty",
        ProtocolType::Iterm2 => "iterm2",
    }
}
