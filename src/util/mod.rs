//! Shared utilities: logging, text rendering.

use tracing::Level;

/// Initialize tracing with env filter. Safe to call once at startup.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Fixed-width text gauge of `ammo` out of `max`, e.g. `[#####-----]`.
pub fn ammo_bar(ammo: u32, max: u32, width: usize) -> String {
    let filled = if max == 0 {
        0
    } else {
        ((ammo.min(max) as f64 / max as f64) * width as f64).round() as usize
    };
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ammo_bar_widths() {
        assert_eq!(ammo_bar(0, 300, 10), "[----------]");
        assert_eq!(ammo_bar(150, 300, 10), "[#####-----]");
        assert_eq!(ammo_bar(300, 300, 10), "[##########]");
        assert_eq!(ammo_bar(5, 0, 4), "[----]");
    }
}
