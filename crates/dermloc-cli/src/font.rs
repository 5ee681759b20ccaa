//! `font` command handlers.

use clap::Subcommand;
use dermloc_core::{AppConfig, FontPreference, PreferenceStore};

/// Sub-commands available under `font`.
#[derive(Debug, Subcommand)]
pub enum FontCommands {
    /// Show the stored font size
    Show,
    /// Increase the font size by one pixel
    Increase,
    /// Decrease the font size by one pixel
    Decrease,
    /// Set an explicit size (clamped to the allowed range)
    Set {
        #[arg(allow_hyphen_values = true)]
        px: i64,
    },
    /// Restore the default size
    Reset,
}

/// Applies `command` to the stored preference and prints the result.
///
/// # Errors
///
/// Returns an error if the preference file cannot be written.
pub(crate) fn run_font(config: &AppConfig, command: &FontCommands) -> anyhow::Result<()> {
    let store = PreferenceStore::new(config.prefs_path.clone());
    let current = store.load();

    let next = match command {
        FontCommands::Show => {
            println!("{}", current.announcement());
            return Ok(());
        }
        FontCommands::Increase => current.increase(),
        FontCommands::Decrease => current.decrease(),
        FontCommands::Set { px } => FontPreference::new(*px),
        FontCommands::Reset => FontPreference::default(),
    };

    store.save(next)?;
    tracing::debug!(path = %store.path().display(), px = next.font_size_px(), "saved font preference");
    println!("{}", next.announcement());
    Ok(())
}
