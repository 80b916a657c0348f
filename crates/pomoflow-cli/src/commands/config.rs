use clap::Subcommand;
use pomoflow_core::{SettingsStore, TimerSettings, TomlSettingsStore};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the full configuration as TOML
    Show,
    /// Get a value by dot-separated key (e.g. durations.pomodoro)
    Get { key: String },
    /// Set a value by dot-separated key
    Set { key: String, value: String },
    /// Restore the default configuration
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = TomlSettingsStore::open_default()?;
    let mut settings = store.load();

    match action {
        ConfigAction::Show => print!("{}", toml::to_string_pretty(&settings)?),
        ConfigAction::Get { key } => match settings.get(&key) {
            Some(value) => println!("{value}"),
            None => return Err(format!("unknown config key: {key}").into()),
        },
        ConfigAction::Set { key, value } => {
            settings.set(&key, &value)?;
            store.save(&settings)?;
            println!("{key} = {}", settings.get(&key).unwrap_or(value));
        }
        ConfigAction::Reset => {
            settings = TimerSettings::default();
            store.save(&settings)?;
            println!("configuration reset to defaults");
        }
    }
    Ok(())
}
