mod settings;

pub use settings::{SETTINGS_FILENAME, SETTINGS_TEMPLATE, Settings, VcsSettings};
