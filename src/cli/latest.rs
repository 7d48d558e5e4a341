//! Locate the newest transcript

use std::error::Error;
use std::path::PathBuf;

use crate::core::config::data::path_display;
use crate::core::config::Settings;
use crate::utils::editor::open_in_pager;
use crate::utils::logging::LogStore;

pub fn latest_log(settings: &Settings) -> Result<PathBuf, Box<dyn Error>> {
    let store = LogStore::new(settings.log_dir());
    store
        .find_latest()?
        .ok_or_else(|| format!("No log files found in {}", path_display(store.dir())).into())
}

pub fn run_latest(settings: &Settings, open: bool) -> Result<(), Box<dyn Error>> {
    let path = latest_log(settings)?;
    if open {
        open_in_pager(&path)
    } else {
        println!("{}", path.display());
        Ok(())
    }
}
