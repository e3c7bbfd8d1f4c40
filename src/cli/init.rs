use crate::error::{ReportError, Result};
use crate::settings::{save_settings, settings_path, Settings};

pub fn run(force: bool) -> Result<()> {
    let path = settings_path();
    if path.exists() && !force {
        return Err(ReportError::Settings(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    save_settings(&Settings::default(), &path)?;
    println!("Wrote default settings to {}", path.display());
    Ok(())
}
