use std::path::PathBuf;

use dolist_types::pagination::{DEFAULT_PER_PAGE, MAX_PER_PAGE};

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub mail_from: String,
    pub page_size: u32,
}

impl Config {
    /// Reads `DOLIST_*` variables. Call after `.env` has been loaded.
    pub fn from_env() -> anyhow::Result<Self> {
        let db_path: PathBuf = std::env::var("DOLIST_DB_PATH")
            .unwrap_or_else(|_| "dolist.db".into())
            .into();
        let mail_from =
            std::env::var("DOLIST_MAIL_FROM").unwrap_or_else(|_| "dolist@localhost".into());
        let page_size = match std::env::var("DOLIST_PAGE_SIZE") {
            Ok(v) => parse_page_size(&v)?,
            Err(_) => DEFAULT_PER_PAGE,
        };

        Ok(Self {
            db_path,
            mail_from,
            page_size,
        })
    }
}

fn parse_page_size(value: &str) -> anyhow::Result<u32> {
    let size: u32 = value
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("DOLIST_PAGE_SIZE '{}' is not a number: {}", value, e))?;
    Ok(size.clamp(1, MAX_PER_PAGE))
}
