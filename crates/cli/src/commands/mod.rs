//! CLI command implementations.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod filter;
pub mod shell;

use std::path::Path;

use till_register::catalog::Catalog;
use till_register::config::RegisterConfig;
use till_register::session::SalesSession;
use till_register::storage::FileStore;
use tracing::info;

/// Load configuration and the catalog, and restore the saved session.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the catalog file cannot
/// be loaded, or the storage file cannot be read.
pub fn open_session(catalog: Option<&Path>) -> till_register::Result<SalesSession<FileStore>> {
    let config = RegisterConfig::from_env()?;

    let catalog = match catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin(),
    };

    let store = FileStore::open(&config.storage_path)?;
    Ok(SalesSession::open(config, catalog, store))
}

/// Erase all saved register state.
///
/// # Errors
///
/// Returns an error if the storage file cannot be removed.
pub fn reset(session: &mut SalesSession<FileStore>) -> till_register::Result<()> {
    session.reset()?;
    info!(path = %session.store().path().display(), "Saved state erased");
    crate::output::notice(&till_register::notice::Notice::info("Register reset."));
    Ok(())
}
