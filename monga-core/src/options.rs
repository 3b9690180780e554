//! Execution options shared by every query builder.
//!
//! Each builder carries an [`Options`] record (acknowledgement, fsync and
//! timeout) and exposes it through the [`QueryOptions`] trait. Builders with
//! operation specific flags (`Remove`, `Update`) extend both the option patch
//! they accept and the option document they report.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use bson::{Bson, Document, de::deserialize_from_bson, doc};
use serde::Deserialize;

use crate::error::{MongaError, MongaResult};

static DEFAULT_TIMEOUT_MS: AtomicU64 = AtomicU64::new(30_000);

/// Returns the process-wide default timeout applied to builders without an
/// explicit timeout.
pub fn default_timeout() -> Duration {
    Duration::from_millis(DEFAULT_TIMEOUT_MS.load(Ordering::Relaxed))
}

/// Replaces the process-wide default timeout.
pub fn set_default_timeout(timeout: Duration) {
    DEFAULT_TIMEOUT_MS.store(timeout.as_millis() as u64, Ordering::Relaxed);
}

/// Generic execution options common to all query types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Wait for the server to acknowledge writes (write concern `w: 1`).
    pub safe: bool,
    /// Wait for the write to reach the journal.
    pub fsync: bool,
    /// Timeout in milliseconds, `None` falls back to [`default_timeout`].
    pub timeout: Option<u64>,
}

impl Options {
    /// Acknowledgement level derived from the `safe` flag.
    pub fn write_acknowledgement(&self) -> i32 {
        if self.safe { 1 } else { 0 }
    }

    /// The effective timeout.
    pub fn effective_timeout(&self) -> Duration {
        self.timeout
            .map(Duration::from_millis)
            .unwrap_or_else(default_timeout)
    }

    pub fn to_document(&self) -> Document {
        doc! {
            "w": self.write_acknowledgement(),
            "fsync": self.fsync,
            "timeout": self.effective_timeout().as_millis() as i64,
        }
    }

    pub(crate) fn apply(&mut self, patch: &OptionsPatch) {
        if let Some(safe) = patch.safe {
            self.safe = safe;
        }
        if let Some(fsync) = patch.fsync {
            self.fsync = fsync;
        }
        if let Some(timeout) = patch.timeout {
            self.timeout = Some(timeout);
        }
    }
}

/// A partial option set parsed from a raw options document.
///
/// Every field is optional, keys that are not listed here are ignored.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsPatch {
    pub safe: Option<bool>,
    pub fsync: Option<bool>,
    pub timeout: Option<u64>,
    pub just_one: Option<bool>,
    pub upsert: Option<bool>,
    pub multiple: Option<bool>,
    pub atomic: Option<bool>,
}

impl OptionsPatch {
    pub fn from_document(options: Document) -> MongaResult<Self> {
        deserialize_from_bson(Bson::Document(options))
            .map_err(|e| MongaError::InvalidArgument(format!("invalid query options: {e}")))
    }
}

/// Builder methods for the execution options of a query.
///
/// Implementors only provide access to their [`Options`] record; builders with
/// extra flags override [`QueryOptions::apply_options`] and
/// [`QueryOptions::get_options`].
pub trait QueryOptions {
    fn options(&self) -> &Options;

    fn options_mut(&mut self) -> &mut Options;

    /// Sets the acknowledgement (safe) option.
    fn safe(&mut self, safe: bool) -> &mut Self
    where
        Self: Sized,
    {
        self.options_mut().safe = safe;
        self
    }

    /// Sets the fsync option.
    fn fsync(&mut self, fsync: bool) -> &mut Self
    where
        Self: Sized,
    {
        self.options_mut().fsync = fsync;
        self
    }

    /// Sets the timeout option.
    fn timeout(&mut self, timeout: Duration) -> &mut Self
    where
        Self: Sized,
    {
        self.options_mut().timeout = Some(timeout.as_millis() as u64);
        self
    }

    /// Injects options from a raw document.
    ///
    /// Only option names known to this builder are applied, other keys are
    /// silently ignored. A known key holding a value of the wrong type is an
    /// argument error.
    fn set_options(&mut self, options: Document) -> MongaResult<&mut Self>
    where
        Self: Sized,
    {
        let patch = OptionsPatch::from_document(options)?;
        self.apply_options(&patch);
        Ok(self)
    }

    fn apply_options(&mut self, patch: &OptionsPatch) {
        self.options_mut().apply(patch);
    }

    /// Retrieves the query options as a document.
    fn get_options(&self) -> Document {
        self.options().to_document()
    }
}
