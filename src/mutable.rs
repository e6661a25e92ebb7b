//! The writable-then-frozen lifecycle shared by mutable entities.

use std::fmt;

use crate::error::{OfpError, Result};
use crate::version::ProtocolVersion;

/// Write-once latch owned by a mutable entity.
///
/// Starts writable; `invalidate` flips it to frozen exactly once and it is
/// never reset. Not `Clone`: a copy of a mutable entity gets a fresh latch.
#[derive(Debug, Default)]
pub struct Latch {
    frozen: bool,
}

impl Latch {
    pub fn new() -> Latch {
        Latch { frozen: false }
    }

    pub fn writable(&self) -> bool {
        !self.frozen
    }

    /// Fails with `InvalidMutable` once frozen. `owner` names the entity in
    /// the failure.
    pub fn check_writable(&self, owner: &dyn fmt::Display) -> Result<()> {
        if self.frozen {
            return Err(OfpError::InvalidMutable(owner.to_string()));
        }
        Ok(())
    }

    /// Freeze the latch. Only succeeds once.
    pub fn invalidate(&mut self, owner: &dyn fmt::Display) -> Result<()> {
        self.check_writable(owner)?;
        self.frozen = true;
        Ok(())
    }

    /// Decorates an entity's summary with its lifecycle state.
    pub fn tag_string(&self, text: &str) -> String {
        if self.frozen {
            format!("{} [frozen]", text)
        } else {
            format!("{} [mutable]", text)
        }
    }
}

/// Borrowed, typed write access to the body of a writable message.
///
/// Obtained from `MutableMessage::edit`, which checks the latch. The editor
/// holds the message's unique borrow, so the message cannot be frozen while
/// an editor is alive. Each body kind adds its own setters; a setter that
/// fails leaves the body unchanged.
#[derive(Debug)]
pub struct Editor<'a, B> {
    version: ProtocolVersion,
    body: &'a mut B,
}

impl<'a, B> Editor<'a, B> {
    pub(crate) fn new(version: ProtocolVersion, body: &'a mut B) -> Editor<'a, B> {
        Editor {
            version: version,
            body: body,
        }
    }

    /// Version of the message being edited.
    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Read access to the body under edit.
    pub fn body(&self) -> &B {
        &*self.body
    }

    pub(crate) fn body_mut(&mut self) -> &mut B {
        &mut *self.body
    }
}
