// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for source tree queries.

use crate::handles::HandleKind;

/// Result type alias for source tree queries.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while querying or building a source tree.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A handle does not refer to a live object of the expected kind.
    #[error("unknown {kind} handle: {id}")]
    UnknownHandle { kind: HandleKind, id: String },

    /// A source object carries parameters that cannot describe anything.
    #[error("invalid parameter in {object}: {reason}")]
    InvalidParameter { object: String, reason: String },
}

impl Error {
    pub(crate) fn unknown(kind: HandleKind, id: impl std::fmt::Debug) -> Self {
        Error::UnknownHandle {
            kind,
            id: format!("{:?}", id),
        }
    }

    /// Shortcut for [`Error::InvalidParameter`].
    pub fn invalid(object: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            object: object.into(),
            reason: reason.into(),
        }
    }
}
