// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::ConvertConfig;
use crate::diagnostics::{Diagnostics, Warning};
use crate::registry::Registry;
use crate::transforms::TransformComposer;

/// State shared by the resolvers of one run.
///
/// Owned by a single run and never shared between runs.
pub(crate) struct Session<'a, S: ?Sized> {
    pub source: &'a S,
    pub config: &'a ConvertConfig,
    pub registry: Registry,
    pub transforms: TransformComposer,
    pub diagnostics: Diagnostics,
}

impl<'a, S: ?Sized> Session<'a, S> {
    pub fn new(source: &'a S, config: &'a ConvertConfig) -> Self {
        Self {
            source,
            config,
            registry: Registry::new(config.mesh_settings()),
            transforms: TransformComposer::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn warn(&mut self, warning: Warning) {
        self.diagnostics.report(warning);
    }
}
