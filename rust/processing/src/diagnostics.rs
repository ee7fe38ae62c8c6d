// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Non-fatal degradations collected during a run.

use std::fmt;

use serde::Serialize;

/// A recoverable problem. The run continues with a partial or approximate result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// No builder for the shape class; a bounding box stands in for it.
    UnsupportedPrimitive { shape: String, class: String },
    /// The shape's parameters describe no solid; it is unbuildable.
    DegenerateSolid { shape: String, reason: String },
    /// A placement was dropped because its volume is unbuildable.
    UnbuildableDaughter {
        placement: String,
        parent: String,
        volume: String,
    },
    /// Composite nesting exceeded the configured depth.
    NestingTooDeep { shape: String, depth: usize },
    /// The shape was requested as a tessellated solid but its mesh could not be evaluated.
    TessellationFailed { shape: String, reason: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnsupportedPrimitive { shape, class } => write!(
                f,
                "shape {} of unsupported class {} replaced by its bounding box",
                shape, class
            ),
            Warning::DegenerateSolid { shape, reason } => {
                write!(f, "shape {} is degenerate: {}", shape, reason)
            }
            Warning::UnbuildableDaughter {
                placement,
                parent,
                volume,
            } => write!(
                f,
                "placement {} of {} in {} skipped: volume cannot be built",
                placement, volume, parent
            ),
            Warning::NestingTooDeep { shape, depth } => {
                write!(f, "shape {} nests composites deeper than {}", shape, depth)
            }
            Warning::TessellationFailed { shape, reason } => {
                write!(f, "shape {} could not be tessellated: {}", shape, reason)
            }
        }
    }
}

/// Ordered warning log
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub(crate) fn report(&mut self, warning: Warning) {
        match &warning {
            Warning::UnsupportedPrimitive { shape, class } => {
                tracing::warn!(
                    shape = %shape,
                    class = %class,
                    "unsupported primitive, using bounding box"
                );
            }
            Warning::DegenerateSolid { shape, reason } => {
                tracing::warn!(shape = %shape, reason = %reason, "degenerate solid");
            }
            Warning::UnbuildableDaughter {
                placement,
                parent,
                volume,
            } => {
                tracing::warn!(
                    placement = %placement,
                    parent = %parent,
                    volume = %volume,
                    "skipping unbuildable daughter"
                );
            }
            Warning::NestingTooDeep { shape, depth } => {
                tracing::warn!(shape = %shape, depth, "composite nesting too deep");
            }
            Warning::TessellationFailed { shape, reason } => {
                tracing::warn!(shape = %shape, reason = %reason, "tessellation failed");
            }
        }
        self.warnings.push(warning);
    }

    pub(crate) fn len(&self) -> usize {
        self.warnings.len()
    }

    pub(crate) fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_keep_report_order() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.report(Warning::DegenerateSolid {
            shape: "trap".into(),
            reason: "zero height".into(),
        });
        diagnostics.report(Warning::NestingTooDeep {
            shape: "deep".into(),
            depth: 3,
        });
        let warnings = diagnostics.into_warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].to_string().contains("trap"));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let warning = Warning::UnsupportedPrimitive {
            shape: "arb".into(),
            class: "Arb8".into(),
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["kind"], "unsupported_primitive");
        assert_eq!(json["class"], "Arb8");
    }
}
