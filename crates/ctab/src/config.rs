// Standard Library Imports
use std::str::FromStr;

// External Crate Imports
use knuffel::{span::Span, Decode};
use miette::{Diagnostic, Result};
use thiserror::Error;

// Public API ==========================================================================================================

/// How problems in the input are treated: `Strict` fails on the first one, `Relaxed` repairs or skips what it can
/// and records an issue instead
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Mode {
    Strict,
    #[default]
    Relaxed,
}

/// Options shared by every record a reader decodes
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ReaderConfig {
    pub mode: Mode,
    /// Keep 3D positions even when every z-coordinate is zero
    pub force_3d: bool,
    /// Read the `D` and `T` symbols as hydrogen-2 and hydrogen-3
    pub interpret_hydrogen_isotopes: bool,
    /// Build tetrahedral stereocentres from atom parities
    pub add_stereo_elements: bool,
    /// Drop records that fail to decode instead of ending iteration
    pub skip_on_error: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Relaxed,
            force_3d: false,
            interpret_hydrogen_isotopes: true,
            add_stereo_elements: true,
            skip_on_error: false,
        }
    }
}

impl ReaderConfig {
    #[must_use]
    pub fn strict() -> Self {
        Self::default().with_mode(Mode::Strict)
    }

    #[must_use]
    pub const fn with_mode(self, mode: Mode) -> Self {
        Self { mode, ..self }
    }

    #[must_use]
    pub const fn with_force_3d(self, force_3d: bool) -> Self {
        Self { force_3d, ..self }
    }

    #[must_use]
    pub const fn with_interpret_hydrogen_isotopes(self, interpret_hydrogen_isotopes: bool) -> Self {
        Self {
            interpret_hydrogen_isotopes,
            ..self
        }
    }

    #[must_use]
    pub const fn with_add_stereo_elements(self, add_stereo_elements: bool) -> Self {
        Self {
            add_stereo_elements,
            ..self
        }
    }

    #[must_use]
    pub const fn with_skip_on_error(self, skip_on_error: bool) -> Self {
        Self {
            skip_on_error,
            ..self
        }
    }

    /// Loads a configuration from a KDL document; options that aren't mentioned keep their defaults
    pub fn from_kdl(file_name: impl AsRef<str>, kdl_text: impl AsRef<str>) -> Result<Self> {
        let parsed: ReaderConfigKdl = knuffel::parse(file_name.as_ref(), kdl_text.as_ref())?;
        let defaults = Self::default();

        let mode = parsed.mode.as_deref().map(Mode::from_str).transpose()?;
        Ok(Self {
            mode: mode.unwrap_or(defaults.mode),
            force_3d: parsed.force_3d.unwrap_or(defaults.force_3d),
            interpret_hydrogen_isotopes: parsed
                .interpret_hydrogen_isotopes
                .unwrap_or(defaults.interpret_hydrogen_isotopes),
            add_stereo_elements: parsed.add_stereo_elements.unwrap_or(defaults.add_stereo_elements),
            skip_on_error: parsed.skip_on_error.unwrap_or(defaults.skip_on_error),
        })
    }
}

#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
#[error("expected the reader mode to be \"strict\" or \"relaxed\", got {0:?}")]
#[diagnostic(help("the mode is case-sensitive"))]
pub struct InvalidModeError(String);

impl FromStr for Mode {
    type Err = InvalidModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(Self::Strict),
            "relaxed" => Ok(Self::Relaxed),
            _ => Err(InvalidModeError(s.to_owned())),
        }
    }
}

// KDL File Schema =====================================================================================================

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct ReaderConfigKdl {
    #[knuffel(child, unwrap(argument))]
    mode: Option<String>,
    #[knuffel(child, unwrap(argument))]
    force_3d: Option<bool>,
    #[knuffel(child, unwrap(argument))]
    interpret_hydrogen_isotopes: Option<bool>,
    #[knuffel(child, unwrap(argument))]
    add_stereo_elements: Option<bool>,
    #[knuffel(child, unwrap(argument))]
    skip_on_error: Option<bool>,
}

// Module Tests ========================================================================================================
