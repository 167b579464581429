use super::error::SessionError;
use std::fmt;
use std::str::FromStr;

pub const ATOM_SIZE_MIN: f64 = 0.1;
pub const ATOM_SIZE_MAX: f64 = 3.0;
pub const DEFAULT_ATOM_SIZE: f64 = 1.0;

/// How the renderer draws a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    #[default]
    Cartoon,
    Spacefill,
    Licorice,
    Surface,
}

impl ViewMode {
    pub const ALL: [ViewMode; 4] = [
        ViewMode::Cartoon,
        ViewMode::Spacefill,
        ViewMode::Licorice,
        ViewMode::Surface,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Cartoon => "cartoon",
            ViewMode::Spacefill => "spacefill",
            ViewMode::Licorice => "licorice",
            ViewMode::Surface => "surface",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = SessionError;

    /// Parses a view mode name, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfiguration`] for names outside the declared modes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViewMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SessionError::InvalidConfiguration {
                field: "view_mode",
                reason: format!("unknown view mode '{s}'"),
            })
    }
}

/// How the renderer colors atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorScheme {
    #[default]
    Default,
    Chain,
    Residue,
    Element,
    BFactor,
    Sequence,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 6] = [
        ColorScheme::Default,
        ColorScheme::Chain,
        ColorScheme::Residue,
        ColorScheme::Element,
        ColorScheme::BFactor,
        ColorScheme::Sequence,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::Default => "DEFAULT",
            ColorScheme::Chain => "CHAIN",
            ColorScheme::Residue => "RESIDUE",
            ColorScheme::Element => "ELEMENT",
            ColorScheme::BFactor => "BFACTOR",
            ColorScheme::Sequence => "SEQUENCE",
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorScheme {
    type Err = SessionError;

    /// Parses a color scheme name, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfiguration`] for names outside the declared schemes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorScheme::ALL
            .into_iter()
            .find(|scheme| scheme.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SessionError::InvalidConfiguration {
                field: "color_scheme",
                reason: format!("unknown color scheme '{s}'"),
            })
    }
}

/// Display configuration shared by every loaded structure.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    pub view_mode: ViewMode,
    pub color_scheme: ColorScheme,
    /// Always within [`ATOM_SIZE_MIN`]..=[`ATOM_SIZE_MAX`].
    pub atom_size: f64,
    pub show_ligand: bool,
    pub show_water_ion: bool,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::default(),
            color_scheme: ColorScheme::default(),
            atom_size: DEFAULT_ATOM_SIZE,
            show_ligand: true,
            show_water_ion: false,
        }
    }
}

/// A partial update to [`ViewerState`]; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewerStateUpdate {
    pub view_mode: Option<ViewMode>,
    pub color_scheme: Option<ColorScheme>,
    pub atom_size: Option<f64>,
    pub show_ligand: Option<bool>,
    pub show_water_ion: Option<bool>,
}

impl ViewerStateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view_mode(mut self, mode: ViewMode) -> Self {
        self.view_mode = Some(mode);
        self
    }
    pub fn color_scheme(mut self, scheme: ColorScheme) -> Self {
        self.color_scheme = Some(scheme);
        self
    }
    pub fn atom_size(mut self, size: f64) -> Self {
        self.atom_size = Some(size);
        self
    }
    pub fn show_ligand(mut self, visible: bool) -> Self {
        self.show_ligand = Some(visible);
        self
    }
    pub fn show_water_ion(mut self, visible: bool) -> Self {
        self.show_water_ion = Some(visible);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Combines two updates; fields set in `other` win.
    pub fn merge(self, other: ViewerStateUpdate) -> Self {
        Self {
            view_mode: other.view_mode.or(self.view_mode),
            color_scheme: other.color_scheme.or(self.color_scheme),
            atom_size: other.atom_size.or(self.atom_size),
            show_ligand: other.show_ligand.or(self.show_ligand),
            show_water_ion: other.show_water_ion.or(self.show_water_ion),
        }
    }

    /// Checks every field against its declared domain.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfiguration`] if the atom size is not a finite number
    /// within [`ATOM_SIZE_MIN`]..=[`ATOM_SIZE_MAX`].
    pub fn validate(&self) -> Result<(), SessionError> {
        if let Some(size) = self.atom_size {
            if !size.is_finite() || !(ATOM_SIZE_MIN..=ATOM_SIZE_MAX).contains(&size) {
                return Err(SessionError::InvalidConfiguration {
                    field: "atom_size",
                    reason: format!(
                        "{size} is outside the allowed range {ATOM_SIZE_MIN}..={ATOM_SIZE_MAX}"
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Holds the session's single [`ViewerState`] and applies validated partial updates to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewerCoordinator {
    state: ViewerState,
}

impl ViewerCoordinator {
    pub fn new(initial: ViewerState) -> Self {
        Self { state: initial }
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    /// Merges `update` into the current state.
    ///
    /// The update is validated as a whole before any field is written.
    ///
    /// # Return
    ///
    /// `true` if any field changed value.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfiguration`] and leaves the state untouched if any
    /// field is out of its domain.
    pub fn apply(&mut self, update: &ViewerStateUpdate) -> Result<bool, SessionError> {
        update.validate()?;

        let previous = self.state.clone();
        if let Some(mode) = update.view_mode {
            self.state.view_mode = mode;
        }
        if let Some(scheme) = update.color_scheme {
            self.state.color_scheme = scheme;
        }
        if let Some(size) = update.atom_size {
            self.state.atom_size = size;
        }
        if let Some(visible) = update.show_ligand {
            self.state.show_ligand = visible;
        }
        if let Some(visible) = update.show_water_ion {
            self.state.show_water_ion = visible;
        }
        Ok(self.state != previous)
    }
}
