use crate::sketch::model::Color;

pub const DEFAULT_SWATCHES: [&str; 12] = [
    "#000000", "#ffffff", "#ee3333", "#e64980", "#be4bdb", "#893200", "#228be6", "#3333ee",
    "#40c057", "#00aa00", "#fab005", "#fd7e14",
];

/// Tool state shared by the stroke surface and the session: active color,
/// eraser flag and the pending reset request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteState {
    color: Color,
    eraser_active: bool,
    reset_requested: bool,
}

impl Default for PaletteState {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            eraser_active: false,
            reset_requested: false,
        }
    }
}

impl PaletteState {
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn eraser_active(&self) -> bool {
        self.eraser_active
    }

    pub fn set_color(&mut self, color: Color) {
        tracing::debug!(?color, "palette color changed");
        self.color = color;
    }

    pub fn toggle_eraser(&mut self) -> bool {
        self.eraser_active = !self.eraser_active;
        tracing::debug!(eraser = self.eraser_active, "eraser toggled");
        self.eraser_active
    }

    pub fn request_reset(&mut self) {
        self.reset_requested = true;
    }

    pub fn reset_requested(&self) -> bool {
        self.reset_requested
    }

    /// Consume the pending reset request, restoring color and eraser to their
    /// initial values when one was pending.
    pub fn take_reset(&mut self) -> bool {
        if !self.reset_requested {
            return false;
        }
        *self = Self::default();
        true
    }
}

/// Parse configured swatch strings, dropping entries that are not colors.
pub fn parse_swatches<S: AsRef<str>>(entries: &[S]) -> Vec<Color> {
    entries
        .iter()
        .filter_map(|entry| {
            let entry = entry.as_ref();
            let parsed = Color::parse(entry);
            if parsed.is_none() {
                tracing::warn!("ignoring swatch '{}': not a color", entry);
            }
            parsed
        })
        .collect()
}
