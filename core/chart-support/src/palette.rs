//! FILENAME: core/chart-support/src/palette.rs
//! Series colors.

use serde::{Deserialize, Serialize};

const DARK24: [&str; 24] = [
    "#2E91E5", "#E15F99", "#1CA71C", "#FB0D0D", "#DA16FF", "#222A2A", "#B68100", "#750D86",
    "#EB663B", "#511CFB", "#00A08B", "#FB00D1", "#FC0080", "#B2828D", "#6C7C32", "#778AAE",
    "#862A16", "#A777F1", "#620042", "#1616A7", "#DA60CA", "#6C4516", "#0D2A63", "#AF0038",
];

const SET3: [&str; 12] = [
    "rgb(141,211,199)", "rgb(255,255,179)", "rgb(190,186,218)", "rgb(251,128,114)",
    "rgb(128,177,211)", "rgb(253,180,98)", "rgb(179,222,105)", "rgb(252,205,229)",
    "rgb(217,217,217)", "rgb(188,128,189)", "rgb(204,235,197)", "rgb(255,237,111)",
];

const PLOTLY: [&str; 10] = [
    "#636EFA", "#EF553B", "#00CC96", "#AB63FA", "#FFA15A", "#19D3F3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

pub trait PaletteProvider {
    fn colors(&self) -> Vec<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaletteOrder {
    Default,
    /// Starts the palette `k` colors in, wrapping around.
    Rotated(usize),
}

impl Default for PaletteOrder {
    fn default() -> Self {
        PaletteOrder::Default
    }
}

/// Dark24, then Set3, then the Plotly colors in reverse: 46 distinct colors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualitativePalette {
    #[serde(default)]
    pub order: PaletteOrder,
}

impl PaletteProvider for QualitativePalette {
    fn colors(&self) -> Vec<String> {
        let mut colors: Vec<String> = DARK24
            .iter()
            .chain(SET3.iter())
            .chain(PLOTLY.iter().rev())
            .map(|c| c.to_string())
            .collect();

        if let PaletteOrder::Rotated(k) = self.order {
            let len = colors.len();
            colors.rotate_left(k % len);
        }
        colors
    }
}
