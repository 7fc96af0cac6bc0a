use plotters::style::RGBColor;
use std::collections::HashMap;

/// Default single-series bar color
pub const DEFAULT_COLOR: &str = "#1f77b4";

/// Categorical color palette
#[derive(Debug, Clone)]
pub struct ColorPalette {
    colors: Vec<&'static str>,
}

impl ColorPalette {
    /// The d3/plotly category10 scheme
    pub fn category10() -> Self {
        Self {
            colors: vec![
                "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
                "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
            ],
        }
    }

    /// Assign colors to keys in the given order, cycling when the palette runs out
    pub fn assign_colors(&self, keys: &[String]) -> ColorMap {
        let colors = keys
            .iter()
            .enumerate()
            .map(|(i, key)| (key.clone(), self.colors[i % self.colors.len()]))
            .collect();
        ColorMap {
            colors,
            palette: self.colors.clone(),
            offset: keys.len(),
        }
    }
}

/// Stable key -> color lookup.
///
/// Built once from the dataset's cities. A key missing from that list still gets a
/// palette color, picked from a hash of the key so it is the same on every render.
#[derive(Debug, Clone)]
pub struct ColorMap {
    colors: HashMap<String, &'static str>,
    palette: Vec<&'static str>,
    offset: usize,
}

impl ColorMap {
    pub fn color_for(&self, key: &str) -> &str {
        if let Some(color) = self.colors.get(key) {
            return color;
        }
        if self.palette.is_empty() {
            return DEFAULT_COLOR;
        }
        let hash = key
            .bytes()
            .fold(0u64, |h, b| h.wrapping_mul(31).wrapping_add(u64::from(b)));
        let len = self.palette.len() as u64;
        let index = (self.offset as u64 % len + hash % len) % len;
        self.palette[index as usize]
    }
}

/// Parse `#rrggbb` into a plotters color, falling back to the default blue
pub fn parse_hex(color: &str) -> RGBColor {
    let hex = color.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return RGBColor(0x1f, 0x77, 0xb4);
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match (channel(0), channel(2), channel(4)) {
        (Some(r), Some(g), Some(b)) => RGBColor(r, g, b),
        _ => RGBColor(0x1f, 0x77, 0xb4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_colors_in_order() {
        let keys = vec!["Yangon".to_string(), "Mandalay".to_string()];
        let map = ColorPalette::category10().assign_colors(&keys);
        assert_eq!(map.color_for("Yangon"), "#1f77b4");
        assert_eq!(map.color_for("Mandalay"), "#ff7f0e");
    }

    #[test]
    fn test_unknown_keys_spread_over_palette() {
        let keys = vec!["Yangon".to_string(), "Mandalay".to_string()];
        let map = ColorPalette::category10().assign_colors(&keys);

        assert_eq!(map.color_for("Atlantis"), "#9467bd");
        assert_eq!(map.color_for("Narnia"), "#d62728");
        assert_ne!(map.color_for("Atlantis"), map.color_for("Narnia"));
    }

    #[test]
    fn test_palette_cycles() {
        let keys: Vec<String> = (0..12).map(|i| format!("k{}", i)).collect();
        let map = ColorPalette::category10().assign_colors(&keys);
        assert_eq!(map.color_for("k10"), map.color_for("k0"));
    }

    #[test]
    fn test_parse_hex() {
        let c = parse_hex("#ff7f0e");
        assert_eq!((c.0, c.1, c.2), (0xff, 0x7f, 0x0e));
        let bad = parse_hex("nope");
        assert_eq!((bad.0, bad.1, bad.2), (0x1f, 0x77, 0xb4));
    }
}
