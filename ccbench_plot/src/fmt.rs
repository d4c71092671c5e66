use plotters::style::RGBColor;

// matplotlib's default color cycle
const PALETTE: [RGBColor; 10] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
    RGBColor(0xe3, 0x77, 0xc2),
    RGBColor(0x7f, 0x7f, 0x7f),
    RGBColor(0xbc, 0xbd, 0x22),
    RGBColor(0x17, 0xbe, 0xcf),
];

const DPI: f64 = 100.0;
const POINTS_PER_INCH: f64 = 72.0;

pub struct PlotFmt;

impl PlotFmt {
    pub fn font() -> &'static str {
        "sans-serif"
    }

    pub fn bar_color() -> RGBColor {
        PALETTE[0]
    }

    /// Color of a variant's line. Known variants have a fixed color, so
    /// that they look the same across figures; others get the color of
    /// their position in the legend.
    pub fn color(variant: &str, index: usize) -> RGBColor {
        let slot = match variant {
            "TcpVegas" => 0,
            "TcpWestwoodPlus" => 1,
            "TcpBbr" => 2,
            "TcpCubic" => 3,
            "TcpVeno" => 4,
            "NewReno" | "TcpNewReno" => 5,
            "Reno" => 6,
            _ => index,
        };
        PALETTE[slot % PALETTE.len()]
    }

    /// Converts a font size in points to pixels, at 100 dpi.
    pub fn points_to_pixels(points: u32) -> u32 {
        (points as f64 * DPI / POINTS_PER_INCH).round() as u32
    }

    /// Font size (in pixels) of each chart's caption.
    pub fn caption_size() -> u32 {
        Self::points_to_pixels(12)
    }

    /// Font size (in pixels) of tick labels, legends and value labels.
    pub fn label_size() -> u32 {
        Self::points_to_pixels(10)
    }

    /// Size (in pixels) of the circle drawn at each line point.
    pub fn marker_size() -> u32 {
        4
    }
}
