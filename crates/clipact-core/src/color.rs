//! Textual color parsing and conversion.
//!
//! Accepts the common CSS notations (hex, named colors, `rgb()`, `hsl()`,
//! `hwb()`) and renders a color canonically in one of the supported spaces.
//! Rendering is stable under a same-space round trip: parsing a rendered
//! value and rendering it again in the same space yields the same string.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Target notation for color conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSpace {
    Hex,
    Rgb,
    Hsl,
    Hwb,
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorSpace::Hex => write!(f, "hex"),
            ColorSpace::Rgb => write!(f, "rgb"),
            ColorSpace::Hsl => write!(f, "hsl"),
            ColorSpace::Hwb => write!(f, "hwb"),
        }
    }
}

impl std::str::FromStr for ColorSpace {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hex" => Ok(ColorSpace::Hex),
            "rgb" => Ok(ColorSpace::Rgb),
            "hsl" => Ok(ColorSpace::Hsl),
            "hwb" => Ok(ColorSpace::Hwb),
            _ => Err(format!("Unknown color space: {}", s)),
        }
    }
}

/// An sRGB color with straight alpha. All channels are in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0, 1.0)
    }

    /// Parse a textual color. Returns `None` for anything unrecognized.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim().to_ascii_lowercase();
        if s.is_empty() {
            return None;
        }
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        if let Some(open) = s.find('(') {
            let body = s[open + 1..].strip_suffix(')')?;
            return parse_function(s[..open].trim(), body);
        }
        if s == "transparent" {
            return Some(Self::rgba(0.0, 0.0, 0.0, 0.0));
        }
        named(&s).map(|rgb| {
            Self::from_rgb8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
        })
    }

    /// Hue in degrees `[0, 360)`, saturation and lightness in `[0, 1]`.
    pub fn to_hsl(&self) -> (f64, f64, f64) {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let delta = max - min;
        let l = (max + min) / 2.0;
        if delta <= f64::EPSILON {
            return (0.0, 0.0, l);
        }
        let s = delta / (1.0 - (2.0 * l - 1.0).abs());
        (self.hue(max, delta), s.clamp(0.0, 1.0), l)
    }

    /// Hue in degrees `[0, 360)`, whiteness and blackness in `[0, 1]`.
    pub fn to_hwb(&self) -> (f64, f64, f64) {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let delta = max - min;
        let h = if delta <= f64::EPSILON {
            0.0
        } else {
            self.hue(max, delta)
        };
        (h, min, 1.0 - max)
    }

    fn hue(&self, max: f64, delta: f64) -> f64 {
        let h = if max == self.r {
            ((self.g - self.b) / delta).rem_euclid(6.0)
        } else if max == self.g {
            (self.b - self.r) / delta + 2.0
        } else {
            (self.r - self.g) / delta + 4.0
        };
        (h * 60.0).rem_euclid(360.0)
    }

    pub fn from_hsl(h: f64, s: f64, l: f64, a: f64) -> Self {
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let hp = h.rem_euclid(360.0) / 60.0;
        let x = c * (1.0 - (hp.rem_euclid(2.0) - 1.0).abs());
        let (r, g, b) = match hp as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        Self::rgba(r + m, g + m, b + m, a)
    }

    pub fn from_hwb(h: f64, w: f64, bl: f64, a: f64) -> Self {
        let w = w.clamp(0.0, 1.0);
        let bl = bl.clamp(0.0, 1.0);
        if w + bl >= 1.0 {
            let gray = w / (w + bl);
            return Self::rgba(gray, gray, gray, a);
        }
        let pure = Self::from_hsl(h, 1.0, 0.5, 1.0);
        let scale = 1.0 - w - bl;
        Self::rgba(
            pure.r * scale + w,
            pure.g * scale + w,
            pure.b * scale + w,
            a,
        )
    }

    /// Canonical rendering in the given space.
    pub fn to_string_in(&self, space: ColorSpace) -> String {
        let alpha = format_alpha(self.a);
        let opaque = alpha == "1";
        match space {
            ColorSpace::Hex => {
                let mut out = format!(
                    "#{:02x}{:02x}{:02x}",
                    channel8(self.r),
                    channel8(self.g),
                    channel8(self.b)
                );
                let a = channel8(self.a);
                if a < 255 {
                    out.push_str(&format!("{:02x}", a));
                }
                out
            }
            ColorSpace::Rgb => {
                let (r, g, b) = (channel8(self.r), channel8(self.g), channel8(self.b));
                if opaque {
                    format!("rgb({}, {}, {})", r, g, b)
                } else {
                    format!("rgba({}, {}, {}, {})", r, g, b, alpha)
                }
            }
            ColorSpace::Hsl => {
                let (h, s, l) = self.to_hsl();
                let l = percent(l);
                let mut s = percent(s);
                let mut h = degrees(h);
                if l == 0 || l == 100 {
                    s = 0;
                }
                if s == 0 {
                    h = 0;
                }
                if opaque {
                    format!("hsl({}, {}%, {}%)", h, s, l)
                } else {
                    format!("hsla({}, {}%, {}%, {})", h, s, l, alpha)
                }
            }
            ColorSpace::Hwb => {
                let (h, w, bl) = self.to_hwb();
                let (mut h, mut w, mut bl) = (degrees(h), percent(w), percent(bl));
                if w + bl >= 100 {
                    let gray = w as f64 / (w + bl) as f64;
                    w = percent(gray);
                    bl = 100 - w;
                    h = 0;
                }
                if opaque {
                    format!("hwb({} {}% {}%)", h, w, bl)
                } else {
                    format!("hwb({} {}% {}% / {})", h, w, bl, alpha)
                }
            }
        }
    }

    /// Channel-wise comparison with a tolerance.
    pub fn approx_eq(&self, other: &Color, tolerance: f64) -> bool {
        (self.r - other.r).abs() <= tolerance
            && (self.g - other.g).abs() <= tolerance
            && (self.b - other.b).abs() <= tolerance
            && (self.a - other.a).abs() <= tolerance
    }
}

fn channel8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn percent(v: f64) -> u32 {
    (v.clamp(0.0, 1.0) * 100.0).round() as u32
}

fn degrees(h: f64) -> u32 {
    (h.round() as u32) % 360
}

fn format_alpha(a: f64) -> String {
    let s = format!("{:.2}", a.clamp(0.0, 1.0));
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let (r, g, b, a) = match hex.len() {
        3 => (nibble(0)?, nibble(1)?, nibble(2)?, 255),
        4 => (nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?),
        6 => (byte(0)?, byte(2)?, byte(4)?, 255),
        8 => (byte(0)?, byte(2)?, byte(4)?, byte(6)?),
        _ => return None,
    };
    Some(Color::rgba(
        r as f64 / 255.0,
        g as f64 / 255.0,
        b as f64 / 255.0,
        a as f64 / 255.0,
    ))
}

fn parse_function(name: &str, body: &str) -> Option<Color> {
    let (main, slash_alpha) = match body.split_once('/') {
        Some((main, alpha)) => (main, Some(alpha.trim())),
        None => (body, None),
    };
    let args: Vec<&str> = main
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();
    let alpha_token = match (args.len(), slash_alpha) {
        (3, None) => None,
        (3, Some(alpha)) => Some(alpha),
        (4, None) => Some(args[3]),
        _ => return None,
    };
    let alpha = match alpha_token {
        Some(token) => parse_unit(token)?,
        None => 1.0,
    };

    match name {
        "rgb" | "rgba" => {
            let channel = |t: &str| -> Option<f64> {
                match t.strip_suffix('%') {
                    Some(p) => Some(finite(p)? / 100.0),
                    None => Some(finite(t)? / 255.0),
                }
            };
            Some(Color::rgba(
                channel(args[0])?,
                channel(args[1])?,
                channel(args[2])?,
                alpha,
            ))
        }
        "hsl" | "hsla" => Some(Color::from_hsl(
            parse_hue(args[0])?,
            parse_percent(args[1])?,
            parse_percent(args[2])?,
            alpha,
        )),
        "hwb" => Some(Color::from_hwb(
            parse_hue(args[0])?,
            parse_percent(args[1])?,
            parse_percent(args[2])?,
            alpha,
        )),
        _ => None,
    }
}

fn finite(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A number in `[0, 1]` or a percentage.
fn parse_unit(token: &str) -> Option<f64> {
    match token.strip_suffix('%') {
        Some(p) => Some(finite(p)? / 100.0),
        None => finite(token),
    }
}

/// Saturation, lightness, whiteness and blackness; `%` is optional.
fn parse_percent(token: &str) -> Option<f64> {
    Some(finite(token.strip_suffix('%').unwrap_or(token))? / 100.0)
}

fn parse_hue(token: &str) -> Option<f64> {
    if let Some(v) = token.strip_suffix("deg") {
        finite(v)
    } else if let Some(v) = token.strip_suffix("grad") {
        Some(finite(v)? * 0.9)
    } else if let Some(v) = token.strip_suffix("rad") {
        Some(finite(v)?.to_degrees())
    } else if let Some(v) = token.strip_suffix("turn") {
        Some(finite(v)? * 360.0)
    } else {
        finite(token)
    }
}

fn named(name: &str) -> Option<u32> {
    NAMED_COLORS
        .binary_search_by(|(n, _)| n.cmp(&name))
        .ok()
        .map(|i| NAMED_COLORS[i].1)
}

/// CSS named colors, sorted by name.
const NAMED_COLORS: &[(&str, u32)] = &[
    ("aliceblue", 0xf0f8ff),
    ("antiquewhite", 0xfaebd7),
    ("aqua", 0x00ffff),
    ("aquamarine", 0x7fffd4),
    ("azure", 0xf0ffff),
    ("beige", 0xf5f5dc),
    ("bisque", 0xffe4c4),
    ("black", 0x000000),
    ("blanchedalmond", 0xffebcd),
    ("blue", 0x0000ff),
    ("blueviolet", 0x8a2be2),
    ("brown", 0xa52a2a),
    ("burlywood", 0xdeb887),
    ("cadetblue", 0x5f9ea0),
    ("chartreuse", 0x7fff00),
    ("chocolate", 0xd2691e),
    ("coral", 0xff7f50),
    ("cornflowerblue", 0x6495ed),
    ("cornsilk", 0xfff8dc),
    ("crimson", 0xdc143c),
    ("cyan", 0x00ffff),
    ("darkblue", 0x00008b),
    ("darkcyan", 0x008b8b),
    ("darkgoldenrod", 0xb8860b),
    ("darkgray", 0xa9a9a9),
    ("darkgreen", 0x006400),
    ("darkgrey", 0xa9a9a9),
    ("darkkhaki", 0xbdb76b),
    ("darkmagenta", 0x8b008b),
    ("darkolivegreen", 0x556b2f),
    ("darkorange", 0xff8c00),
    ("darkorchid", 0x9932cc),
    ("darkred", 0x8b0000),
    ("darksalmon", 0xe9967a),
    ("darkseagreen", 0x8fbc8f),
    ("darkslateblue", 0x483d8b),
    ("darkslategray", 0x2f4f4f),
    ("darkslategrey", 0x2f4f4f),
    ("darkturquoise", 0x00ced1),
    ("darkviolet", 0x9400d3),
    ("deeppink", 0xff1493),
    ("deepskyblue", 0x00bfff),
    ("dimgray", 0x696969),
    ("dimgrey", 0x696969),
    ("dodgerblue", 0x1e90ff),
    ("firebrick", 0xb22222),
    ("floralwhite", 0xfffaf0),
    ("forestgreen", 0x228b22),
    ("fuchsia", 0xff00ff),
    ("gainsboro", 0xdcdcdc),
    ("ghostwhite", 0xf8f8ff),
    ("gold", 0xffd700),
    ("goldenrod", 0xdaa520),
    ("gray", 0x808080),
    ("green", 0x008000),
    ("greenyellow", 0xadff2f),
    ("grey", 0x808080),
    ("honeydew", 0xf0fff0),
    ("hotpink", 0xff69b4),
    ("indianred", 0xcd5c5c),
    ("indigo", 0x4b0082),
    ("ivory", 0xfffff0),
    ("khaki", 0xf0e68c),
    ("lavender", 0xe6e6fa),
    ("lavenderblush", 0xfff0f5),
    ("lawngreen", 0x7cfc00),
    ("lemonchiffon", 0xfffacd),
    ("lightblue", 0xadd8e6),
    ("lightcoral", 0xf08080),
    ("lightcyan", 0xe0ffff),
    ("lightgoldenrodyellow", 0xfafad2),
    ("lightgray", 0xd3d3d3),
    ("lightgreen", 0x90ee90),
    ("lightgrey", 0xd3d3d3),
    ("lightpink", 0xffb6c1),
    ("lightsalmon", 0xffa07a),
    ("lightseagreen", 0x20b2aa),
    ("lightskyblue", 0x87cefa),
    ("lightslategray", 0x778899),
    ("lightslategrey", 0x778899),
    ("lightsteelblue", 0xb0c4de),
    ("lightyellow", 0xffffe0),
    ("lime", 0x00ff00),
    ("limegreen", 0x32cd32),
    ("linen", 0xfaf0e6),
    ("magenta", 0xff00ff),
    ("maroon", 0x800000),
    ("mediumaquamarine", 0x66cdaa),
    ("mediumblue", 0x0000cd),
    ("mediumorchid", 0xba55d3),
    ("mediumpurple", 0x9370db),
    ("mediumseagreen", 0x3cb371),
    ("mediumslateblue", 0x7b68ee),
    ("mediumspringgreen", 0x00fa9a),
    ("mediumturquoise", 0x48d1cc),
    ("mediumvioletred", 0xc71585),
    ("midnightblue", 0x191970),
    ("mintcream", 0xf5fffa),
    ("mistyrose", 0xffe4e1),
    ("moccasin", 0xffe4b5),
    ("navajowhite", 0xffdead),
    ("navy", 0x000080),
    ("oldlace", 0xfdf5e6),
    ("olive", 0x808000),
    ("olivedrab", 0x6b8e23),
    ("orange", 0xffa500),
    ("orangered", 0xff4500),
    ("orchid", 0xda70d6),
    ("palegoldenrod", 0xeee8aa),
    ("palegreen", 0x98fb98),
    ("paleturquoise", 0xafeeee),
    ("palevioletred", 0xdb7093),
    ("papayawhip", 0xffefd5),
    ("peachpuff", 0xffdab9),
    ("peru", 0xcd853f),
    ("pink", 0xffc0cb),
    ("plum", 0xdda0dd),
    ("powderblue", 0xb0e0e6),
    ("purple", 0x800080),
    ("rebeccapurple", 0x663399),
    ("red", 0xff0000),
    ("rosybrown", 0xbc8f8f),
    ("royalblue", 0x4169e1),
    ("saddlebrown", 0x8b4513),
    ("salmon", 0xfa8072),
    ("sandybrown", 0xf4a460),
    ("seagreen", 0x2e8b57),
    ("seashell", 0xfff5ee),
    ("sienna", 0xa0522d),
    ("silver", 0xc0c0c0),
    ("skyblue", 0x87ceeb),
    ("slateblue", 0x6a5acd),
    ("slategray", 0x708090),
    ("slategrey", 0x708090),
    ("snow", 0xfffafa),
    ("springgreen", 0x00ff7f),
    ("steelblue", 0x4682b4),
    ("tan", 0xd2b48c),
    ("teal", 0x008080),
    ("thistle", 0xd8bfd8),
    ("tomato", 0xff6347),
    ("turquoise", 0x40e0d0),
    ("violet", 0xee82ee),
    ("wheat", 0xf5deb3),
    ("white", 0xffffff),
    ("whitesmoke", 0xf5f5f5),
    ("yellow", 0xffff00),
    ("yellowgreen", 0x9acd32),
];

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1.0 / 512.0;

    fn red() -> Color {
        Color::from_rgb8(255, 0, 0)
    }

    #[test]
    fn test_named_colors_sorted() {
        for pair in NAMED_COLORS.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} >= {}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn test_parse_hex_forms() {
        assert!(Color::parse("#ff0000").unwrap().approx_eq(&red(), TOLERANCE));
        assert!(Color::parse("#F00").unwrap().approx_eq(&red(), TOLERANCE));
        let c = Color::parse("#ff000080").unwrap();
        assert!((c.a - 128.0 / 255.0).abs() < 1e-9);
        let c = Color::parse("#f008").unwrap();
        assert!((c.a - 136.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_rejects_bad_hex() {
        assert!(Color::parse("#ff00").is_some());
        assert!(Color::parse("#ff000").is_none());
        assert!(Color::parse("#gg0000").is_none());
        assert!(Color::parse("#").is_none());
    }

    #[test]
    fn test_parse_named() {
        assert!(Color::parse("Red").unwrap().approx_eq(&red(), TOLERANCE));
        assert!(Color::parse("rebeccapurple")
            .unwrap()
            .approx_eq(&Color::from_rgb8(0x66, 0x33, 0x99), TOLERANCE));
        assert_eq!(Color::parse("transparent").unwrap().a, 0.0);
        assert!(Color::parse("notacolor").is_none());
    }

    #[test]
    fn test_parse_rgb_functions() {
        assert!(Color::parse("rgb(255, 0, 0)").unwrap().approx_eq(&red(), TOLERANCE));
        assert!(Color::parse("rgb(255 0 0)").unwrap().approx_eq(&red(), TOLERANCE));
        assert!(Color::parse("rgb(100%, 0%, 0%)").unwrap().approx_eq(&red(), TOLERANCE));
        let c = Color::parse("rgba(255, 0, 0, 0.5)").unwrap();
        assert!((c.a - 0.5).abs() < 1e-9);
        let c = Color::parse("rgb(255 0 0 / 25%)").unwrap();
        assert!((c.a - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_parse_hsl_and_hwb() {
        assert!(Color::parse("hsl(0, 100%, 50%)").unwrap().approx_eq(&red(), TOLERANCE));
        assert!(Color::parse("hsl(360deg 100% 50%)").unwrap().approx_eq(&red(), TOLERANCE));
        assert!(Color::parse("hsl(0.5turn, 100%, 50%)")
            .unwrap()
            .approx_eq(&Color::from_rgb8(0, 255, 255), TOLERANCE));
        assert!(Color::parse("hwb(0 0% 0%)").unwrap().approx_eq(&red(), TOLERANCE));
        assert!(Color::parse("hwb(120 60% 60%)")
            .unwrap()
            .approx_eq(&Color::rgba(0.5, 0.5, 0.5, 1.0), TOLERANCE));
    }

    #[test]
    fn test_parse_rejects_malformed_functions() {
        assert!(Color::parse("rgb(1, 2)").is_none());
        assert!(Color::parse("rgb(1, 2, 3, 4, 5)").is_none());
        assert!(Color::parse("rgb(a, b, c)").is_none());
        assert!(Color::parse("rgb(1, 2, 3").is_none());
        assert!(Color::parse("cmyk(1, 2, 3)").is_none());
        assert!(Color::parse("rgb(nan, 0, 0)").is_none());
        assert!(Color::parse("").is_none());
    }

    #[test]
    fn test_render_red_in_every_space() {
        let c = red();
        assert_eq!(c.to_string_in(ColorSpace::Hex), "#ff0000");
        assert_eq!(c.to_string_in(ColorSpace::Rgb), "rgb(255, 0, 0)");
        assert_eq!(c.to_string_in(ColorSpace::Hsl), "hsl(0, 100%, 50%)");
        assert_eq!(c.to_string_in(ColorSpace::Hwb), "hwb(0 0% 0%)");
    }

    #[test]
    fn test_render_with_alpha() {
        let c = Color::rgba(0.0, 0.0, 1.0, 0.5);
        assert_eq!(c.to_string_in(ColorSpace::Hex), "#0000ff80");
        assert_eq!(c.to_string_in(ColorSpace::Rgb), "rgba(0, 0, 255, 0.5)");
        assert_eq!(c.to_string_in(ColorSpace::Hsl), "hsla(240, 100%, 50%, 0.5)");
        assert_eq!(c.to_string_in(ColorSpace::Hwb), "hwb(240 0% 0% / 0.5)");
        assert_eq!(
            Color::rgba(0.0, 0.0, 0.0, 0.0).to_string_in(ColorSpace::Rgb),
            "rgba(0, 0, 0, 0)"
        );
    }

    #[test]
    fn test_render_grays_drop_hue() {
        let gray = Color::from_rgb8(128, 128, 128);
        assert_eq!(gray.to_string_in(ColorSpace::Hsl), "hsl(0, 0%, 50%)");
        assert_eq!(gray.to_string_in(ColorSpace::Hwb), "hwb(0 50% 50%)");
        assert_eq!(
            Color::from_rgb8(255, 255, 255).to_string_in(ColorSpace::Hsl),
            "hsl(0, 0%, 100%)"
        );
    }

    #[test]
    fn test_same_space_round_trip_is_idempotent() {
        let samples = [
            "#ff0000", "#123456", "#abcdef80", "#000", "#fff", "teal", "rebeccapurple",
            "rgb(1, 2, 3)", "rgba(200, 100, 50, 0.33)", "hsl(210, 40%, 99.6%)",
            "hsl(33.4, 87.6%, 12.5%)", "hwb(300 49.6% 50.4%)", "hwb(12 10% 20% / 0.7)",
            "#fefefe", "#010101", "#7f7f80",
        ];
        for sample in samples {
            let color = Color::parse(sample).unwrap();
            for space in [ColorSpace::Hex, ColorSpace::Rgb, ColorSpace::Hsl, ColorSpace::Hwb] {
                let rendered = color.to_string_in(space);
                let reparsed = Color::parse(&rendered)
                    .unwrap_or_else(|| panic!("{} did not parse", rendered));
                assert_eq!(
                    reparsed.to_string_in(space),
                    rendered,
                    "round trip of {} in {}",
                    sample,
                    space
                );
            }
        }
    }

    #[test]
    fn test_hsl_conversion_sextants() {
        let cases = [
            (0.0, (255, 0, 0)),
            (60.0, (255, 255, 0)),
            (120.0, (0, 255, 0)),
            (180.0, (0, 255, 255)),
            (240.0, (0, 0, 255)),
            (300.0, (255, 0, 255)),
        ];
        for (h, (r, g, b)) in cases {
            let c = Color::from_hsl(h, 1.0, 0.5, 1.0);
            assert!(c.approx_eq(&Color::from_rgb8(r, g, b), TOLERANCE), "hue {}", h);
            let (h2, s2, l2) = c.to_hsl();
            assert!((h2 - h).abs() < 1e-6);
            assert!((s2 - 1.0).abs() < 1e-6);
            assert!((l2 - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_color_space_parse_and_display() {
        for space in [ColorSpace::Hex, ColorSpace::Rgb, ColorSpace::Hsl, ColorSpace::Hwb] {
            assert_eq!(space.to_string().parse::<ColorSpace>().unwrap(), space);
        }
        assert_eq!("HSL".parse::<ColorSpace>().unwrap(), ColorSpace::Hsl);
        assert!("lab".parse::<ColorSpace>().is_err());
    }
}
