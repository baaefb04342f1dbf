use image::RgbaImage;

/// Adjustment value meaning "leave this channel property alone".
pub const NEUTRAL_ADJUSTMENT: i32 = 100;

const LUMA_R: f64 = 0.299;
const LUMA_G: f64 = 0.587;
const LUMA_B: f64 = 0.114;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterPreset {
    #[default]
    None,
    Grayscale,
    Sepia,
    Invert,
}

impl FilterPreset {
    pub const ALL: [Self; 4] = [Self::None, Self::Grayscale, Self::Sepia, Self::Invert];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Grayscale => "grayscale",
            Self::Sepia => "sepia",
            Self::Invert => "invert",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str().eq_ignore_ascii_case(value.trim()))
    }

    fn apply(self, r: f64, g: f64, b: f64) -> (f64, f64, f64) {
        match self {
            Self::None => (r, g, b),
            Self::Grayscale => {
                let luminance = luminance(r, g, b);
                (luminance, luminance, luminance)
            }
            Self::Sepia => (
                (0.393 * r + 0.769 * g + 0.189 * b).min(255.0),
                (0.349 * r + 0.686 * g + 0.168 * b).min(255.0),
                (0.272 * r + 0.534 * g + 0.131 * b).min(255.0),
            ),
            Self::Invert => (255.0 - r, 255.0 - g, 255.0 - b),
        }
    }
}

/// Manual adjustments and preset selected for the captured image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterState {
    brightness: i32,
    contrast: i32,
    saturation: i32,
    preset: FilterPreset,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterState {
    pub const fn new() -> Self {
        Self {
            brightness: NEUTRAL_ADJUSTMENT,
            contrast: NEUTRAL_ADJUSTMENT,
            saturation: NEUTRAL_ADJUSTMENT,
            preset: FilterPreset::None,
        }
    }

    pub const fn brightness(&self) -> i32 {
        self.brightness
    }

    pub const fn contrast(&self) -> i32 {
        self.contrast
    }

    pub const fn saturation(&self) -> i32 {
        self.saturation
    }

    pub const fn preset(&self) -> FilterPreset {
        self.preset
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::new()
    }

    /// Selecting a real preset discards the manual adjustments.
    pub fn set_preset(&mut self, preset: FilterPreset) {
        self.preset = preset;
        if preset != FilterPreset::None {
            self.brightness = NEUTRAL_ADJUSTMENT;
            self.contrast = NEUTRAL_ADJUSTMENT;
            self.saturation = NEUTRAL_ADJUSTMENT;
        }
    }

    pub fn set_brightness(&mut self, value: i32) {
        self.brightness = value;
    }

    pub fn set_contrast(&mut self, value: i32) {
        self.contrast = value;
    }

    pub fn set_saturation(&mut self, value: i32) {
        self.saturation = value;
    }

    /// Slider controls report offsets around zero.
    pub fn set_brightness_offset(&mut self, offset: i32) {
        self.brightness = offset.saturating_add(NEUTRAL_ADJUSTMENT);
    }

    pub fn set_contrast_offset(&mut self, offset: i32) {
        self.contrast = offset.saturating_add(NEUTRAL_ADJUSTMENT);
    }

    pub fn set_saturation_offset(&mut self, offset: i32) {
        self.saturation = offset.saturating_add(NEUTRAL_ADJUSTMENT);
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn transform(&self, r: u8, g: u8, b: u8) -> [u8; 3] {
        let (mut r, mut g, mut b) = self.preset.apply(f64::from(r), f64::from(g), f64::from(b));

        if self.brightness != NEUTRAL_ADJUSTMENT {
            let shift =
                255.0 * ((f64::from(self.brightness) - f64::from(NEUTRAL_ADJUSTMENT)) / 100.0);
            r += shift;
            g += shift;
            b += shift;
        }

        if self.contrast != NEUTRAL_ADJUSTMENT {
            let factor = ((f64::from(self.contrast) + 100.0) / 200.0).powi(2);
            r = (r - 128.0) * factor + 128.0;
            g = (g - 128.0) * factor + 128.0;
            b = (b - 128.0) * factor + 128.0;
        }

        if self.saturation != NEUTRAL_ADJUSTMENT {
            let luminance = luminance(r, g, b);
            let factor = f64::from(self.saturation) / 100.0;
            r = luminance + (r - luminance) * factor;
            g = luminance + (g - luminance) * factor;
            b = luminance + (b - luminance) * factor;
        }

        [to_channel(r), to_channel(g), to_channel(b)]
    }
}

/// Recomputes the filtered image from `original`; output never feeds back in.
///
/// Stages run preset, brightness, contrast, saturation, each reading the
/// previous stage's unclamped result. Alpha passes through.
pub fn apply_filters(original: &RgbaImage, state: &FilterState) -> RgbaImage {
    let mut output = original.clone();
    if state.is_neutral() {
        return output;
    }

    for pixel in output.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        let [nr, ng, nb] = state.transform(r, g, b);
        pixel.0[0] = nr;
        pixel.0[1] = ng;
        pixel.0[2] = nb;
    }
    output
}

fn luminance(r: f64, g: f64, b: f64) -> f64 {
    LUMA_R * r + LUMA_G * g + LUMA_B * b
}

fn to_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
