//! Freehand region and place-label annotation on a blank canvas.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::editor::glyphs::{self, TextAnchor, TextStyle};
use crate::editor::stroke::{self, PaintMode, StrokeStyle};
use crate::editor::TextFontFamily;
use crate::geometry::{Color, MapPoint};
use crate::raster::{self, RasterError};

pub const DEFAULT_MAP_FILE_NAME: &str = "historical-map.json";
const REGION_LINE_WIDTH: u32 = 2;
const PLACE_MARKER_SIZE: u32 = 4;
const PLACE_LABEL_SIZE: f32 = 14.0;
const MIN_REGION_POINTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub path: Vec<MapPoint>,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub position: MapPoint,
}

/// Persisted map: `{ "regions": [...], "places": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapDocument {
    pub regions: Vec<Region>,
    pub places: Vec<Place>,
}

impl MapDocument {
    pub fn to_json(&self) -> AnnotationResult<String> {
        serde_json::to_string(self).map_err(AnnotationError::Serialize)
    }

    pub fn from_json(contents: &str) -> AnnotationResult<Self> {
        serde_json::from_str(contents).map_err(AnnotationError::Parse)
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty() && self.places.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("failed to parse map document: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("failed to serialize map document: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to read map document {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write map document {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Raster(#[from] RasterError),
}

pub type AnnotationResult<T> = std::result::Result<T, AnnotationError>;

/// Region/place editing state for one blank canvas.
#[derive(Debug, Clone)]
pub struct MapCreator {
    width: u32,
    height: u32,
    document: MapDocument,
    draft: Option<Vec<MapPoint>>,
    color: Color,
}

impl MapCreator {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            document: MapDocument::default(),
            draft: None,
            color: Color::BLACK,
        }
    }

    pub fn document(&self) -> &MapDocument {
        &self.document
    }

    pub const fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn is_drawing(&self) -> bool {
        self.draft.is_some()
    }

    pub fn begin_region(&mut self, at: MapPoint) {
        self.draft = Some(vec![at]);
    }

    pub fn extend_region(&mut self, to: MapPoint) {
        if let Some(path) = self.draft.as_mut() {
            path.push(to);
        }
    }

    /// Closes the draft. Paths of two points or fewer are discarded as stray clicks.
    pub fn end_region(&mut self) -> bool {
        let Some(path) = self.draft.take() else {
            return false;
        };
        if path.len() < MIN_REGION_POINTS {
            tracing::debug!(points = path.len(), "region too short; discarded");
            return false;
        }
        self.document.regions.push(Region {
            path,
            color: self.color.to_hex(),
        });
        true
    }

    /// Drops a label at the canvas center. Blank names are ignored.
    pub fn add_place(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        let position = MapPoint::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0);
        self.document.places.push(Place {
            name: name.to_string(),
            position,
        });
        true
    }

    pub fn clear(&mut self) {
        self.document = MapDocument::default();
        self.draft = None;
    }

    pub fn to_json(&self) -> AnnotationResult<String> {
        self.document.to_json()
    }

    /// Replaces regions and places only once the whole document parsed.
    pub fn load_json(&mut self, contents: &str) -> AnnotationResult<()> {
        let document = MapDocument::from_json(contents)?;
        self.document = document;
        self.draft = None;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> AnnotationResult<()> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| AnnotationError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| AnnotationError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "map document saved");
        Ok(())
    }

    pub fn load(&mut self, path: &Path) -> AnnotationResult<()> {
        let contents = fs::read_to_string(path).map_err(|source| AnnotationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_json(&contents)?;
        tracing::info!(
            path = %path.display(),
            regions = self.document.regions.len(),
            places = self.document.places.len(),
            "map document loaded"
        );
        Ok(())
    }

    /// White canvas with region outlines and place names centered on their
    /// position. Without a system font each place gets a dot instead.
    pub fn render(&self) -> AnnotationResult<RgbaImage> {
        let mut canvas = raster::blank_canvas(self.width, self.height)?;
        for region in &self.document.regions {
            let style = StrokeStyle::new(
                Color::parse_css(&region.color),
                REGION_LINE_WIDTH,
                100,
                PaintMode::Over,
            );
            for pair in region.path.windows(2) {
                stroke::paint_segment(&mut canvas, pair[0].to_pixel(), pair[1].to_pixel(), style);
            }
        }

        if self.document.places.is_empty() {
            return Ok(canvas);
        }
        let Some(font) = glyphs::load_system_font(TextFontFamily::Sans, false, false) else {
            tracing::warn!("no system font found; places drawn as dots");
            let marker = StrokeStyle::new(Color::BLACK, PLACE_MARKER_SIZE, 100, PaintMode::Over);
            for place in &self.document.places {
                let at = place.position.to_pixel();
                stroke::paint_segment(&mut canvas, at, at, marker);
            }
            return Ok(canvas);
        };
        for place in &self.document.places {
            let style = TextStyle {
                origin: (place.position.x as f32, place.position.y as f32),
                size: PLACE_LABEL_SIZE,
                anchor: TextAnchor::Center,
                color: Color::BLACK,
                opacity_percent: 100,
            };
            glyphs::paint_text(&mut canvas, &font, &place.name, style);
        }
        Ok(canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn drawn_creator() -> MapCreator {
        let mut creator = MapCreator::new(200, 100);
        creator.set_color(Color::new(0xaa, 0x11, 0x22));
        creator.begin_region(MapPoint::new(10.0, 10.0));
        creator.extend_region(MapPoint::new(40.5, 12.25));
        creator.extend_region(MapPoint::new(30.0, 50.0));
        assert!(creator.end_region());
        assert!(creator.add_place("  Hampi "));
        creator
    }

    #[test]
    fn short_regions_are_discarded() {
        let mut creator = MapCreator::new(50, 50);
        creator.begin_region(MapPoint::new(1.0, 1.0));
        creator.extend_region(MapPoint::new(2.0, 2.0));
        assert!(!creator.end_region());
        assert!(creator.document().regions.is_empty());
        assert!(!creator.is_drawing());
        assert!(!creator.end_region());
    }

    #[test]
    fn region_uses_current_color_and_place_lands_at_center() {
        let creator = drawn_creator();
        let document = creator.document();
        assert_eq!(document.regions.len(), 1);
        assert_eq!(document.regions[0].color, "#aa1122");
        assert_eq!(document.regions[0].path.len(), 3);
        assert_eq!(document.places[0].name, "Hampi");
        assert_eq!(document.places[0].position, MapPoint::new(100.0, 50.0));
    }

    #[test]
    fn blank_place_names_are_ignored() {
        let mut creator = MapCreator::new(10, 10);
        assert!(!creator.add_place("   "));
        assert!(creator.document().places.is_empty());
    }

    #[test]
    fn json_round_trip_is_lossless() {
        let creator = drawn_creator();
        let json = creator.to_json().expect("serialize");

        let mut restored = MapCreator::new(200, 100);
        restored.load_json(&json).expect("parse");
        assert_eq!(restored.document(), creator.document());
    }

    #[test]
    fn json_round_trip_keeps_every_coordinate_bit() {
        let mut document = MapDocument::default();
        let path: Vec<MapPoint> = (1..=64)
            .map(|step| {
                let t = f64::from(step);
                MapPoint::new(t / 3.0 + 0.1, (t * 0.7).sqrt() * 97.13)
            })
            .collect();
        document.regions.push(Region {
            path,
            color: "#102030".to_string(),
        });
        document.places.push(Place {
            name: "Pataliputra".to_string(),
            position: MapPoint::new(0.1 + 0.2, 0.7165097829009918 / 3.0),
        });

        let restored = MapDocument::from_json(&document.to_json().expect("serialize"))
            .expect("parse");
        assert_eq!(restored, document);
        let bits = |doc: &MapDocument| -> Vec<u64> {
            doc.regions[0]
                .path
                .iter()
                .chain(std::iter::once(&doc.places[0].position))
                .flat_map(|point| [point.x.to_bits(), point.y.to_bits()])
                .collect()
        };
        assert_eq!(bits(&restored), bits(&document));
    }

    #[test]
    fn json_uses_documented_field_names() {
        let creator = drawn_creator();
        let value: serde_json::Value =
            serde_json::from_str(&creator.to_json().expect("serialize")).expect("valid json");
        assert_eq!(value["regions"][0]["color"], "#aa1122");
        assert_eq!(value["regions"][0]["path"][1]["x"], 40.5);
        assert_eq!(value["places"][0]["name"], "Hampi");
        assert_eq!(value["places"][0]["position"]["y"], 50.0);
    }

    #[test]
    fn malformed_json_leaves_state_untouched() {
        let mut creator = drawn_creator();
        let before = creator.document().clone();

        for bad in [
            "{not json",
            r#"{"regions": [], "places": [{"name": "x"}]}"#,
            r##"{"regions": [{"path": [{"x": 1}], "color": "#000000"}], "places": []}"##,
        ] {
            let err = creator.load_json(bad).expect_err("should fail");
            assert!(matches!(err, AnnotationError::Parse(_)));
            assert_eq!(creator.document(), &before);
        }
    }

    #[test]
    fn clear_removes_regions_and_places() {
        let mut creator = drawn_creator();
        creator.clear();
        assert!(creator.document().is_empty());
    }

    #[test]
    fn save_and_load_file_round_trip() {
        let creator = drawn_creator();
        let path = std::env::temp_dir().join(format!(
            "mapsketch-annotation-{}-{}.json",
            std::process::id(),
            "round-trip"
        ));
        creator.save(&path).expect("save");

        let mut restored = MapCreator::new(200, 100);
        restored.load(&path).expect("load");
        assert_eq!(restored.document(), creator.document());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_missing_file_reports_read_error() {
        let mut creator = MapCreator::new(10, 10);
        let err = creator
            .load(Path::new("/nonexistent/mapsketch/map.json"))
            .expect_err("missing file");
        assert!(matches!(err, AnnotationError::Read { .. }));
    }

    #[test]
    fn render_strokes_region_in_its_color() {
        let creator = drawn_creator();
        let canvas = creator.render().expect("render");
        assert_eq!(canvas.dimensions(), (200, 100));
        assert_eq!(*canvas.get_pixel(20, 10), Rgba([0xaa, 0x11, 0x22, 255]));
        assert_eq!(*canvas.get_pixel(150, 90), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn render_marks_places_around_their_position() {
        let creator = drawn_creator();
        let canvas = creator.render().expect("render");
        let white = Rgba([255, 255, 255, 255]);

        // "Hampi" sits centered on (100, 50) with its baseline on y = 50.
        let label_ink = (80..=120)
            .flat_map(|x| (34..=53).map(move |y| (x, y)))
            .filter(|&(x, y)| *canvas.get_pixel(x, y) != white)
            .count();
        assert!(label_ink > 0);
        assert!((0..200).all(|x| *canvas.get_pixel(x, 95) == white));
    }
}
