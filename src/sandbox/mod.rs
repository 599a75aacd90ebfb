//! Document sandbox surface
//!
//! The host editor exposes a handful of insertion operations to the add-on.
//! [`DocumentSandbox`] models that surface; [`InMemoryDocument`] records what
//! was inserted, and [`render_brand_board`] composes a brand board from a
//! [`BrandProfile`](crate::models::BrandProfile).

pub mod board;
pub mod memory;

pub use board::render_brand_board;
pub use memory::{InMemoryDocument, Node};

use crate::models::HexColor;
use crate::Result;
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Fill color with channels in `0.0..=1.0`, as the host expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgb {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        red: 0.0,
        green: 0.0,
        blue: 0.0,
    };
    pub const WHITE: Rgb = Rgb {
        red: 1.0,
        green: 1.0,
        blue: 1.0,
    };
}

impl From<&HexColor> for Rgb {
    fn from(color: &HexColor) -> Self {
        let (red, green, blue) = color.to_rgb();
        Self { red, green, blue }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Normal,
    Italic,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f32,
    pub font_weight: u16,
    pub font_style: FontStyle,
    pub color: Rgb,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 16.0,
            font_weight: 400,
            font_style: FontStyle::Normal,
            color: Rgb::BLACK,
        }
    }
}

/// Insertion operations offered by the host document.
///
/// Everything is fire-and-forget except [`insert_image`](Self::insert_image),
/// whose completion is awaited. No operation hands back node identities.
#[async_trait]
pub trait DocumentSandbox: Send + Sync {
    fn create_rectangle(&self, rect: Rect, color: Rgb);
    async fn insert_image(&self, blob: &[u8]) -> Result<()>;
    fn insert_text(&self, text: &str, position: Point);
    fn insert_styled_text(&self, text: &str, position: Point, style: &TextStyle);
    fn insert_text_box(&self, text: &str, rect: Rect, background: Rgb, style: &TextStyle);
}
