use super::{DocumentSandbox, Point, Rect, Rgb, TextStyle};
use crate::{Error, Result};
use async_trait::async_trait;
use image::GenericImageView;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Node {
    Rectangle {
        id: Uuid,
        rect: Rect,
        fill: Rgb,
    },
    Image {
        id: Uuid,
        width: u32,
        height: u32,
        bytes: usize,
    },
    Text {
        id: Uuid,
        text: String,
        position: Point,
        style: Option<TextStyle>,
    },
    /// Background rectangle and text inserted as one group.
    TextBox {
        id: Uuid,
        text: String,
        rect: Rect,
        background: Rgb,
        style: TextStyle,
    },
}

/// [`DocumentSandbox`] that keeps inserted nodes in insertion order.
#[derive(Clone, Default)]
pub struct InMemoryDocument {
    nodes: Arc<Mutex<Vec<Node>>>,
}

impl InMemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> Vec<Node> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Node>> {
        self.nodes.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn push(&self, node: Node) {
        self.lock().push(node);
    }
}

#[async_trait]
impl DocumentSandbox for InMemoryDocument {
    fn create_rectangle(&self, rect: Rect, color: Rgb) {
        self.push(Node::Rectangle {
            id: Uuid::new_v4(),
            rect,
            fill: color,
        });
    }

    async fn insert_image(&self, blob: &[u8]) -> Result<()> {
        if blob.is_empty() {
            return Err(Error::Validation("Image blob is empty".to_string()));
        }
        let (width, height) = image::load_from_memory(blob)?.dimensions();
        self.push(Node::Image {
            id: Uuid::new_v4(),
            width,
            height,
            bytes: blob.len(),
        });
        Ok(())
    }

    fn insert_text(&self, text: &str, position: Point) {
        self.push(Node::Text {
            id: Uuid::new_v4(),
            text: text.to_string(),
            position,
            style: None,
        });
    }

    fn insert_styled_text(&self, text: &str, position: Point, style: &TextStyle) {
        self.push(Node::Text {
            id: Uuid::new_v4(),
            text: text.to_string(),
            position,
            style: Some(style.clone()),
        });
    }

    fn insert_text_box(&self, text: &str, rect: Rect, background: Rgb, style: &TextStyle) {
        self.push(Node::TextBox {
            id: Uuid::new_v4(),
            text: text.to_string(),
            rect,
            background,
            style: style.clone(),
        });
    }
}
