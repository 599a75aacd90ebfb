use super::{DocumentSandbox, FontStyle, Point, Rect, Rgb, TextStyle};
use crate::models::BrandProfile;
use crate::Result;

const MARGIN: f32 = 40.0;
const SWATCH: f32 = 120.0;
const SWATCH_GAP: f32 = 20.0;
const CARD_WIDTH: f32 = 330.0;
const CARD_HEIGHT: f32 = 90.0;
const LIGHT_GREY: Rgb = Rgb {
    red: 0.96,
    green: 0.96,
    blue: 0.97,
};

/// Lay out a brand board: heading, palette swatches with hex labels, the
/// brand voice and the guidelines as a grid of cards. The reference
/// screenshot, if any, is inserted last.
pub async fn render_brand_board(sandbox: &dyn DocumentSandbox, profile: &BrandProfile) -> Result<()> {
    let font_family = profile
        .typography
        .as_ref()
        .and_then(|typography| typography.primary_font.clone());
    let accent = profile
        .primary_colors
        .first()
        .map(Rgb::from)
        .unwrap_or(Rgb::BLACK);

    let heading = TextStyle {
        font_family: font_family.clone(),
        font_size: 32.0,
        font_weight: 700,
        color: accent,
        ..TextStyle::default()
    };
    let label = TextStyle {
        font_family: font_family.clone(),
        font_size: 14.0,
        ..TextStyle::default()
    };
    let body = TextStyle {
        font_family,
        font_size: 16.0,
        ..TextStyle::default()
    };

    sandbox.insert_styled_text("Brand Board", Point { x: MARGIN, y: MARGIN }, &heading);

    let swatch_y = MARGIN + 60.0;
    for (i, color) in profile.primary_colors.iter().enumerate() {
        let x = MARGIN + i as f32 * (SWATCH + SWATCH_GAP);
        sandbox.create_rectangle(Rect::new(x, swatch_y, SWATCH, SWATCH), Rgb::from(color));
        sandbox.insert_styled_text(
            color.as_str(),
            Point {
                x,
                y: swatch_y + SWATCH + 10.0,
            },
            &label,
        );
    }

    let voice_y = swatch_y + SWATCH + 50.0;
    let voice_style = TextStyle {
        font_style: FontStyle::Italic,
        ..body.clone()
    };
    sandbox.insert_text_box(
        &profile.brand_voice,
        Rect::new(MARGIN, voice_y, 2.0 * CARD_WIDTH + SWATCH_GAP, CARD_HEIGHT),
        LIGHT_GREY,
        &voice_style,
    );

    let grid_y = voice_y + CARD_HEIGHT + SWATCH_GAP;
    for (i, guideline) in profile.design_guidelines.iter().enumerate() {
        let column = (i % 2) as f32;
        let row = (i / 2) as f32;
        sandbox.insert_text_box(
            guideline,
            Rect::new(
                MARGIN + column * (CARD_WIDTH + SWATCH_GAP),
                grid_y + row * (CARD_HEIGHT + SWATCH_GAP),
                CARD_WIDTH,
                CARD_HEIGHT,
            ),
            LIGHT_GREY,
            &body,
        );
    }

    if let Some(reference) = &profile.reference_screenshot {
        sandbox.insert_image(reference).await?;
    }

    tracing::info!(
        "Rendered brand board with {} colors and {} guidelines",
        profile.primary_colors.len(),
        profile.design_guidelines.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HexColor, Typography};
    use crate::sandbox::{InMemoryDocument, Node};

    fn profile() -> BrandProfile {
        BrandProfile {
            primary_colors: ["#635BFF", "#0A2540", "#00D4FF"]
                .iter()
                .filter_map(|c| HexColor::parse(c))
                .collect(),
            brand_voice: "Confident, precise and developer friendly".to_string(),
            design_guidelines: vec![
                "Generous whitespace".to_string(),
                "Soft gradients".to_string(),
                "Crisp typography".to_string(),
                "Minimal iconography".to_string(),
            ],
            typography: Some(Typography {
                primary_font: Some("Inter".to_string()),
                ..Typography::default()
            }),
            spacing: None,
            layout_patterns: None,
            reference_screenshot: None,
        }
    }

    #[tokio::test]
    async fn test_board_layout() {
        let doc = InMemoryDocument::new();
        render_brand_board(&doc, &profile()).await.unwrap();

        let nodes = doc.nodes();
        let swatches: Vec<&Node> = nodes
            .iter()
            .filter(|node| matches!(node, Node::Rectangle { .. }))
            .collect();
        let boxes = nodes
            .iter()
            .filter(|node| matches!(node, Node::TextBox { .. }))
            .count();

        assert_eq!(swatches.len(), 3);
        // Voice plus four guideline cards.
        assert_eq!(boxes, 5);
        assert!(nodes.iter().any(|node| matches!(
            node,
            Node::Text { text, style: Some(style), .. }
                if text == "#0A2540" && style.font_family.as_deref() == Some("Inter")
        )));
        assert!(matches!(
            swatches[0],
            Node::Rectangle { fill, .. } if *fill == Rgb::from(&profile().primary_colors[0])
        ));
    }

    #[tokio::test]
    async fn test_board_inserts_reference_screenshot() {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]));
        let mut png = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let mut brand = profile();
        brand.reference_screenshot = Some(png);
        let doc = InMemoryDocument::new();
        render_brand_board(&doc, &brand).await.unwrap();

        assert!(matches!(doc.nodes().last(), Some(Node::Image { .. })));
    }
}
