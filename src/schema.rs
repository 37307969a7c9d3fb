//! Machine-readable description of the watermark parameters, for agent/tool integrations.

use serde::Serialize;
use serde_json::{Value, json};

use crate::foundation::core::Anchor;
use crate::watermark::spec::{
    DEFAULT_MARGIN, DEFAULT_OPACITY, DEFAULT_SCALE, DEFAULT_TEXT_SIZE, MAX_SCALE, MIN_SCALE,
};

/// Tool definition in the `name` / `description` / `input_schema` shape.
///
/// Apart from `base` and `out`, property names are the [`WatermarkConfig`](crate::WatermarkConfig)
/// keys, which are also the `apply` flag names with `-` for `_`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: InputSchema,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputSchema {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub properties: Value,
    pub required: Vec<&'static str>,
}

pub fn tool_definition() -> ToolDefinition {
    let positions: Vec<&str> = Anchor::ALL.iter().map(|a| a.name()).collect();

    ToolDefinition {
        name: "watermark_image",
        description: "Overlay a text, PNG/JPEG or SVG watermark onto an image and save the result in the image's own format.",
        input_schema: InputSchema {
            kind: "object",
            properties: json!({
                "base": {
                    "type": "string",
                    "description": "Path to the PNG or JPEG image to watermark."
                },
                "out": {
                    "type": "string",
                    "description": "Output file or directory."
                },
                "text": {
                    "type": "string",
                    "description": "Text to use as watermark. Cannot be used with image."
                },
                "image": {
                    "type": "string",
                    "description": "Path to a PNG, JPEG or SVG watermark. Cannot be used with text."
                },
                "position": {
                    "type": "string",
                    "description": format!("Watermark position. Default: '{}'.", Anchor::default()),
                    "enum": positions,
                },
                "opacity": {
                    "type": "number",
                    "description": format!("Opacity of the watermark (0.0-1.0). Default: {DEFAULT_OPACITY}."),
                    "minimum": 0.0,
                    "maximum": 1.0,
                },
                "margin": {
                    "type": "integer",
                    "description": format!("Margin from the anchored edges in pixels. Default: {DEFAULT_MARGIN}."),
                    "minimum": 0,
                },
                "text_size": {
                    "type": "integer",
                    "description": format!("Font size for text watermarks. Default: {DEFAULT_TEXT_SIZE}."),
                    "minimum": 1,
                },
                "text_color": {
                    "type": "string",
                    "description": "Hex color for text watermarks (e.g. '#FFFFFF'). Default: '#FFFFFF'."
                },
                "scale": {
                    "type": "number",
                    "description": format!("Image watermark width as a fraction of the base image width. Default: {DEFAULT_SCALE}."),
                    "minimum": MIN_SCALE,
                    "maximum": MAX_SCALE,
                },
            }),
            required: vec!["base", "out"],
        },
    }
}

/// [`tool_definition`] as pretty-printed JSON.
pub fn tool_definition_json() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&tool_definition())
}
