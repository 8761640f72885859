//! Optional display hints attached to a generation request.

use serde::{Deserialize, Serialize};

use super::Template;

/// Style hints. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(
        default,
        alias = "creativity",
        alias = "creativity_level",
        skip_serializing_if = "Option::is_none"
    )]
    pub creativity_level: Option<CreativityLevel>,
}

impl StyleParameters {
    /// The template named by the `template` hint, `Generic` when absent.
    pub fn template(&self) -> Template {
        self.template
            .as_deref()
            .map(Template::from_tag)
            .unwrap_or(Template::Generic)
    }

    /// Sampling temperature implied by the creativity hint.
    pub fn temperature(&self) -> Option<f32> {
        self.creativity_level.as_ref().and_then(CreativityLevel::temperature)
    }
}

/// Creativity hint: either a named level or a raw temperature.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CreativityLevel {
    Numeric(f32),
    Named(String),
}

impl CreativityLevel {
    /// Map to a sampling temperature in `0.0..=2.0`.
    ///
    /// Unrecognized names yield `None` so providers keep their own default.
    pub fn temperature(&self) -> Option<f32> {
        match self {
            CreativityLevel::Numeric(v) if v.is_finite() => Some(v.clamp(0.0, 2.0)),
            CreativityLevel::Numeric(_) => None,
            CreativityLevel::Named(name) => match name.trim().to_lowercase().as_str() {
                "low" | "conservative" => Some(0.3),
                "medium" | "balanced" | "normal" => Some(0.7),
                "high" | "creative" | "wild" => Some(1.0),
                _ => None,
            },
        }
    }

    /// Human-readable label for prompt text.
    pub fn label(&self) -> String {
        match self {
            CreativityLevel::Numeric(v) => format!("{:.1}", v),
            CreativityLevel::Named(name) => name.trim().to_lowercase(),
        }
    }
}
