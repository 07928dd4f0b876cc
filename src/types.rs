//! Domain types for generated ideas and blueprints.
//!
//! The generator's output shape is not contractually guaranteed, so these
//! types are deliberately tolerant: every field defaults, unknown
//! difficulty strings coerce, and blueprints keep whatever extra fields
//! the model invented.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Difficulty tier attached to a generated project idea.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Canonical wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    /// Case-insensitive parse; anything outside the advertised set lands
    /// on the default tier.
    fn parse_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" | "easy" => Difficulty::Beginner,
            "advanced" | "hard" | "expert" => Difficulty::Advanced,
            _ => Difficulty::Intermediate,
        }
    }
}

impl Serialize for Difficulty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Difficulty::parse_loose(&s))
    }
}

/// One generated project idea.
///
/// Every field defaults so a sparse object from the generator still
/// deserializes; missing ids are back-filled positionally by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectIdea {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub difficulty: Difficulty,

    #[serde(default)]
    pub tech_stack: Vec<String>,
}

impl ProjectIdea {
    /// Fill empty `id` fields with stable positional ids (`idea-1`, ...).
    pub fn fill_missing_ids(ideas: &mut [ProjectIdea]) {
        for (i, idea) in ideas.iter_mut().enumerate() {
            if idea.id.is_empty() {
                idea.id = format!("idea-{}", i + 1);
            }
        }
    }
}

/// A generated project blueprint.
///
/// The well-known sections are surfaced as optional fields under the
/// generator's camelCase names; everything else the model produced is
/// preserved in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Blueprint {
    pub summary: String,

    #[serde(rename = "costEstimate", skip_serializing_if = "Option::is_none")]
    pub cost_estimate: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<Value>,

    #[serde(rename = "mockUI", skip_serializing_if = "Option::is_none")]
    pub mock_ui: Option<Value>,

    #[serde(rename = "pitchDeck", skip_serializing_if = "Option::is_none")]
    pub pitch_deck: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Blueprint {
    /// Safe default substituted when extraction fails: placeholder summary,
    /// all sections absent.
    pub fn placeholder(idea: &str) -> Self {
        Self {
            summary: format!("Blueprint for \"{}\" could not be generated.", idea),
            ..Self::default()
        }
    }
}
