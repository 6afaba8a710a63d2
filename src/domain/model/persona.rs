//! Conversational persona: the voice the assistant speaks with.

use serde::{Deserialize, Serialize};

/// Conversational style presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PersonaStyle {
    #[default]
    Professional,
    Friendly,
    Casual,
    Empathetic,
    /// Uses `custom_prompt` verbatim instead of a preset.
    Custom,
}

/// Persona configuration rendered into the system prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationPersona {
    pub style: PersonaStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub behaviors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restrictions: Vec<String>,
    /// Full prompt override, used verbatim when `style` is `Custom`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
}

impl ConversationPersona {
    pub fn new(style: PersonaStyle) -> Self {
        Self {
            style,
            ..Default::default()
        }
    }

    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = Some(tone.into());
        self
    }

    pub fn with_behaviors(mut self, behaviors: Vec<String>) -> Self {
        self.behaviors = behaviors;
        self
    }

    pub fn with_restrictions(mut self, restrictions: Vec<String>) -> Self {
        self.restrictions = restrictions;
        self
    }

    pub fn with_custom_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.style = PersonaStyle::Custom;
        self.custom_prompt = Some(prompt.into());
        self
    }

    /// Renders the persona section of a system prompt.
    ///
    /// Custom personas use their prompt verbatim; tone, behaviors and
    /// restrictions are appended for every style when present.
    pub fn render(&self) -> String {
        let mut out = String::new();

        match self.style {
            PersonaStyle::Custom => match &self.custom_prompt {
                Some(prompt) => out.push_str(prompt),
                // Missing custom prompt degrades to the professional preset.
                None => out.push_str(Self::preset_text(PersonaStyle::Professional)),
            },
            style => out.push_str(Self::preset_text(style)),
        }

        if let Some(tone) = &self.tone {
            out.push_str(&format!("\nTone: {}", tone));
        }
        if !self.behaviors.is_empty() {
            out.push_str("\nAlways:");
            for behavior in &self.behaviors {
                out.push_str(&format!("\n- {}", behavior));
            }
        }
        if !self.restrictions.is_empty() {
            out.push_str("\nNever:");
            for restriction in &self.restrictions {
                out.push_str(&format!("\n- {}", restriction));
            }
        }

        out
    }

    fn preset_text(style: PersonaStyle) -> &'static str {
        match style {
            PersonaStyle::Professional => {
                "Maintain a professional, courteous manner. Be precise and respectful of the user's time."
            }
            PersonaStyle::Friendly => {
                "Be warm and approachable. Use plain language and make the user feel welcome."
            }
            PersonaStyle::Casual => {
                "Keep it relaxed and conversational, like chatting with a colleague."
            }
            PersonaStyle::Empathetic => {
                "Acknowledge the user's situation and feelings before moving on. Be patient and supportive."
            }
            PersonaStyle::Custom => "",
        }
    }
}
