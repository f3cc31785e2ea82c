//! Editable source buffers
//!
//! Three independent plain-text buffers (markup, style, script) owned by the
//! session. They are mutated either directly by the editing surface or by the
//! generation orchestrator's partial updates, and live for the whole session.

use serde::{Deserialize, Serialize};

/// Seed markup for a fresh project
pub const DEFAULT_MARKUP: &str = r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>Preview</title>
  </head>
  <body>
    <div id="app">Hello from Vocalsite</div>
  </body>
</html>"#;

/// Seed stylesheet for a fresh project
pub const DEFAULT_STYLE: &str = "body { font-family: Arial, sans-serif; padding: 40px; background: #f7f7f7; }\n#app { max-width: 900px; margin: 0 auto; }\n";

/// Seed script for a fresh project
pub const DEFAULT_SCRIPT: &str = "// You can add JS here\nconsole.log('Preview running')";

/// Which of the three source buffers an operation targets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BufferKind {
    Markup,
    Style,
    Script,
}

/// The three editable source buffers for one site
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBuffers {
    pub markup: String,
    pub style: String,
    pub script: String,
}

impl Default for SourceBuffers {
    fn default() -> Self {
        Self {
            markup: DEFAULT_MARKUP.to_string(),
            style: DEFAULT_STYLE.to_string(),
            script: DEFAULT_SCRIPT.to_string(),
        }
    }
}

impl SourceBuffers {
    /// Empty buffers (no seed content)
    pub fn empty() -> Self {
        Self {
            markup: String::new(),
            style: String::new(),
            script: String::new(),
        }
    }

    /// Read one buffer by kind
    pub fn get(&self, kind: BufferKind) -> &str {
        match kind {
            BufferKind::Markup => &self.markup,
            BufferKind::Style => &self.style,
            BufferKind::Script => &self.script,
        }
    }

    /// Replace one buffer by kind
    pub fn set(&mut self, kind: BufferKind, text: String) {
        match kind {
            BufferKind::Markup => self.markup = text,
            BufferKind::Style => self.style = text,
            BufferKind::Script => self.script = text,
        }
    }
}
