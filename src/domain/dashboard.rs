// Dashboard view model produced by the presentation layer
use super::panel::Panel;
use serde::Serialize;
use std::fmt;

/// Display colour band for a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Good,
    Warning,
    Critical,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub label: String,
    pub value: String,
}

impl Field {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub band: Band,
    pub fields: Vec<Field>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl Section {
    pub fn new(id: &str, title: &str, band: Band) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            band,
            fields: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn field(mut self, label: &str, value: impl Into<String>) -> Self {
        self.fields.push(Field::new(label, value));
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub title: String,
    pub version: u64,
    pub panel: Panel,
    pub menu_open: bool,
    pub power_save: bool,
    pub sections: Vec<Section>,
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} [{}]", self.title, self.panel.title())?;
        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "== {} ({:?})", section.title, section.band)?;
            for field in &section.fields {
                writeln!(f, "  {}: {}", field.label, field.value)?;
            }
            for note in &section.notes {
                writeln!(f, "  - {}", note)?;
            }
        }
        Ok(())
    }
}
