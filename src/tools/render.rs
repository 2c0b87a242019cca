use std::fmt;

use serde::Serialize;

/// A labeled, read-only view of a tool result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub title: String,
    pub subtitle: Option<String>,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Entry {
    Field { label: String, value: String },
    Item(String),
    Note(String),
    /// Marks the start of a new card inside a section.
    Break,
}

pub trait Render {
    fn render(&self) -> Report;
}

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_domain(mut self, domain: &str) -> Self {
        self.subtitle = Some(format!("Domain: {}", domain));
        self
    }

    /// Adds the section unless it is empty.
    pub fn push(&mut self, section: Section) {
        if !section.entries.is_empty() {
            self.sections.push(section);
        }
    }

    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            entries: Vec::new(),
        }
    }

    pub fn field(&mut self, label: &str, value: impl fmt::Display) -> &mut Self {
        self.entries.push(Entry::Field {
            label: label.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Adds a field, rendering a missing value as `N/A`.
    pub fn field_or_na(&mut self, label: &str, value: Option<&str>) -> &mut Self {
        let value = value.filter(|v| !v.is_empty()).unwrap_or("N/A");
        self.field(label, value)
    }

    pub fn item(&mut self, item: impl Into<String>) -> &mut Self {
        self.entries.push(Entry::Item(item.into()));
        self
    }

    pub fn note(&mut self, note: impl Into<String>) -> &mut Self {
        self.entries.push(Entry::Note(note.into()));
        self
    }

    pub fn card_break(&mut self) -> &mut Self {
        if !self.entries.is_empty() {
            self.entries.push(Entry::Break);
        }
        self
    }

    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.entries.iter().find_map(|entry| match entry {
            Entry::Field { label: l, value } if l == label => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Field { label, value } => Some((label.as_str(), value.as_str())),
            _ => None,
        })
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        if let Some(subtitle) = &self.subtitle {
            writeln!(f, "{}", subtitle)?;
        }

        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "## {}", section.title)?;
            for entry in &section.entries {
                match entry {
                    Entry::Field { label, value } => {
                        // Multi-line values are indented under their label.
                        let mut lines = value.lines();
                        writeln!(f, "{}: {}", label, lines.next().unwrap_or(""))?;
                        for line in lines {
                            writeln!(f, "    {}", line)?;
                        }
                    }
                    Entry::Item(item) => writeln!(f, "- {}", item)?,
                    Entry::Note(note) => writeln!(f, "({})", note)?,
                    Entry::Break => writeln!(f)?,
                }
            }
        }

        Ok(())
    }
}
