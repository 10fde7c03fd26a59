use serde::{Deserialize, Serialize};

/// Blank line placed between emitted sections
pub const SECTION_SEPARATOR: &str = "\n\n";

/// Independently omittable chunk of the assembled output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Instruction line emitted above the body
    #[serde(default)]
    pub header: Option<String>,
    pub body: String,
}

impl Section {
    pub fn new(header: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            header: Some(header.into()),
            body: body.into(),
        }
    }

    /// Section without a header
    pub fn untitled(body: impl Into<String>) -> Self {
        Self {
            header: None,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    fn render(&self) -> String {
        match &self.header {
            Some(header) => format!("{header}\n{}", self.body),
            None => self.body.clone(),
        }
    }
}

/// Concatenate sections in the given order
///
/// A section with an empty body contributes nothing, not even its header or a
/// separator. Order is significant: callers put the sections least likely to
/// change between requests first so consecutive outputs share a long prefix.
#[must_use]
pub fn assemble(sections: &[Section]) -> String {
    sections
        .iter()
        .filter(|section| !section.is_empty())
        .map(Section::render)
        .collect::<Vec<_>>()
        .join(SECTION_SEPARATOR)
}
