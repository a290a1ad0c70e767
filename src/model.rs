//! Newsletter records handed over by the data layer.

/// A stored newsletter as far as rendering is concerned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
pub struct Newsletter {
    /// Raw HTML body of the email, untrusted.
    pub content: Option<String>,
    /// Subject line, used as the document title.
    pub title: Option<String>,
}

impl Newsletter {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Whether there is any non-blank content to render.
    pub fn has_content(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.trim().is_empty())
    }
}
