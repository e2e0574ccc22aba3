/// A named unit of test markup resolved from a repository.
///
/// Documents are immutable: the repository builds one per resolved page and
/// the engine consumes it without mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    name: String,
    content: String,
}

impl Document {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// The hierarchical page name, e.g. `SuiteA.SubSuite.CaseB`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}
