//! Script builders.

use std::sync::Arc;

use mathviz_narration::domain::script::{
    Line, LineMeta, NarrationScript, Section, SectionKind, Trigger,
};

/// Builds scripts line by line. Every line's text is `"line <id>"`.
#[derive(Debug, Clone)]
pub struct ScriptBuilder {
    script: NarrationScript,
}

impl ScriptBuilder {
    /// Starts a script with the given id and no sections.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self {
            script: NarrationScript {
                id: id.to_owned(),
                title: format!("Course {id}"),
                subtitle: None,
                difficulty: None,
                target_age: None,
                objectives: Vec::new(),
                prerequisites: Vec::new(),
                sections: Vec::new(),
            },
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: &str) -> Self {
        self.script.title = title.to_owned();
        self
    }

    /// Appends a section with no trigger.
    #[must_use]
    pub fn section(self, id: &str, line_ids: &[&str]) -> Self {
        self.push_section(id, None, line_ids)
    }

    /// Appends a section whose lines default to `trigger`.
    #[must_use]
    pub fn timed_section(self, id: &str, trigger: Trigger, line_ids: &[&str]) -> Self {
        self.push_section(id, Some(trigger), line_ids)
    }

    /// Overrides the trigger of the last line added.
    #[must_use]
    pub fn with_line_trigger(mut self, trigger: Trigger) -> Self {
        if let Some(line) = self
            .script
            .sections
            .last_mut()
            .and_then(|s| s.lines.last_mut())
        {
            line.trigger = Some(trigger);
        }
        self
    }

    /// Finishes the script.
    #[must_use]
    pub fn build(self) -> NarrationScript {
        self.script
    }

    /// Finishes the script behind an `Arc`.
    #[must_use]
    pub fn shared(self) -> Arc<NarrationScript> {
        Arc::new(self.script)
    }

    fn push_section(mut self, id: &str, trigger: Option<Trigger>, line_ids: &[&str]) -> Self {
        self.script.sections.push(Section {
            id: id.to_owned(),
            kind: SectionKind::from(id.to_owned()),
            title: None,
            trigger,
            lines: line_ids
                .iter()
                .map(|line_id| Line {
                    id: (*line_id).to_owned(),
                    text: format!("line {line_id}"),
                    trigger: None,
                    meta: LineMeta::default(),
                })
                .collect(),
        });
        self
    }
}

/// `demo`: section `a` with lines `a1`, `a2`; section `b` with line `b1`.
#[must_use]
pub fn demo_script() -> NarrationScript {
    ScriptBuilder::new("demo")
        .section("a", &["a1", "a2"])
        .section("b", &["b1"])
        .build()
}
