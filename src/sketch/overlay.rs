use crate::sketch::model::Position;
use crate::sketch::typeset::TypesetHandle;

/// A recognized expression and its value, shown as a draggable label.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: usize,
    pub expression: String,
    pub value: String,
    pub position: Position,
    /// Output of the typesetting engine, once it has run for this label.
    pub rendered: Option<String>,
}

impl Annotation {
    pub fn latex(&self) -> String {
        format!("\\(\\LARGE{{{} = {}}}\\)", self.expression, self.value)
    }

    /// Typeset text when available, raw LaTeX otherwise.
    pub fn display_text(&self) -> String {
        self.rendered.clone().unwrap_or_else(|| self.latex())
    }
}

/// Ordered collection of result annotations. Append-only apart from a full
/// reset; positions change only through [`OverlayManager::reposition`].
#[derive(Debug, Default)]
pub struct OverlayManager {
    annotations: Vec<Annotation>,
    next_id: usize,
}

impl OverlayManager {
    pub fn add(
        &mut self,
        expression: impl Into<String>,
        value: impl Into<String>,
        position: Position,
    ) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        self.annotations.push(Annotation {
            id,
            expression: expression.into(),
            value: value.into(),
            position,
            rendered: None,
        });
        id
    }

    pub fn reposition(&mut self, id: usize, position: Position) -> bool {
        match self.annotations.iter_mut().find(|a| a.id == id) {
            Some(annotation) => {
                annotation.position = position;
                true
            }
            None => {
                tracing::warn!(id, "reposition requested for unknown annotation");
                false
            }
        }
    }

    pub fn clear_all(&mut self) {
        self.annotations.clear();
        self.next_id = 0;
    }

    pub fn get(&self, id: usize) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Ask the engine to typeset every label that has no rendering yet.
    /// Silently does nothing while the engine is not loaded. Returns how many
    /// labels were typeset.
    pub fn request_typeset(&mut self, engine: &TypesetHandle) -> usize {
        if !engine.is_ready() {
            tracing::debug!("typesetting engine not ready; skipping request");
            return 0;
        }
        let mut typeset = 0;
        for annotation in self.annotations.iter_mut().filter(|a| a.rendered.is_none()) {
            annotation.rendered = engine.typeset(&annotation.latex());
            typeset += 1;
        }
        typeset
    }
}
