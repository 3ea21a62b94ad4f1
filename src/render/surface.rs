use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::render::{Attributes, TransitionSpec};

/// Handle to one element created on a [`Surface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shape family of a visual element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Rect,
    Circle,
    Path,
    Region,
}

/// Drawing capability every chart renders through.
///
/// The diff engine owns transition timing and pushes each interpolated frame
/// with [`Surface::set_attributes`]; `schedule_transition` and
/// `cancel_transitions` are notifications a backend with its own animation
/// clock may act on instead.
pub trait Surface {
    fn create_element(&mut self, kind: ElementKind, key: &str) -> ChartResult<ElementId>;

    fn set_attributes(&mut self, id: ElementId, attributes: &Attributes) -> ChartResult<()>;

    fn schedule_transition(
        &mut self,
        _id: ElementId,
        _target: &Attributes,
        _spec: TransitionSpec,
    ) -> ChartResult<()> {
        Ok(())
    }

    fn cancel_transitions(&mut self, _id: ElementId) -> ChartResult<()> {
        Ok(())
    }

    /// Moves an element above its siblings.
    fn raise_element(&mut self, _id: ElementId) -> ChartResult<()> {
        Ok(())
    }

    fn remove_element(&mut self, id: ElementId) -> ChartResult<()>;
}

/// One call received by a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Create { id: ElementId, kind: ElementKind, key: String },
    SetAttributes { id: ElementId },
    ScheduleTransition { id: ElementId, spec: TransitionSpec },
    CancelTransitions { id: ElementId },
    Raise { id: ElementId },
    Remove { id: ElementId },
}

/// Last known state of an element on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedElement {
    pub id: ElementId,
    pub kind: ElementKind,
    pub key: String,
    pub attributes: Attributes,
}

/// Headless surface that keeps the live element tree and a call log.
///
/// Used by tests and by callers that only need the computed geometry. Element
/// order is paint order, so [`Surface::raise_element`] moves an element last.
/// Attribute sets are validated so non-finite geometry fails loudly.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    next_id: u64,
    elements: Vec<RecordedElement>,
    ops: Vec<SurfaceOp>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn elements(&self) -> &[RecordedElement] {
        &self.elements
    }

    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&RecordedElement> {
        self.elements.iter().find(|element| element.id == id)
    }

    /// Live element created under `key`.
    #[must_use]
    pub fn element_by_key(&self, key: &str) -> Option<&RecordedElement> {
        self.elements.iter().find(|element| element.key == key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[must_use]
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    fn position(&self, id: ElementId) -> ChartResult<usize> {
        self.elements
            .iter()
            .position(|element| element.id == id)
            .ok_or_else(|| ChartError::Surface(format!("unknown element {id}")))
    }
}

impl Surface for RecordingSurface {
    fn create_element(&mut self, kind: ElementKind, key: &str) -> ChartResult<ElementId> {
        self.next_id += 1;
        let id = ElementId(self.next_id);
        self.elements.push(RecordedElement {
            id,
            kind,
            key: key.to_owned(),
            attributes: Attributes::new(),
        });
        self.ops.push(SurfaceOp::Create {
            id,
            kind,
            key: key.to_owned(),
        });
        Ok(id)
    }

    fn set_attributes(&mut self, id: ElementId, attributes: &Attributes) -> ChartResult<()> {
        attributes.validate()?;
        let index = self.position(id)?;
        self.elements[index].attributes = attributes.clone();
        self.ops.push(SurfaceOp::SetAttributes { id });
        Ok(())
    }

    fn schedule_transition(
        &mut self,
        id: ElementId,
        target: &Attributes,
        spec: TransitionSpec,
    ) -> ChartResult<()> {
        target.validate()?;
        self.position(id)?;
        self.ops.push(SurfaceOp::ScheduleTransition { id, spec });
        Ok(())
    }

    fn cancel_transitions(&mut self, id: ElementId) -> ChartResult<()> {
        self.position(id)?;
        self.ops.push(SurfaceOp::CancelTransitions { id });
        Ok(())
    }

    fn raise_element(&mut self, id: ElementId) -> ChartResult<()> {
        let index = self.position(id)?;
        let element = self.elements.remove(index);
        self.elements.push(element);
        self.ops.push(SurfaceOp::Raise { id });
        Ok(())
    }

    fn remove_element(&mut self, id: ElementId) -> ChartResult<()> {
        let index = self.position(id)?;
        self.elements.remove(index);
        self.ops.push(SurfaceOp::Remove { id });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ElementKind, RecordingSurface, Surface};
    use crate::render::Attributes;

    #[test]
    fn raise_moves_element_to_paint_end() {
        let mut surface = RecordingSurface::new();
        let first = surface.create_element(ElementKind::Rect, "a").expect("create a");
        surface.create_element(ElementKind::Rect, "b").expect("create b");

        surface.raise_element(first).expect("raise");
        assert_eq!(surface.elements().last().map(|e| e.key.as_str()), Some("a"));
    }

    #[test]
    fn unknown_element_is_an_error() {
        let mut surface = RecordingSurface::new();
        let id = surface.create_element(ElementKind::Circle, "x").expect("create");
        surface.remove_element(id).expect("remove");
        assert!(surface.set_attributes(id, &Attributes::new()).is_err());
    }

    #[test]
    fn invalid_geometry_is_rejected() {
        let mut surface = RecordingSurface::new();
        let id = surface.create_element(ElementKind::Rect, "x").expect("create");
        let attributes = Attributes::new().with("width", f64::INFINITY);
        assert!(surface.set_attributes(id, &attributes).is_err());
    }
}
