mod attributes;
mod diff;
mod engine;
mod surface;
mod transition;

pub use attributes::{AttrValue, Attributes};
pub use diff::{DataEntry, KeyedElement, Reconciliation, reconcile};
pub use engine::{
    ElementPhase, ElementSpec, RenderDiffEngine, RenderSummary, TickSummary, VisualElement,
};
pub use surface::{ElementId, ElementKind, RecordedElement, RecordingSurface, Surface, SurfaceOp};
pub use transition::{Easing, Transition, TransitionPolicy, TransitionSpec};
