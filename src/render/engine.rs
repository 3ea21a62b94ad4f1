use std::time::Duration;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::error::ChartResult;
use crate::render::diff::{DataEntry, KeyedElement, Reconciliation, reconcile};
use crate::render::{Attributes, ElementId, ElementKind, Surface, Transition, TransitionPolicy};

/// Where an element is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementPhase {
    Entering,
    Updating,
    Exiting,
    Settled,
}

/// Desired state of one element for the next draw.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSpec<D> {
    pub key: String,
    pub kind: ElementKind,
    pub datum: D,
    /// Attributes the element animates towards.
    pub target: Attributes,
    /// Attributes the element grows from on enter and shrinks to on exit.
    pub zero: Attributes,
}

impl<D> ElementSpec<D> {
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        kind: ElementKind,
        datum: D,
        target: Attributes,
        zero: Attributes,
    ) -> Self {
        Self {
            key: key.into(),
            kind,
            datum,
            target,
            zero,
        }
    }
}

/// A keyed element currently on the surface.
#[derive(Debug, Clone)]
pub struct VisualElement<D> {
    pub key: String,
    pub id: ElementId,
    pub kind: ElementKind,
    pub datum: D,
    pub phase: ElementPhase,
    displayed: Attributes,
    target: Attributes,
    zero: Attributes,
    highlight: Option<Attributes>,
    transition: Option<Transition>,
}

impl<D> VisualElement<D> {
    /// Last frame written, without the highlight overlay.
    #[must_use]
    pub fn displayed(&self) -> &Attributes {
        &self.displayed
    }

    #[must_use]
    pub fn target(&self) -> &Attributes {
        &self.target
    }

    #[must_use]
    pub fn is_highlighted(&self) -> bool {
        self.highlight.is_some()
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// What the surface shows: the displayed frame plus any highlight.
    #[must_use]
    pub fn effective_attributes(&self) -> Attributes {
        match &self.highlight {
            Some(overlay) => self.displayed.merged(overlay),
            None => self.displayed.clone(),
        }
    }

    fn interrupt<S: Surface + ?Sized>(&mut self, surface: &mut S) -> ChartResult<()> {
        if self.transition.take().is_some() {
            surface.cancel_transitions(self.id)?;
        }
        Ok(())
    }
}

impl<D> KeyedElement for VisualElement<D> {
    fn key(&self) -> &str {
        &self.key
    }
}

/// Counts from one [`RenderDiffEngine::apply`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub entered: usize,
    pub updated: usize,
    pub exited: usize,
    /// Updates that brought back an element which was exiting.
    pub revived: usize,
    /// Elements on the surface after the pass, exiting ones included.
    pub live: usize,
}

/// Counts from one [`RenderDiffEngine::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub animating: usize,
    pub removed: usize,
}

/// Owns a chart's keyed elements and their transition timeline.
///
/// Every [`apply`](Self::apply) interrupts in-flight transitions and restarts
/// them from the currently displayed frame, so the settled state always equals
/// the latest target regardless of how draws interleave with ticks.
#[derive(Debug)]
pub struct RenderDiffEngine<D> {
    elements: IndexMap<String, VisualElement<D>>,
    policy: TransitionPolicy,
}

impl<D> Default for RenderDiffEngine<D> {
    fn default() -> Self {
        Self::new(TransitionPolicy::default())
    }
}

impl<D> RenderDiffEngine<D> {
    #[must_use]
    pub fn new(policy: TransitionPolicy) -> Self {
        Self {
            elements: IndexMap::new(),
            policy,
        }
    }

    #[must_use]
    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: TransitionPolicy) {
        self.policy = policy;
    }

    pub fn elements(&self) -> impl Iterator<Item = &VisualElement<D>> {
        self.elements.values()
    }

    #[must_use]
    pub fn element(&self, key: &str) -> Option<&VisualElement<D>> {
        self.elements.get(key)
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
    pub fn is_animating(&self) -> bool {
        self.elements.values().any(VisualElement::is_animating)
    }

    /// Reconciles `specs` against the live elements and schedules transitions.
    pub fn apply<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        specs: Vec<ElementSpec<D>>,
    ) -> ChartResult<RenderSummary> {
        let Reconciliation {
            enter,
            update,
            exit,
        } = reconcile(self.elements.values(), specs, |spec| spec.key.clone());
        let update: Vec<DataEntry<ElementSpec<D>>> =
            update.into_iter().map(|(_, entry)| entry).collect();
        let exit: Vec<String> = exit.into_iter().map(|element| element.key.clone()).collect();

        let mut summary = RenderSummary::default();

        for key in exit {
            let Some(element) = self.elements.get_mut(&key) else {
                continue;
            };
            if element.phase == ElementPhase::Exiting {
                continue;
            }
            element.interrupt(surface)?;
            let spec = self.policy.exit;
            element.highlight = None;
            element.phase = ElementPhase::Exiting;
            element.transition = Some(
                Transition::new(element.displayed.clone(), element.zero.clone(), spec).removing(),
            );
            surface.schedule_transition(element.id, &element.zero, spec)?;
            summary.exited += 1;
        }

        for entry in update {
            let Some(element) = self.elements.get_mut(&entry.key) else {
                continue;
            };
            if element.phase == ElementPhase::Exiting {
                summary.revived += 1;
            }
            element.interrupt(surface)?;
            let ElementSpec {
                datum, target, zero, ..
            } = entry.datum;
            let spec = self.policy.update;
            element.datum = datum;
            element.zero = zero;
            element.phase = ElementPhase::Updating;
            element.transition = Some(Transition::new(
                element.displayed.clone(),
                target.clone(),
                spec,
            ));
            surface.schedule_transition(element.id, &target, spec)?;
            element.target = target;
            summary.updated += 1;
        }

        for entry in enter {
            let ElementSpec {
                key,
                kind,
                datum,
                target,
                zero,
            } = entry.datum;
            let id = surface.create_element(kind, &key)?;
            surface.set_attributes(id, &zero)?;
            let spec = self.policy.enter_at(entry.index);
            surface.schedule_transition(id, &target, spec)?;
            let element = VisualElement {
                key: key.clone(),
                id,
                kind,
                datum,
                phase: ElementPhase::Entering,
                transition: Some(Transition::new(zero.clone(), target.clone(), spec)),
                displayed: zero.clone(),
                target,
                zero,
                highlight: None,
            };
            self.elements.insert(key, element);
            summary.entered += 1;
        }

        summary.live = self.elements.len();
        debug!(
            entered = summary.entered,
            updated = summary.updated,
            exited = summary.exited,
            revived = summary.revived,
            live = summary.live,
            "applied render diff"
        );
        Ok(summary)
    }

    /// Advances every transition by `dt` and writes the resulting frames.
    pub fn tick<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        dt: Duration,
    ) -> ChartResult<TickSummary> {
        let mut summary = TickSummary::default();
        let mut finished_exits = Vec::new();

        for element in self.elements.values_mut() {
            let Some(transition) = element.transition.as_mut() else {
                continue;
            };
            let done = transition.advance(dt);
            let removing = transition.removes_on_end();
            element.displayed = transition.sample();
            surface.set_attributes(element.id, &element.effective_attributes())?;

            if !done {
                summary.animating += 1;
                continue;
            }
            element.transition = None;
            if removing {
                finished_exits.push(element.key.clone());
            } else {
                element.phase = ElementPhase::Settled;
            }
        }

        for key in finished_exits {
            if let Some(element) = self.elements.shift_remove(&key) {
                surface.remove_element(element.id)?;
                summary.removed += 1;
            }
        }

        trace!(animating = summary.animating, removed = summary.removed, ?dt, "tick");
        Ok(summary)
    }

    /// Jumps every transition to its end.
    pub fn settle<S: Surface + ?Sized>(&mut self, surface: &mut S) -> ChartResult<TickSummary> {
        self.tick(surface, Duration::MAX)
    }

    /// Raises `key` and draws `overlay` over its displayed attributes.
    ///
    /// Returns `false` when the key is unknown or already exiting.
    pub fn highlight<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        key: &str,
        overlay: Attributes,
    ) -> ChartResult<bool> {
        let Some(element) = self.elements.get_mut(key) else {
            return Ok(false);
        };
        if element.phase == ElementPhase::Exiting {
            return Ok(false);
        }
        element.highlight = Some(overlay);
        surface.raise_element(element.id)?;
        surface.set_attributes(element.id, &element.effective_attributes())?;
        Ok(true)
    }

    /// Drops the highlight overlay of `key`, if any.
    pub fn clear_highlight<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        key: &str,
    ) -> ChartResult<bool> {
        let Some(element) = self.elements.get_mut(key) else {
            return Ok(false);
        };
        if element.highlight.take().is_none() {
            return Ok(false);
        }
        surface.set_attributes(element.id, &element.effective_attributes())?;
        Ok(true)
    }

    pub fn clear_highlights<S: Surface + ?Sized>(&mut self, surface: &mut S) -> ChartResult<()> {
        for element in self.elements.values_mut() {
            if element.highlight.take().is_some() {
                surface.set_attributes(element.id, &element.effective_attributes())?;
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn datum(&self, key: &str) -> Option<&D> {
        self.elements.get(key).map(|element| &element.datum)
    }
}
