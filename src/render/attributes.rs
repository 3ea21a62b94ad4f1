use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::Color;
use crate::error::{ChartError, ChartResult};

/// One visual attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Number(f64),
    Color(Color),
    Text(String),
    /// Polyline vertices in pixel space.
    Points(Vec<(f64, f64)>),
}

impl AttrValue {
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(color) => Some(*color),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_points(&self) -> Option<&[(f64, f64)]> {
        match self {
            Self::Points(points) => Some(points),
            _ => None,
        }
    }

    /// Value between `self` (t = 0) and `to` (t = 1).
    ///
    /// Numbers, colors and equal-length point lists interpolate; anything else
    /// takes the target value immediately.
    #[must_use]
    pub fn interpolate(&self, to: &Self, t: f64) -> Self {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        match (self, to) {
            (Self::Number(a), Self::Number(b)) => Self::Number(mix(*a, *b)),
            (Self::Color(a), Self::Color(b)) => Self::Color(a.lerp(*b, t)),
            (Self::Points(a), Self::Points(b)) if a.len() == b.len() => Self::Points(
                a.iter()
                    .zip(b)
                    .map(|(p, q)| (mix(p.0, q.0), mix(p.1, q.1)))
                    .collect(),
            ),
            _ => to.clone(),
        }
    }

    fn validate(&self, name: &str) -> ChartResult<()> {
        let finite = match self {
            Self::Number(value) => value.is_finite(),
            Self::Color(color) => return color.validate(),
            Self::Text(_) => true,
            Self::Points(points) => points.iter().all(|(x, y)| x.is_finite() && y.is_finite()),
        };
        if finite {
            Ok(())
        } else {
            Err(ChartError::InvalidData(format!(
                "attribute `{name}` must be finite"
            )))
        }
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Color> for AttrValue {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<(f64, f64)>> for AttrValue {
    fn from(value: Vec<(f64, f64)>) -> Self {
        Self::Points(value)
    }
}

/// Ordered attribute map of one visual element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes {
    values: IndexMap<String, AttrValue>,
}

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.values.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.values.get(name)
    }

    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(AttrValue::as_number)
    }

    #[must_use]
    pub fn color(&self, name: &str) -> Option<Color> {
        self.get(name).and_then(AttrValue::as_color)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copy of `self` with every attribute of `overlay` written on top.
    #[must_use]
    pub fn merged(&self, overlay: &Self) -> Self {
        let mut out = self.clone();
        for (name, value) in &overlay.values {
            out.values.insert(name.clone(), value.clone());
        }
        out
    }

    /// Frame at `t` between `self` and `to`.
    ///
    /// Attributes only present in `self` are kept; attributes only present in
    /// `to` appear at their target value.
    #[must_use]
    pub fn interpolate(&self, to: &Self, t: f64) -> Self {
        let mut out = self.clone();
        for (name, target) in &to.values {
            let value = match self.values.get(name) {
                Some(current) => current.interpolate(target, t),
                None => target.clone(),
            };
            out.values.insert(name.clone(), value);
        }
        out
    }

    pub fn validate(&self) -> ChartResult<()> {
        for (name, value) in &self.values {
            value.validate(name)?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (name, value) in iter {
            attributes.set(name, value);
        }
        attributes
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{AttrValue, Attributes};
    use crate::core::Color;

    #[test]
    fn numbers_and_colors_interpolate() {
        let from = Attributes::new()
            .with("width", 0.0)
            .with("fill", Color::rgb(0.0, 0.0, 0.0));
        let to = Attributes::new()
            .with("width", 100.0)
            .with("fill", Color::rgb(1.0, 1.0, 1.0));

        let mid = from.interpolate(&to, 0.25);
        assert_relative_eq!(mid.number("width").expect("width"), 25.0);
        assert_relative_eq!(mid.color("fill").expect("fill").red, 0.25);
    }

    #[test]
    fn mismatched_point_lists_snap_to_target() {
        let from = AttrValue::Points(vec![(0.0, 0.0)]);
        let to = AttrValue::Points(vec![(1.0, 1.0), (2.0, 2.0)]);
        assert_eq!(from.interpolate(&to, 0.1), to);
    }

    #[test]
    fn text_takes_target_immediately() {
        let from = Attributes::new().with("label", "old");
        let to = Attributes::new().with("label", "new");
        assert_eq!(
            from.interpolate(&to, 0.0).get("label"),
            Some(&AttrValue::Text("new".to_owned()))
        );
    }

    #[test]
    fn merged_overlay_wins() {
        let base = Attributes::new().with("stroke-width", 0.0).with("r", 6.0);
        let merged = base.merged(&Attributes::new().with("stroke-width", 2.0));
        assert_eq!(merged.number("stroke-width"), Some(2.0));
        assert_eq!(merged.number("r"), Some(6.0));
    }

    #[test]
    fn non_finite_numbers_fail_validation() {
        assert!(Attributes::new().with("x", f64::NAN).validate().is_err());
    }
}
