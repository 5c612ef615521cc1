//! Player archetypes and per-archetype score vectors.

use serde::{Deserialize, Serialize};

/// The four fixed player-behavior categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Archetype {
    /// Plans ahead, avoids mistakes.
    Blueprint,
    /// Moves fast, takes risks.
    Action,
    /// Tends to unstable vessels.
    Nurturing,
    /// Seeks out hidden information.
    Knowledge,
}

impl Archetype {
    /// All archetypes in canonical order.
    pub const ALL: [Archetype; 4] = [
        Archetype::Blueprint,
        Archetype::Action,
        Archetype::Nurturing,
        Archetype::Knowledge,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Archetype::Blueprint => "Blueprint",
            Archetype::Action => "Action",
            Archetype::Nurturing => "Nurturing",
            Archetype::Knowledge => "Knowledge",
        }
    }
}

impl std::fmt::Display for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per archetype.
///
/// Used for raw scores, feature deltas, and probabilities alike. Serializes as a map
/// keyed by archetype name.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ArchetypeVector {
    pub blueprint: f64,
    pub action: f64,
    pub nurturing: f64,
    pub knowledge: f64,
}

impl ArchetypeVector {
    /// A vector with every component zero.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build a vector from components in canonical order.
    pub const fn new(blueprint: f64, action: f64, nurturing: f64, knowledge: f64) -> Self {
        Self {
            blueprint,
            action,
            nurturing,
            knowledge,
        }
    }

    /// A vector with every component set to `value`.
    pub fn splat(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn get(&self, archetype: Archetype) -> f64 {
        match archetype {
            Archetype::Blueprint => self.blueprint,
            Archetype::Action => self.action,
            Archetype::Nurturing => self.nurturing,
            Archetype::Knowledge => self.knowledge,
        }
    }

    pub fn get_mut(&mut self, archetype: Archetype) -> &mut f64 {
        match archetype {
            Archetype::Blueprint => &mut self.blueprint,
            Archetype::Action => &mut self.action,
            Archetype::Nurturing => &mut self.nurturing,
            Archetype::Knowledge => &mut self.knowledge,
        }
    }

    /// Iterate `(archetype, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Archetype, f64)> + '_ {
        Archetype::ALL.into_iter().map(move |a| (a, self.get(a)))
    }

    /// Apply `f` to every component.
    pub fn map(&self, mut f: impl FnMut(f64) -> f64) -> Self {
        Self::new(
            f(self.blueprint),
            f(self.action),
            f(self.nurturing),
            f(self.knowledge),
        )
    }

    /// Multiply every component by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        self.map(|v| v * factor)
    }

    /// Multiply every component by `factor` in place.
    pub fn scale(&mut self, factor: f64) {
        *self = self.scaled(factor);
    }

    /// Multiply a single component by `factor` in place.
    pub fn scale_component(&mut self, archetype: Archetype, factor: f64) {
        *self.get_mut(archetype) *= factor;
    }

    /// Add another vector component-wise.
    pub fn add(&mut self, other: &ArchetypeVector) {
        for archetype in Archetype::ALL {
            *self.get_mut(archetype) += other.get(archetype);
        }
    }

    /// Clamp every component to `[-bound, bound]`.
    pub fn clamp(&mut self, bound: f64) {
        *self = self.map(|v| v.clamp(-bound, bound));
    }

    /// Sum of absolute component values.
    pub fn abs_sum(&self) -> f64 {
        self.iter().map(|(_, v)| v.abs()).sum()
    }

    /// Sum of component values.
    pub fn sum(&self) -> f64 {
        self.iter().map(|(_, v)| v).sum()
    }

    /// Largest component value.
    pub fn max_value(&self) -> f64 {
        self.iter().map(|(_, v)| v).fold(f64::NEG_INFINITY, f64::max)
    }

    /// The archetype with the highest value. Ties resolve to the earliest in canonical order.
    pub fn argmax(&self) -> Archetype {
        let mut best = Archetype::Blueprint;
        for archetype in Archetype::ALL {
            if self.get(archetype) > self.get(best) {
                best = archetype;
            }
        }
        best
    }
}
