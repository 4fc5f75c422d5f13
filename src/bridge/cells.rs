use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use crate::scene::element::Transform;

/// A group of transform components owned by one gesture at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Component {
    /// `translate_x` and `translate_y`.
    Translate,
    /// `scale`.
    Scale,
    /// `rotation_deg`.
    Rotation,
}

impl Component {
    fn bit(self) -> u8 {
        match self {
            Self::Translate => 0b001,
            Self::Scale => 0b010,
            Self::Rotation => 0b100,
        }
    }

    /// `base` with this group replaced by the values in `from`.
    pub fn merge(self, base: Transform, from: &Transform) -> Transform {
        let mut out = base;
        match self {
            Self::Translate => {
                out.translate_x = from.translate_x;
                out.translate_y = from.translate_y;
            }
            Self::Scale => out.scale = from.scale,
            Self::Rotation => out.rotation_deg = from.rotation_deg,
        }
        out
    }
}

#[derive(Debug)]
struct F64Cell(AtomicU64);

impl F64Cell {
    fn new(v: f64) -> Self {
        Self(AtomicU64::new(v.to_bits()))
    }

    fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    fn set(&self, v: f64) {
        self.0.store(v.to_bits(), Ordering::Release);
    }
}

/// Four independently writable transform values shared by gesture input and rendering.
///
/// Writers must hold the claim for the component they write; readers never block.
#[derive(Debug)]
pub struct TransformCells {
    translate_x: F64Cell,
    translate_y: F64Cell,
    scale: F64Cell,
    rotation_deg: F64Cell,
    claims: AtomicU8,
}

impl TransformCells {
    /// Cells seeded from `t`.
    pub fn new(t: &Transform) -> Self {
        Self {
            translate_x: F64Cell::new(t.translate_x),
            translate_y: F64Cell::new(t.translate_y),
            scale: F64Cell::new(t.scale),
            rotation_deg: F64Cell::new(t.rotation_deg),
            claims: AtomicU8::new(0),
        }
    }

    /// Current values.
    pub fn load(&self) -> Transform {
        Transform {
            translate_x: self.translate_x.get(),
            translate_y: self.translate_y.get(),
            scale: self.scale.get(),
            rotation_deg: self.rotation_deg.get(),
        }
    }

    /// Take exclusive write ownership of `c`. Fails when another gesture holds it.
    pub fn try_claim(&self, c: Component) -> bool {
        let bit = c.bit();
        self.claims
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| {
                (cur & bit == 0).then_some(cur | bit)
            })
            .is_ok()
    }

    /// Give up ownership of `c`.
    pub fn release(&self, c: Component) {
        self.claims.fetch_and(!c.bit(), Ordering::AcqRel);
    }

    /// Return `true` while a gesture owns `c`.
    pub fn is_claimed(&self, c: Component) -> bool {
        self.claims.load(Ordering::Acquire) & c.bit() != 0
    }

    /// Write the translation.
    pub fn set_translate(&self, x: f64, y: f64) {
        self.translate_x.set(x);
        self.translate_y.set(y);
    }

    /// Write the scale.
    pub fn set_scale(&self, s: f64) {
        self.scale.set(s);
    }

    /// Write the rotation.
    pub fn set_rotation(&self, deg: f64) {
        self.rotation_deg.set(deg);
    }

    /// Copy `t` into the component group `c`.
    pub fn write_component(&self, c: Component, t: &Transform) {
        match c {
            Component::Translate => self.set_translate(t.translate_x, t.translate_y),
            Component::Scale => self.set_scale(t.scale),
            Component::Rotation => self.set_rotation(t.rotation_deg),
        }
    }

    /// Copy `t` into every component not currently claimed by a gesture.
    pub fn resync(&self, t: &Transform) {
        for c in [Component::Translate, Component::Scale, Component::Rotation] {
            if !self.is_claimed(c) {
                self.write_component(c, t);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bridge/cells.rs"]
mod tests;
