//! Primitive palette generation.
//!
//! Expands one base color into a lightness scale over the canonical step set
//! `0, 50, 100, 200, ..., 900`, lightest to darkest.
//!
//! # Curve
//!
//! Each step has a reference lightness (98 at step 0 down to 10 at step 900).
//! The base color is anchored at the step whose reference lightness is nearest
//! its own; the anchor holds the base color unchanged. On either side of the
//! anchor, lightness is interpolated linearly over the reference ramp between
//! the base lightness and the scale extreme ([`L_MAX`] / [`L_MIN`]), and chroma
//! falls linearly to zero at the extreme. Hue is held constant.
//!
//! The generator always emits every canonical step, even when neighbouring
//! steps end up visually identical after gamut clamping.

use std::fmt;

use crate::color::Color;
use crate::convert::Lch;

/// Lightness of step 0.
pub const L_MAX: f64 = 98.0;
/// Lightness of step 900.
pub const L_MIN: f64 = 8.0;

/// A canonical palette step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    S0,
    S50,
    S100,
    S200,
    S300,
    S400,
    S500,
    S600,
    S700,
    S800,
    S900,
}

impl Step {
    /// Every step, lightest first.
    pub const ALL: [Step; 11] = [
        Step::S0,
        Step::S50,
        Step::S100,
        Step::S200,
        Step::S300,
        Step::S400,
        Step::S500,
        Step::S600,
        Step::S700,
        Step::S800,
        Step::S900,
    ];

    pub const fn value(self) -> u16 {
        match self {
            Step::S0 => 0,
            Step::S50 => 50,
            Step::S100 => 100,
            Step::S200 => 200,
            Step::S300 => 300,
            Step::S400 => 400,
            Step::S500 => 500,
            Step::S600 => 600,
            Step::S700 => 700,
            Step::S800 => 800,
            Step::S900 => 900,
        }
    }

    pub fn from_value(value: u16) -> Option<Step> {
        Step::ALL.into_iter().find(|s| s.value() == value)
    }

    /// Parse the decimal form (`"500"`). Anything else is `None`.
    pub fn parse(s: &str) -> Option<Step> {
        s.parse::<u16>().ok().and_then(Step::from_value)
    }

    const fn index(self) -> usize {
        self as usize
    }

    /// Lightness a step would have for a base anchored far away.
    pub const fn reference_lightness(self) -> f64 {
        match self {
            Step::S0 => 98.0,
            Step::S50 => 95.0,
            Step::S100 => 90.0,
            Step::S200 => 80.0,
            Step::S300 => 70.0,
            Step::S400 => 60.0,
            Step::S500 => 50.0,
            Step::S600 => 40.0,
            Step::S700 => 30.0,
            Step::S800 => 20.0,
            Step::S900 => 10.0,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value(), f)
    }
}

/// Step whose reference lightness is closest to `l`; ties go to the lighter step.
pub fn anchor_step(l: f64) -> Step {
    let mut best = Step::S0;
    let mut best_dist = f64::INFINITY;
    for step in Step::ALL {
        let dist = (step.reference_lightness() - l).abs();
        if dist < best_dist {
            best = step;
            best_dist = dist;
        }
    }
    best
}

/// A full canonical scale generated from one base color.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveScale {
    base: Color,
    anchor: Step,
    colors: [Lch; 11],
}

impl PrimitiveScale {
    /// The seed color this scale was generated from.
    pub fn base(&self) -> Color {
        self.base
    }

    /// Step holding the base color.
    pub fn anchor(&self) -> Step {
        self.anchor
    }

    /// Color at `step`; the anchor step returns the base exactly.
    pub fn get(&self, step: Step) -> Color {
        if step == self.anchor {
            return self.base;
        }
        Color::Lch(self.colors[step.index()])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Step, Color)> + '_ {
        Step::ALL.into_iter().map(move |step| (step, self.get(step)))
    }
}

/// Generate the primitive scale for a base color.
pub fn generate_scale(base: Color) -> PrimitiveScale {
    let lch = base.to_lch();
    let anchor = anchor_step(lch.l);
    let anchor_ref = anchor.reference_lightness();

    let colors = Step::ALL.map(|step| {
        if step == anchor {
            return lch;
        }

        let (t, extreme) = if step < anchor {
            let span = Step::S0.reference_lightness() - anchor_ref;
            ((step.reference_lightness() - anchor_ref) / span, L_MAX)
        } else {
            let span = anchor_ref - Step::S900.reference_lightness();
            ((anchor_ref - step.reference_lightness()) / span, L_MIN)
        };

        Lch { l: lch.l + (extreme - lch.l) * t, c: lch.c * (1.0 - t), h: lch.h }
    });

    PrimitiveScale { base, anchor, colors }
}
