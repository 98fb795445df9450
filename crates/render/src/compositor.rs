//! Fixed-order layer composition for the main scene.

use oldskool_common::{Canvas, DrawOptions, Rgba};

use crate::Layer;

pub const PLASMA_UPSCALE: f64 = 2.0;
pub const CUBE_ALPHA: f32 = 0.8;
pub const SPIRAL_ALPHA: f32 = 0.6;

/// One step of the composition, in the order it is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeStep {
    Clear,
    Plasma,
    Cube,
    Logo,
    Scroller,
    Spiral,
}

/// Borrowed layer outputs for one frame.
pub struct SceneLayers<'a> {
    pub plasma: &'a Canvas,
    pub cube: &'a Canvas,
    pub logo: &'a dyn Layer,
    pub scroller: &'a dyn Layer,
    pub spiral: &'a Canvas,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Compositor;

impl Compositor {
    pub const ORDER: [CompositeStep; 6] = [
        CompositeStep::Clear,
        CompositeStep::Plasma,
        CompositeStep::Cube,
        CompositeStep::Logo,
        CompositeStep::Scroller,
        CompositeStep::Spiral,
    ];

    /// Paint every layer onto `target`. Later layers blend over earlier ones.
    pub fn compose(&self, target: &mut Canvas, layers: &SceneLayers<'_>) {
        for step in Self::ORDER {
            match step {
                CompositeStep::Clear => target.fill(Rgba::BLACK),
                CompositeStep::Plasma => target.draw(
                    layers.plasma,
                    &DrawOptions::default().scaled(PLASMA_UPSCALE, PLASMA_UPSCALE),
                ),
                CompositeStep::Cube => {
                    target.draw(layers.cube, &DrawOptions::default().with_alpha(CUBE_ALPHA))
                }
                CompositeStep::Logo => layers.logo.draw(target),
                CompositeStep::Scroller => layers.scroller.draw(target),
                CompositeStep::Spiral => {
                    target.draw(layers.spiral, &DrawOptions::default().with_alpha(SPIRAL_ALPHA))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fill(Rgba, i32);

    impl Layer for Fill {
        fn draw(&self, target: &mut Canvas) {
            for x in 0..self.1 {
                target.set(x, 0, self.0);
            }
        }
    }

    #[test]
    fn order_is_fixed() {
        assert_eq!(
            Compositor::ORDER,
            [
                CompositeStep::Clear,
                CompositeStep::Plasma,
                CompositeStep::Cube,
                CompositeStep::Logo,
                CompositeStep::Scroller,
                CompositeStep::Spiral,
            ]
        );
    }

    #[test]
    fn later_layers_blend_over_earlier() {
        let plasma = Canvas::filled(4, 2, Rgba::opaque(0, 0, 200));
        let mut cube = Canvas::new(8, 4);
        cube.set(1, 1, Rgba::WHITE);
        let logo = Fill(Rgba::MAGENTA, 3);
        let scroller = Fill(Rgba::CYAN, 2);
        let mut spiral = Canvas::new(8, 4);
        spiral.set(0, 0, Rgba::WHITE);

        let mut target = Canvas::filled(8, 4, Rgba::opaque(9, 9, 9));
        Compositor.compose(
            &mut target,
            &SceneLayers {
                plasma: &plasma,
                cube: &cube,
                logo: &logo,
                scroller: &scroller,
                spiral: &spiral,
            },
        );

        // plasma doubled covers everything
        assert_eq!(target.get(7, 3), Some(Rgba::opaque(0, 0, 200)));
        // cube at 80% over plasma
        assert_eq!(target.get(1, 1), Some(Rgba::opaque(204, 204, 244)));
        // logo replaced by scroller where they overlap
        assert_eq!(target.get(2, 0), Some(Rgba::MAGENTA));
        assert_eq!(target.get(1, 0), Some(Rgba::CYAN));
        // spiral at 60% over the scroller
        assert_eq!(target.get(0, 0), Some(Rgba::opaque(153, 255, 255)));
    }

    #[test]
    fn clear_is_black_without_plasma() {
        let empty = Canvas::new(1, 1);
        let none = Fill(Rgba::WHITE, 0);
        let mut target = Canvas::filled(4, 4, Rgba::WHITE);
        Compositor.compose(
            &mut target,
            &SceneLayers {
                plasma: &empty,
                cube: &empty,
                logo: &none,
                scroller: &none,
                spiral: &empty,
            },
        );
        assert!(target.pixels().iter().all(|p| *p == Rgba::BLACK));
    }
}
