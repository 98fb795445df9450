use oldskool_common::consts::{CUBE_ROTATION_SPEED, PLASMA_SPEED};
use oldskool_common::Canvas;

use crate::compositor::{Compositor, SceneLayers};
use crate::cube::CubeRenderer;
use crate::font::BitmapFont;
use crate::logo::DistortedLogo;
use crate::plasma::PlasmaField;
use crate::scroller::WaveScroller;
use crate::spiral::LogoSpiral;

/// Decoded images the main scene draws with.
#[derive(Debug, Clone)]
pub struct SceneImages {
    pub font: Canvas,
    pub logo: Canvas,
    pub spiral_logo: Canvas,
    pub texture: Canvas,
}

/// All main-scene layers plus the canvas they are composited onto.
#[derive(Debug, Clone)]
pub struct MainScene {
    font: BitmapFont,
    texture: Canvas,
    plasma: PlasmaField,
    cube: CubeRenderer,
    logo: DistortedLogo,
    scroller: WaveScroller,
    spiral: LogoSpiral,
    compositor: Compositor,
    canvas: Canvas,
}

impl MainScene {
    /// The plasma is generated at half the canvas size and upscaled.
    pub fn new(images: SceneImages, scroll_text: &str, width: u32, height: u32) -> Self {
        let font = BitmapFont::new(images.font);
        let scroller = WaveScroller::new(scroll_text, &font, width, height);
        Self {
            plasma: PlasmaField::new(width / 2, height / 2),
            cube: CubeRenderer::new(width, height),
            logo: DistortedLogo::new(images.logo, width),
            scroller,
            spiral: LogoSpiral::new(images.spiral_logo, width, height),
            compositor: Compositor,
            canvas: Canvas::new(width, height),
            font,
            texture: images.texture,
        }
    }

    pub fn font(&self) -> &BitmapFont {
        &self.font
    }

    pub fn plasma(&self) -> &PlasmaField {
        &self.plasma
    }

    pub fn cube(&self) -> &CubeRenderer {
        &self.cube
    }

    pub fn logo(&self) -> &DistortedLogo {
        &self.logo
    }

    pub fn scroller(&self) -> &WaveScroller {
        &self.scroller
    }

    pub fn spiral(&self) -> &LogoSpiral {
        &self.spiral
    }

    /// Advance every layer by one tick.
    pub fn advance(&mut self) {
        self.plasma.advance(PLASMA_SPEED);
        self.cube.advance(CUBE_ROTATION_SPEED);
        self.logo.advance();
        self.scroller.advance();
        self.spiral.advance();
    }

    /// Redraw every layer and composite them.
    pub fn render(&mut self) -> &Canvas {
        let _span = tracing::trace_span!("main_scene_render").entered();
        self.plasma.render();
        self.cube.render(&self.texture);
        self.scroller.render_strip(&self.font);
        self.spiral.render();
        let layers = SceneLayers {
            plasma: self.plasma.canvas(),
            cube: self.cube.canvas(),
            logo: &self.logo,
            scroller: &self.scroller,
            spiral: self.spiral.canvas(),
        };
        self.compositor.compose(&mut self.canvas, &layers);
        &self.canvas
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oldskool_common::Rgba;

    fn images() -> SceneImages {
        SceneImages {
            font: Canvas::filled(480, 216, Rgba::WHITE),
            logo: Canvas::filled(256, 64, Rgba::MAGENTA),
            spiral_logo: Canvas::filled(64, 64, Rgba::CYAN),
            texture: Canvas::filled(256, 256, Rgba::WHITE),
        }
    }

    #[test]
    fn advance_moves_every_layer() {
        let mut scene = MainScene::new(images(), "HELLO", 640, 400);
        scene.advance();
        assert!((scene.plasma().time() - 0.02).abs() < 1e-12);
        assert!((scene.cube().rotation().y - 0.03).abs() < 1e-12);
        assert_eq!(scene.logo().cursor(), 2);
        assert_eq!(scene.scroller().scroll_x(), 2.0);
        assert!((scene.spiral().time() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn render_produces_opaque_canvas() {
        let mut scene = MainScene::new(images(), "HELLO", 640, 400);
        scene.advance();
        let canvas = scene.render();
        assert_eq!((canvas.width(), canvas.height()), (640, 400));
        assert!(canvas.pixels().iter().all(|p| p.a == 255));
        // logo row 0 sits centred at y = 60, above the cube's silhouette
        assert_eq!(canvas.get(200, 60), Some(Rgba::MAGENTA));
    }
}
