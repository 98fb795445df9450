use std::path::Path;
use std::sync::Arc;

use oldskool_assets::AssetBundle;
use oldskool_audio::{AudioStreamDecoder, TrackInfo};
use oldskool_common::consts::{
    CANVAS_HEIGHT, CANVAS_OFFSET_X, CANVAS_OFFSET_Y, CANVAS_WIDTH, FADE_SPEED, GLYPH_HEIGHT,
    INTRO_FONT_SCALE, SAMPLE_RATE, SCREEN_HEIGHT, SCREEN_WIDTH,
};
use oldskool_common::{Canvas, DrawOptions, Rgba};
use oldskool_render::{IntroScroller, MainScene, SceneImages};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::EngineError;

pub const INTRO_TEXT: &str = concat!(
    "     ",
    "C'EST MERCREDI...",
    "     ",
    "JE REPETE, C'EST MERCREDI ET LE MERCREDI...",
    "     ",
);

pub const SCROLL_TEXT: &str = concat!(
    "          ",
    "C'EST TEAMG1 A 16H00 SUR GAMEONE POUR TOUS LES GAMERS, LES GEEKS ET LES NERDS.",
    "     ",
    "ENCORE UN BON APRES MIDI AVEC TOUTE L'EQUIPE DE TEAMG1! VIVEMENT 16H00",
    "                    ",
);

/// Intro glyphs are stamped this far from the strip's left edge.
const INTRO_ANCHOR_X: i32 = 640;
/// Audio is requested once the fade passes this level.
const AUDIO_START_FADE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Intro,
    Main,
}

/// Things a host must react to, produced by [`Demo::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DemoEvent {
    IntroComplete,
    /// Start host audio playback. Emitted at most once per demo.
    StartAudio,
}

/// Screen band the host runs the CRT post-process over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CrtBand {
    pub y: u32,
    pub height: u32,
    /// Shader clock in seconds.
    pub time: f64,
}

/// One logical output frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub canvas: Canvas,
    pub crt_band: Option<CrtBand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoOptions {
    pub skip_intro: bool,
    /// Load the music track. Without it the demo runs silent.
    pub audio: bool,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            skip_intro: false,
            audio: true,
        }
    }
}

/// Serializable snapshot for overlays and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemoStatus {
    pub phase: Phase,
    pub tick: u64,
    pub fade: f64,
    pub demo_time: f64,
    pub audio_requested: bool,
    pub track: Option<TrackInfo>,
    pub audio_position: Option<u64>,
}

/// The whole demo: intro scroller, main scene and the shared audio stream.
///
/// Hosts call [`Demo::update`] once per tick and [`Demo::draw`] once per
/// presented frame.
pub struct Demo {
    phase: Phase,
    tick: u64,
    fade: f64,
    demo_time: f64,
    intro: IntroScroller,
    scene: MainScene,
    audio: Option<Arc<AudioStreamDecoder>>,
    audio_requested: bool,
    torn_down: bool,
    frame: Frame,
    events: Vec<DemoEvent>,
}

impl std::fmt::Debug for Demo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Demo")
            .field("phase", &self.phase)
            .field("tick", &self.tick)
            .field("fade", &self.fade)
            .field("audio", &self.audio)
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}

impl Demo {
    /// Build the demo from raw blobs. Image and track failures degrade to
    /// placeholders and silence.
    pub fn new(bundle: &AssetBundle, options: DemoOptions) -> Self {
        let _span = tracing::info_span!("demo_init").entered();
        let images = bundle.decode_images();
        let scene = MainScene::new(
            SceneImages {
                font: images.font,
                logo: images.logo,
                spiral_logo: images.spiral_logo,
                texture: images.texture,
            },
            SCROLL_TEXT,
            CANVAS_WIDTH,
            CANVAS_HEIGHT,
        );
        let audio = if options.audio {
            load_audio(&bundle.music)
        } else {
            info!("audio disabled by host");
            None
        };

        let mut demo = Self {
            phase: Phase::Intro,
            tick: 0,
            fade: 0.0,
            demo_time: 0.0,
            intro: IntroScroller::new(INTRO_TEXT, SCREEN_WIDTH, INTRO_ANCHOR_X),
            scene,
            audio,
            audio_requested: false,
            torn_down: false,
            frame: Frame {
                canvas: Canvas::filled(SCREEN_WIDTH, SCREEN_HEIGHT, Rgba::BLACK),
                crt_band: None,
            },
            events: Vec::new(),
        };
        if options.skip_intro {
            demo.skip_intro();
        }
        demo
    }

    /// Read the asset directory and build the demo.
    pub fn from_dir(dir: impl AsRef<Path>, options: DemoOptions) -> Result<Self, EngineError> {
        let bundle = AssetBundle::from_dir(dir)?;
        Ok(Self::new(&bundle, options))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn fade(&self) -> f64 {
        self.fade
    }

    pub fn demo_time(&self) -> f64 {
        self.demo_time
    }

    pub fn intro(&self) -> &IntroScroller {
        &self.intro
    }

    pub fn scene(&self) -> &MainScene {
        &self.scene
    }

    /// The shared audio stream, if the track loaded.
    pub fn audio(&self) -> Option<&Arc<AudioStreamDecoder>> {
        self.audio.as_ref()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<DemoEvent> {
        std::mem::take(&mut self.events)
    }

    /// Jump straight to the main phase with the fade reset.
    pub fn skip_intro(&mut self) {
        if self.phase == Phase::Intro {
            self.enter_main();
        }
    }

    fn enter_main(&mut self) {
        self.phase = Phase::Main;
        self.fade = 0.0;
        self.events.push(DemoEvent::IntroComplete);
        info!(tick = self.tick, "entering main scene");
    }

    /// Advance one tick. Per-tick rates are fixed; `dt` only feeds the demo
    /// clock.
    pub fn update(&mut self, dt: f64) {
        if self.torn_down {
            return;
        }
        self.tick += 1;
        match self.phase {
            Phase::Intro => {
                self.intro.advance(self.scene.font());
                if self.intro.is_complete() {
                    self.enter_main();
                }
            }
            Phase::Main => {
                self.fade = (self.fade + FADE_SPEED).min(1.0);
                if self.fade > AUDIO_START_FADE && !self.audio_requested && self.audio.is_some() {
                    self.audio_requested = true;
                    self.events.push(DemoEvent::StartAudio);
                    debug!(fade = self.fade, "audio start requested");
                }
                self.scene.advance();
                self.demo_time += dt;
            }
        }
    }

    /// Assemble the 768x540 output frame for the current state.
    pub fn draw(&mut self) -> &Frame {
        let _span = tracing::trace_span!("demo_draw", tick = self.tick).entered();
        let frame = &mut self.frame;
        frame.canvas.fill(Rgba::BLACK);
        match self.phase {
            Phase::Intro => {
                let band_height = (GLYPH_HEIGHT as f64 * INTRO_FONT_SCALE) as u32;
                let y = SCREEN_HEIGHT / 2 - band_height / 2;
                frame
                    .canvas
                    .draw(self.intro.strip(), &DrawOptions::at(0.0, y as f64));
                frame.crt_band = Some(CrtBand {
                    y,
                    height: band_height,
                    time: self.intro.shader_time(),
                });
            }
            Phase::Main => {
                let scene = self.scene.render();
                frame.canvas.draw(
                    scene,
                    &DrawOptions::at(CANVAS_OFFSET_X as f64, CANVAS_OFFSET_Y as f64)
                        .with_alpha(self.fade as f32),
                );
                frame.crt_band = None;
            }
        }
        &self.frame
    }

    pub fn status(&self) -> DemoStatus {
        DemoStatus {
            phase: self.phase,
            tick: self.tick,
            fade: self.fade,
            demo_time: self.demo_time,
            audio_requested: self.audio_requested,
            track: self.audio.as_ref().map(|a| a.info().clone()),
            audio_position: self
                .audio
                .as_ref()
                .filter(|a| !a.is_closed())
                .map(|a| a.position()),
        }
    }

    /// Release the audio engine. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        if let Some(audio) = &self.audio {
            audio.close();
        }
        info!(tick = self.tick, "demo torn down");
    }
}

impl Drop for Demo {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn load_audio(music: &[u8]) -> Option<Arc<AudioStreamDecoder>> {
    if music.is_empty() {
        warn!("no music track; running silent");
        return None;
    }
    match AudioStreamDecoder::new(music, SAMPLE_RATE, true) {
        Ok(decoder) => Some(Arc::new(decoder)),
        Err(e) => {
            warn!(error = %e, "audio disabled");
            None
        }
    }
}
