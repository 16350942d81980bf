use superstellar_engine::coords::{Rect, SurfaceSize};
use superstellar_engine::paint::Color;
use superstellar_engine::render::RectFill;

use crate::entity::Spaceship;

const TOP: f32 = 20.0;
const BAR_WIDTH: f32 = 200.0;
const BAR_HEIGHT: f32 = 10.0;
const BAR_GAP: f32 = 8.0;
const BORDER: f32 = 2.0;

const LOADING_WIDTH: f32 = 320.0;
const LOADING_HEIGHT: f32 = 6.0;

/// Hit-point and energy bars of the tracked ship, anchored to the right edge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hud {
    position: f32,
    hp: Option<f32>,
    energy: Option<f32>,
}

impl Hud {
    /// Distance of the HUD's left edge from the right edge of the surface.
    pub const RIGHT_OFFSET: f32 = BAR_WIDTH + 40.0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Horizontal anchor (left edge of the bars) in logical pixels.
    pub fn set_position(&mut self, x: f32) {
        self.position = x;
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn update(&mut self, tracked: Option<&Spaceship>) {
        self.hp = tracked.map(Spaceship::hp_ratio);
        self.energy = tracked.map(Spaceship::energy_ratio);
    }

    pub fn hp(&self) -> Option<f32> {
        self.hp
    }

    pub fn energy(&self) -> Option<f32> {
        self.energy
    }

    /// Rectangles to draw this frame; empty while nothing is tracked.
    pub fn fills(&self) -> Vec<RectFill> {
        let mut fills = Vec::with_capacity(4);
        let bars = [
            (self.hp, Color::from_srgb_u8(214, 62, 62, 255)),
            (self.energy, Color::from_srgb_u8(72, 160, 232, 255)),
        ];

        let mut y = TOP;
        for (value, color) in bars {
            let Some(value) = value else { continue };
            push_bar(&mut fills, Rect::new(self.position, y, BAR_WIDTH, BAR_HEIGHT), value, color);
            y += BAR_HEIGHT + BAR_GAP;
        }
        fills
    }
}

/// Progress bar centered on the surface, shown while assets load.
pub fn loading_fills(progress: u8, surface: SurfaceSize) -> Vec<RectFill> {
    let width = LOADING_WIDTH.min(surface.width * 0.8);
    let frame = Rect::new(
        (surface.width - width) / 2.0,
        (surface.height - LOADING_HEIGHT) / 2.0,
        width,
        LOADING_HEIGHT,
    );

    let mut fills = Vec::with_capacity(2);
    push_bar(
        &mut fills,
        frame,
        f32::from(progress.min(100)) / 100.0,
        Color::from_srgb_u8(230, 230, 240, 255),
    );
    fills
}

fn push_bar(fills: &mut Vec<RectFill>, frame: Rect, value: f32, color: Color) {
    fills.push(RectFill::new(
        frame.inflate(BORDER),
        Color::from_straight(0.0, 0.0, 0.0, 0.6),
    ));

    let mut fill = frame;
    fill.size.x *= value.clamp(0.0, 1.0);
    if !fill.is_empty() {
        fills.push(RectFill::new(fill, color));
    }
}
