//! Canvas 2D drawing of render snapshots (WASM only)
//!
//! Flat shapes only: sky, pipes, bird, ground strip. Score and screens are
//! DOM overlays handled by the entry point.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::sim::{GamePhase, RenderSnapshot};
use crate::tuning::Tuning;

const SKY: &str = "#7dd3fc";
const PIPE: &str = "#22c55e";
const PIPE_RIM: &str = "#0f391a";
const BIRD: &str = "#facc15";
const BIRD_OUTLINE: &str = "#000000";
const GROUND: &str = "#ded895";
const GROUND_HEIGHT: f64 = 16.0;
const RIM_HEIGHT: f64 = 4.0;

pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl CanvasRenderer {
    /// Size the canvas to the play field and grab its 2D context
    pub fn new(canvas: &HtmlCanvasElement, tuning: &Tuning) -> Result<Self, JsValue> {
        canvas.set_width(tuning.field_width as u32);
        canvas.set_height(tuning.field_height as u32);
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            ctx,
            width: tuning.field_width as f64,
            height: tuning.field_height as f64,
        })
    }

    pub fn draw(&self, snapshot: &RenderSnapshot, tuning: &Tuning) {
        let ctx = &self.ctx;

        ctx.set_fill_style_str(SKY);
        ctx.fill_rect(0.0, 0.0, self.width, self.height);

        let pipe_width = tuning.pipe_width as f64;
        for pipe in &snapshot.obstacles {
            let x = pipe.x as f64;
            let top = pipe.top_height as f64;
            let bottom = top + tuning.pipe_gap as f64;

            ctx.set_fill_style_str(PIPE);
            ctx.fill_rect(x, 0.0, pipe_width, top);
            ctx.fill_rect(x, bottom, pipe_width, self.height - bottom);

            ctx.set_fill_style_str(PIPE_RIM);
            ctx.fill_rect(x, top - RIM_HEIGHT, pipe_width, RIM_HEIGHT);
            ctx.fill_rect(x, bottom, pipe_width, RIM_HEIGHT);
        }

        self.draw_bird(snapshot, tuning);

        ctx.set_fill_style_str(GROUND);
        ctx.fill_rect(0.0, self.height - GROUND_HEIGHT, self.width, GROUND_HEIGHT);

        if snapshot.phase == GamePhase::Running {
            ctx.set_fill_style_str("#ffffff");
            ctx.set_font("bold 56px monospace");
            ctx.set_text_align("center");
            let _ = ctx.fill_text(&snapshot.score.to_string(), self.width / 2.0, 96.0);
        }
    }

    fn draw_bird(&self, snapshot: &RenderSnapshot, tuning: &Tuning) {
        let ctx = &self.ctx;
        let half = tuning.bird_size as f64 / 2.0;
        let cx = tuning.bird_x as f64 + half;
        let cy = snapshot.bird.y as f64 + half;

        ctx.save();
        let _ = ctx.translate(cx, cy);
        let _ = ctx.rotate((snapshot.bird.rotation as f64).to_radians());

        ctx.begin_path();
        let _ = ctx.arc(0.0, 0.0, half, 0.0, std::f64::consts::TAU);
        ctx.set_fill_style_str(BIRD);
        ctx.fill();
        ctx.set_stroke_style_str(BIRD_OUTLINE);
        ctx.set_line_width(2.0);
        ctx.stroke();

        ctx.restore();
    }
}
