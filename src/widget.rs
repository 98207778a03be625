use std::time::Instant;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::style::Color;

use crate::drag::{DragState, DragTarget};
use crate::graphics::Canvas;
use crate::math::{blur_opacity, mix, shade_for_blur};
use crate::optics::DofResult;
use crate::projection::{distance_to_screen_fraction, fraction_to_column, MarkerPositions};
use crate::report::{cards, format_metres};
use crate::scene::{bird_blur, tree_blur, Scene, CLOUD_BLUR};
use crate::scheduler::FrameScheduler;
use crate::state::{AppState, Theme, DISTANCE_STEP_MM};

pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 14;
/// Widest tree, in columns
const MAX_TREE_COLUMNS: f64 = 7.0;

const HELP: &str =
    "q quit  p pause  d debug  t theme  ↑/↓ +/- focal  [ ] aperture  ←/→ distance  s sensor  r reset  drag FOCUS/H";

/// What the event loop should do after an event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Colours for one theme
struct Palette {
    background: Color,
    text: Color,
    muted: Color,
    accent: Color,
    hyperfocal: Color,
    in_focus: Color,
    out_of_focus: Color,
    cloud: Color,
    zone: Color,
    horizon: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Palette {
                background: Color::Rgb { r: 10, g: 10, b: 10 },
                text: Color::Rgb { r: 229, g: 231, b: 235 },
                muted: Color::Rgb { r: 107, g: 114, b: 128 },
                accent: Color::Rgb { r: 96, g: 165, b: 250 },
                hyperfocal: Color::Rgb { r: 251, g: 191, b: 36 },
                in_focus: Color::Rgb { r: 16, g: 185, b: 129 },
                out_of_focus: Color::Rgb { r: 102, g: 102, b: 102 },
                cloud: Color::Rgb { r: 45, g: 45, b: 45 },
                zone: Color::Rgb { r: 8, g: 38, b: 30 },
                horizon: Color::Rgb { r: 60, g: 60, b: 60 },
            },
            Theme::Light => Palette {
                background: Color::Rgb { r: 243, g: 244, b: 246 },
                text: Color::Rgb { r: 17, g: 24, b: 39 },
                muted: Color::Rgb { r: 107, g: 114, b: 128 },
                accent: Color::Rgb { r: 37, g: 99, b: 235 },
                hyperfocal: Color::Rgb { r: 217, g: 119, b: 6 },
                in_focus: Color::Rgb { r: 5, g: 150, b: 105 },
                out_of_focus: Color::Rgb { r: 75, g: 85, b: 99 },
                cloud: Color::Rgb { r: 209, g: 213, b: 219 },
                zone: Color::Rgb { r: 209, g: 250, b: 229 },
                horizon: Color::Rgb { r: 209, g: 213, b: 219 },
            },
        }
    }
}

/// Row assignment for a given terminal height
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Layout {
    scene_top: u16,
    horizon: u16,
    tags: u16,
    cards_top: u16,
    help: u16,
}

impl Layout {
    fn new(height: u16) -> Self {
        Layout {
            scene_top: 2,
            horizon: height - 6,
            tags: height - 5,
            cards_top: height - 3,
            help: height - 1,
        }
    }

    /// Row of a vertical position given in percent of the sky
    fn sky_row(&self, percent: f64) -> f64 {
        self.scene_top as f64 + percent / 100.0 * (self.horizon - self.scene_top) as f64
    }

    fn contains_scene_row(&self, row: u16) -> bool {
        row >= self.scene_top && row <= self.tags
    }
}

/// Depth-of-field view: scenery, markers and results
pub struct DofWidget {
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
    /// Marker currently held by the pointer
    drag: DragState,
    /// Widget size in cells
    size: (u16, u16),
    scene: Scene,
    scheduler: FrameScheduler,
}

impl DofWidget {
    pub fn new(width: u16, height: u16, scene: Scene) -> Self {
        DofWidget {
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
            drag: DragState::Idle,
            size: (width, height),
            scene,
            scheduler: FrameScheduler::new(),
        }
    }

    pub fn drag(&self) -> DragState {
        self.drag
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Markers for the last computed result, if any
    fn markers(&self) -> Option<MarkerPositions> {
        self.scheduler
            .last()
            .map(|(lens, result)| MarkerPositions::new(lens.subject_distance_mm, &result))
    }

    /// Handle events for the depth-of-field widget
    pub fn event(&mut self, event: &Event, data: &mut AppState) -> Control {
        match event {
            Event::Key(key_event) => return self.key(key_event, data),
            Event::Mouse(mouse_event) => self.mouse(mouse_event, data),
            Event::Resize(width, height) => {
                log::debug!("Resized to {}x{}", width, height);
                self.size = (*width, *height);
                self.scheduler.request_recompute();
            }
            Event::FocusLost => self.drag.release(),
            _ => {}
        }
        Control::Continue
    }

    fn key(&mut self, key_event: &KeyEvent, data: &mut AppState) -> Control {
        if key_event.kind != KeyEventKind::Press {
            return Control::Continue;
        }
        let coarse = key_event.modifiers.contains(KeyModifiers::SHIFT);
        match key_event.code {
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                return Control::Quit;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Control::Quit,
            KeyCode::Char('d') | KeyCode::Char('D') => data.debug = !data.debug,
            KeyCode::Char('p') | KeyCode::Char('P') => {
                data.paused = !data.paused;
                // Drop any marker that was being dragged
                self.drag.release();
            }
            KeyCode::Char('t') | KeyCode::Char('T') => {
                data.theme = data.theme.toggled();
                self.scheduler.request_recompute();
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                data.set_focal_length(data.focal_length_mm + 10.0);
                self.scheduler.request_recompute();
            }
            KeyCode::Char('-') | KeyCode::Char('_') => {
                data.set_focal_length(data.focal_length_mm - 10.0);
                self.scheduler.request_recompute();
            }
            KeyCode::Up => {
                data.set_focal_length(data.focal_length_mm + 1.0);
                self.scheduler.request_recompute();
            }
            KeyCode::Down => {
                data.set_focal_length(data.focal_length_mm - 1.0);
                self.scheduler.request_recompute();
            }
            KeyCode::Char(']') => {
                data.step_aperture(1);
                self.scheduler.request_recompute();
            }
            KeyCode::Char('[') => {
                data.step_aperture(-1);
                self.scheduler.request_recompute();
            }
            KeyCode::Right | KeyCode::Left => {
                let step = if coarse { DISTANCE_STEP_MM * 10.0 } else { DISTANCE_STEP_MM };
                let step = if key_event.code == KeyCode::Left { -step } else { step };
                data.set_subject_distance(data.subject_distance_mm + step);
                self.scheduler.request_recompute();
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                data.cycle_sensor();
                log::info!("Sensor format: {}", data.sensor.label());
                self.scheduler.request_recompute();
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                data.reset();
                self.drag.release();
                self.scheduler.request_recompute();
            }
            _ => {}
        }
        Control::Continue
    }

    fn mouse(&mut self, mouse_event: &MouseEvent, data: &mut AppState) {
        let (width, height) = self.size;
        match mouse_event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if height < MIN_HEIGHT || !Layout::new(height).contains_scene_row(mouse_event.row) {
                    return;
                }
                if let Some(markers) = self.markers() {
                    self.drag.press(mouse_event.column, width, &markers);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if self.drag.drag_to(mouse_event.column, width, data) {
                    self.scheduler.request_recompute();
                }
            }
            MouseEventKind::Up(MouseButton::Left) => self.drag.release(),
            _ => {}
        }
    }

    /// Starts a frame: recomputes if needed and moves the scenery along
    pub fn tick(&mut self, data: &AppState) -> DofResult {
        let result = self.scheduler.begin_frame(&data.lens());
        if !data.paused {
            self.scene.advance();
        }
        result
    }

    /// Paint the depth-of-field widget
    pub fn paint(&mut self, data: &AppState, result: &DofResult) -> Canvas {
        // Update FPS calculation
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }

        let (width, height) = self.size;
        let palette = Palette::for_theme(data.theme);
        let mut canvas = Canvas::new(width, height, palette.background);

        if width < MIN_WIDTH || height < MIN_HEIGHT {
            canvas.text(0, 0, "Terminal too small", palette.text);
            return canvas;
        }

        let layout = Layout::new(height);
        let lens = data.lens();
        let markers = MarkerPositions::new(lens.subject_distance_mm, result);
        let column = |fraction: f64| fraction_to_column(fraction, width) as i32;
        let to_x = |percent: f64| percent / 100.0 * width as f64;

        // Header and controls
        canvas.text(1, 0, "DOF.IO", palette.accent);
        let theme = data.theme.label();
        canvas.text(width as i32 - theme.len() as i32 - 1, 0, theme, palette.muted);
        let controls = format!(
            "Focal {}mm   f/{:.1}   Distance {:.2}m   {} · CoC {:.3}mm",
            lens.focal_length_mm,
            lens.f_number,
            lens.subject_distance_mm / 1000.0,
            data.sensor.label(),
            lens.circle_of_confusion_mm
        );
        canvas.text(1, 1, &controls, palette.text);

        // Sharp zone
        let (near_column, far_column) = (column(markers.near), column(markers.far));
        for y in layout.scene_top..=layout.horizon {
            for x in near_column..=far_column {
                canvas.tint(x, y as i32, palette.zone);
            }
        }

        // Clouds are always blurry
        for cloud in &self.scene.clouds {
            let rx = cloud.width / 8.0;
            canvas.fill_ellipse(
                to_x(cloud.x),
                layout.sky_row(cloud.y),
                rx,
                (rx * 0.2).max(0.6),
                shade_for_blur(CLOUD_BLUR),
                palette.cloud,
            );
        }

        // Birds, highlighted only inside the sharp zone
        for bird in &self.scene.birds {
            let blur = bird_blur(bird.distance_mm, result);
            let base = if result.is_in_focus(bird.distance_mm) {
                palette.in_focus
            } else {
                palette.out_of_focus
            };
            let glyph = if blur > 4.0 {
                '·'
            } else if blur > 0.5 {
                '~'
            } else if bird.wings_up() {
                'v'
            } else {
                '-'
            };
            let color = if blur > 0.5 {
                mix(base, palette.background, blur_opacity(blur))
            } else {
                base
            };
            let y = layout.sky_row(bird.y + bird.bob()).floor() as i32;
            canvas.put(to_x(bird.x).floor() as i32, y, glyph, color);
        }

        // Horizon
        let horizon = layout.horizon as i32;
        canvas.draw_line(0, horizon, width as i32 - 1, horizon, '─', palette.horizon);

        // Trees, far ones first so near ones cover them
        let max_tree_rows = (layout.horizon - layout.scene_top) as f64 * 0.6;
        for tree in self.scene.trees.iter().rev() {
            let blur = tree_blur(tree.distance_mm, result).min(8.0);
            let base = if result.is_in_focus(tree.distance_mm) {
                palette.in_focus
            } else {
                palette.out_of_focus
            };
            let color = mix(base, palette.background, tree.opacity() * blur_opacity(blur));
            let x = to_x(distance_to_screen_fraction(tree.distance_mm));
            let half_width = tree.relative_width() * MAX_TREE_COLUMNS / 2.0;
            let top = layout.horizon as f64 - tree.relative_height() * max_tree_rows;
            let base_y = layout.horizon as f64;
            canvas.fill_triangle(
                [x, top],
                [x - half_width, base_y],
                [x + half_width, base_y],
                shade_for_blur(blur),
                color,
            );
        }

        // Focus and hyperfocal lines
        let held = match self.drag {
            DragState::Dragging(target) => Some(target),
            DragState::Idle => None,
        };
        let focus_color = if held == Some(DragTarget::Focus) {
            palette.text
        } else {
            palette.accent
        };
        let hyper_color = if held == Some(DragTarget::Hyperfocal) {
            palette.text
        } else {
            palette.hyperfocal
        };
        let focus_column = column(markers.subject);
        let hyper_column = column(markers.hyperfocal);
        for y in layout.scene_top as i32..horizon {
            canvas.put(hyper_column, y, '┊', hyper_color);
            canvas.put(focus_column, y, '│', focus_color);
        }
        let middle = (layout.scene_top as i32 + horizon) / 2;
        canvas.text_centered(focus_column, middle, "FOCUS", focus_color);
        canvas.text_centered(hyper_column, layout.scene_top as i32, "H", hyper_color);

        // Near and far tags
        let tags = layout.tags as i32;
        canvas.text_centered(near_column, tags, &format_metres(result.near_limit_mm), palette.in_focus);
        canvas.text_centered(far_column, tags, &format_metres(result.far_limit_mm), palette.in_focus);

        // Result cards, three per row
        let card_width = width as i32 / 3;
        for (index, card) in cards(result).iter().enumerate() {
            let x = (index % 3) as i32 * card_width + 1;
            let y = layout.cards_top as i32 + (index / 3) as i32;
            let label = format!("{}: ", card.label);
            canvas.text(x, y, &label, palette.muted);
            canvas.text(x + label.chars().count() as i32, y, &card.value, palette.text);
        }

        canvas.text(1, layout.help as i32, HELP, palette.muted);

        // Add debug info if debug mode is enabled
        if data.debug {
            let lines = [
                format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
                format!("FPS: {:.2}", self.fps),
                format!("Recomputations: {}", self.scheduler.recomputations()),
                format!("Drag: {:?}", self.drag),
                format!(
                    "Markers: S {:.1} N {:.1} F {:.1} H {:.1}",
                    markers.subject, markers.near, markers.far, markers.hyperfocal
                ),
            ];
            for (offset, line) in lines.iter().enumerate() {
                canvas.text(1, layout.scene_top as i32 + offset as i32, line, palette.text);
            }
        }

        // Display 'Paused' if the scenery is paused
        if data.paused {
            canvas.text_centered(width as i32 / 2, middle - 2, " Paused ", palette.text);
        }

        canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const WIDTH: u16 = 120;
    const HEIGHT: u16 = 30;

    fn widget() -> DofWidget {
        DofWidget::new(WIDTH, HEIGHT, Scene::with_rng(&mut StdRng::seed_from_u64(3)))
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn glyph_column(canvas: &Canvas, row: u16, glyph: char) -> Option<u16> {
        (0..canvas.width).find(|&x| canvas.get(x, row).map(|c| c.glyph) == Some(glyph))
    }

    #[test]
    fn test_quit_keys() {
        let mut widget = widget();
        let mut data = AppState::new(Settings::default());
        assert_eq!(widget.event(&key(KeyCode::Char('q')), &mut data), Control::Quit);
        assert_eq!(widget.event(&key(KeyCode::Esc), &mut data), Control::Quit);
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(widget.event(&ctrl_c, &mut data), Control::Quit);
        assert_eq!(widget.event(&key(KeyCode::Char('x')), &mut data), Control::Continue);
    }

    #[test]
    fn test_controls_edit_state_and_request_recompute() {
        let mut widget = widget();
        let mut data = AppState::new(Settings::default());
        widget.tick(&data);
        assert!(!widget.scheduler().is_pending());

        widget.event(&key(KeyCode::Char(']')), &mut data);
        assert_eq!(data.f_number, 4.0);
        assert!(widget.scheduler().is_pending());

        widget.event(&key(KeyCode::Right), &mut data);
        widget.event(&key(KeyCode::Right), &mut data);
        assert_eq!(data.subject_distance_mm, 5200.0);
        widget.event(&key(KeyCode::Up), &mut data);
        assert_eq!(data.focal_length_mm, 51.0);

        let result = widget.tick(&data);
        assert_eq!(widget.scheduler().recomputations(), 2);
        assert_eq!(result, crate::optics::compute_dof(&data.lens()));
    }

    #[test]
    fn test_pause_freezes_scenery() {
        let mut widget = widget();
        let mut data = AppState::new(Settings::default());
        widget.event(&key(KeyCode::Char('p')), &mut data);
        assert!(data.paused);
        let before = widget.scene().clone();
        widget.tick(&data);
        assert_eq!(widget.scene(), &before);

        widget.event(&key(KeyCode::Char('p')), &mut data);
        widget.tick(&data);
        assert_ne!(widget.scene(), &before);
    }

    #[test]
    fn test_mouse_drag_moves_focus() {
        let mut widget = widget();
        let mut data = AppState::new(Settings::default());
        let first = widget.tick(&data);
        let markers = MarkerPositions::new(data.subject_distance_mm, &first);
        let focus_column = fraction_to_column(markers.subject, WIDTH);

        widget.event(&mouse(MouseEventKind::Down(MouseButton::Left), focus_column, 10), &mut data);
        assert_eq!(widget.drag(), DragState::Dragging(DragTarget::Focus));

        widget.event(&mouse(MouseEventKind::Drag(MouseButton::Left), focus_column + 15, 10), &mut data);
        widget.event(&mouse(MouseEventKind::Drag(MouseButton::Left), focus_column + 20, 10), &mut data);
        assert!(data.subject_distance_mm > 5000.0);
        assert!(widget.scheduler().is_pending());

        widget.event(&mouse(MouseEventKind::Up(MouseButton::Left), focus_column + 20, 10), &mut data);
        assert_eq!(widget.drag(), DragState::Idle);
        let second = widget.tick(&data);
        assert!(second.near_limit_mm > first.near_limit_mm);
        assert_eq!(widget.scheduler().recomputations(), 2);
    }

    #[test]
    fn test_press_outside_scene_is_ignored() {
        let mut widget = widget();
        let mut data = AppState::new(Settings::default());
        let result = widget.tick(&data);
        let markers = MarkerPositions::new(data.subject_distance_mm, &result);
        let focus_column = fraction_to_column(markers.subject, WIDTH);
        widget.event(&mouse(MouseEventKind::Down(MouseButton::Left), focus_column, 0), &mut data);
        assert_eq!(widget.drag(), DragState::Idle);
    }

    #[test]
    fn test_focus_lost_releases_drag() {
        let mut widget = widget();
        let mut data = AppState::new(Settings::default());
        let result = widget.tick(&data);
        let markers = MarkerPositions::new(data.subject_distance_mm, &result);
        let hyper_column = fraction_to_column(markers.hyperfocal, WIDTH);
        widget.event(&mouse(MouseEventKind::Down(MouseButton::Left), hyper_column, 5), &mut data);
        assert_eq!(widget.drag(), DragState::Dragging(DragTarget::Hyperfocal));
        widget.event(&Event::FocusLost, &mut data);
        assert_eq!(widget.drag(), DragState::Idle);
    }

    #[test]
    fn test_paint_places_markers() {
        let mut widget = widget();
        let data = AppState::new(Settings::default());
        let result = widget.tick(&data);
        let canvas = widget.paint(&data, &result);
        let markers = MarkerPositions::new(data.subject_distance_mm, &result);
        let layout = Layout::new(HEIGHT);

        let row = layout.scene_top + 1;
        assert_eq!(glyph_column(&canvas, row, '│'), Some(fraction_to_column(markers.subject, WIDTH)));
        assert_eq!(
            canvas.get(0, layout.horizon).map(|c| c.glyph),
            Some('─')
        );
        let near_column = fraction_to_column(markers.near, WIDTH);
        assert_eq!(
            canvas.get(near_column, layout.horizon).map(|c| c.bg),
            Some(Palette::for_theme(Theme::Dark).zone)
        );
    }

    #[test]
    fn test_paint_small_terminal() {
        let mut widget = DofWidget::new(20, 5, Scene::with_rng(&mut StdRng::seed_from_u64(3)));
        let data = AppState::new(Settings::default());
        let result = widget.tick(&data);
        let canvas = widget.paint(&data, &result);
        assert_eq!(canvas.get(0, 0).map(|c| c.glyph), Some('T'));
    }

    #[test]
    fn test_resize_requests_recompute() {
        let mut widget = widget();
        let mut data = AppState::new(Settings::default());
        widget.tick(&data);
        widget.event(&Event::Resize(80, 24), &mut data);
        assert!(widget.scheduler().is_pending());
    }
}
