/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The world itself is drawn through the `Surface` trait as flat-colored
/// rectangles, one per tile plus one for the player. A terminal cell is
/// one surface pixel; a tile is `tile_cols × tile_rows` cells.
///
/// Screen layout:
///   row 0          HUD (selected block, position, state)
///   rows 1..h-1    world
///   row h-1        on-screen controls

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::config::DisplayConfig;
use crate::domain::entity::ActorState;
use crate::domain::tile::Tile;
use crate::sim::world::{GameState, WorldGrid};
use super::controls::{Control, VirtualControls};

// ── Palette ──

pub const SKY: Color = Color::Rgb { r: 0x87, g: 0xCE, b: 0xEB };
pub const PLAYER: Color = Color::Rgb { r: 0xFF, g: 0x00, b: 0x00 };
/// Solid codes with no palette entry.
pub const UNKNOWN_SOLID: Color = Color::Rgb { r: 0xA9, g: 0xA9, b: 0xA9 };

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const BAR_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };
const BUTTON_BG: Color = Color::Rgb { r: 60, g: 60, b: 90 };
const BUTTON_ACTIVE_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };

/// Display color of a tile code.
pub fn tile_color(tile: Tile) -> Color {
    match tile.0 {
        0 => SKY,
        1 => Color::Rgb { r: 0x65, g: 0x43, b: 0x21 }, // Dirt
        2 => Color::Rgb { r: 0x80, g: 0x80, b: 0x80 }, // Stone
        3 => Color::Rgb { r: 0x22, g: 0x8B, b: 0x22 }, // Grass
        _ => UNKNOWN_SOLID,
    }
}

// ── Surface: rectangle-fill drawing target ──

pub trait Surface {
    /// Fill a `w × h` rectangle with its top-left at (x, y), in surface
    /// pixels. Parts outside the surface are clipped.
    fn fill_rect(&mut self, x: i64, y: i64, w: i64, h: i64, color: Color);
}

/// Draw the world grid, then the player on top. Reads state only.
pub fn draw_scene<S: Surface>(surface: &mut S, state: &GameState, tile_w: usize, tile_h: usize) {
    let tw = tile_w as i64;
    let th = tile_h as i64;

    for (row, tiles) in state.grid.rows().enumerate() {
        for (col, &tile) in tiles.iter().enumerate() {
            surface.fill_rect(col as i64 * tw, row as i64 * th, tw, th, tile_color(tile));
        }
    }

    let p = &state.player;
    let px = (p.x * tile_w as f64).floor() as i64;
    let py = (p.y * tile_h as f64).floor() as i64;
    let pw = (p.size * tile_w as f64).round() as i64;
    let ph = (p.size * tile_h as f64).round() as i64;
    surface.fill_rect(px, py, pw, ph, PLAYER);
}

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: BAR_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn solid(color: Color) -> Self {
        Cell { ch: ' ', fg: color, bg: color }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    /// Returns the column after the last char written.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) -> usize {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width { break; }
            self.set(cx, y, Cell { ch, fg, bg });
            cx += 1;
        }
        cx
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell { ch: ' ', fg: Color::White, bg });
        }
    }
}

/// A horizontal band of the frame buffer used as a drawing surface.
struct Region<'a> {
    buf: &'a mut FrameBuffer,
    top: usize,
    height: usize,
}

impl Surface for Region<'_> {
    fn fill_rect(&mut self, x: i64, y: i64, w: i64, h: i64, color: Color) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(w).min(self.buf.width as i64);
        let y1 = y.saturating_add(h).min(self.height as i64);
        let cell = Cell::solid(color);
        for py in y0..y1 {
            for px in x0..x1 {
                self.buf.set(px as usize, self.top + py as usize, cell);
            }
        }
    }
}

// ── Renderer ──

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 1;
/// HUD row above the map + controls row below it.
const RESERVED_ROWS: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    tile_w: usize,
    tile_h: usize,
    keyboard_enhanced: bool,
}

impl Renderer {
    pub fn new(display: &DisplayConfig) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            tile_w: display.tile_cols.max(1),
            tile_h: display.tile_rows.max(1),
            keyboard_enhanced: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture,
            SetBackgroundColor(BAR_BG),
            Clear(ClearType::All)
        )?;

        // Release events make held keys precise; without them input
        // falls back to a hold timeout.
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.keyboard_enhanced = true;
        }
        log::debug!("keyboard enhancement: {}", self.keyboard_enhanced);

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw, th);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.keyboard_enhanced {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn keyboard_enhanced(&self) -> bool {
        self.keyboard_enhanced
    }

    pub fn term_size(&self) -> (usize, usize) {
        (self.term_w, self.term_h)
    }

    /// Adopt a new terminal size and force a full repaint.
    pub fn resize(&mut self, w: u16, h: u16) {
        self.term_w = w as usize;
        self.term_h = h as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);
    }

    /// World dimensions (in tiles) that cover the current map area.
    pub fn grid_dims(&self) -> (usize, usize) {
        let map_h = self.term_h.saturating_sub(RESERVED_ROWS);
        WorldGrid::dims_for_viewport(self.term_w, map_h, self.tile_w, self.tile_h)
    }

    pub fn render(&mut self, state: &GameState, controls: &VirtualControls) -> io::Result<()> {
        self.front.clear();
        compose_frame(&mut self.front, state, controls, self.tile_w, self.tile_h);

        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = BAR_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(BAR_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }
}

// ── Compose: build front buffer content ──

fn compose_frame(
    buf: &mut FrameBuffer,
    state: &GameState,
    controls: &VirtualControls,
    tile_w: usize,
    tile_h: usize,
) {
    if buf.height < RESERVED_ROWS + 1 {
        return;
    }

    compose_hud(buf, state);

    let height = buf.height - RESERVED_ROWS;
    let mut map = Region { buf: &mut *buf, top: MAP_ROW, height };
    draw_scene(&mut map, state, tile_w, tile_h);

    compose_controls(buf, state, controls);
}

fn compose_hud(buf: &mut FrameBuffer, state: &GameState) {
    buf.fill_row(HUD_ROW, HUD_BG);
    let mut x = buf.put_str(0, HUD_ROW, " TILECRAFT  Block: ", Color::White, HUD_BG);

    let swatch = tile_color(state.selected.tile());
    x = buf.put_str(x, HUD_ROW, "  ", swatch, swatch);

    let p = &state.player;
    let status = match p.state() {
        ActorState::Grounded => "Grounded",
        ActorState::Airborne => "Airborne",
    };
    let info = format!(
        " {:<6} Pos {},{}  {}",
        state.selected.name(),
        p.x.floor() as i64,
        p.y.floor() as i64,
        status,
    );
    x = buf.put_str(x, HUD_ROW, &info, Color::White, HUD_BG);

    let help = "  ←/A →/D walk  ↑/W/Space jump  B build  E block  Q quit";
    if x + help.chars().count() <= buf.width {
        buf.put_str(x, HUD_ROW, help, Color::DarkGrey, HUD_BG);
    }
}

fn compose_controls(buf: &mut FrameBuffer, state: &GameState, controls: &VirtualControls) {
    let row = controls.row();
    if row >= buf.height {
        return;
    }
    buf.fill_row(row, BAR_BG);
    for b in controls.buttons() {
        let (fg, bg) = if controls.is_active(b.control) {
            (Color::Black, BUTTON_ACTIVE_BG)
        } else if b.control == Control::Cycle {
            (Color::White, tile_color(state.selected.tile()))
        } else {
            (Color::White, BUTTON_BG)
        };
        let mut x = buf.put_str(b.col, row, "[", fg, bg);
        x = buf.put_str(x, row, b.label, fg, bg);
        buf.put_str(x, row, "]", fg, bg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::domain::tile::BlockKind;

    /// Records every fill call.
    #[derive(Default)]
    struct Recorder {
        rects: Vec<(i64, i64, i64, i64, Color)>,
    }

    impl Surface for Recorder {
        fn fill_rect(&mut self, x: i64, y: i64, w: i64, h: i64, color: Color) {
            self.rects.push((x, y, w, h, color));
        }
    }

    fn state(tiles_x: usize, tiles_y: usize) -> GameState {
        GameState::new(tiles_x, tiles_y, PhysicsConfig::default())
    }

    #[test]
    fn palette_matches_block_colors() {
        assert_eq!(tile_color(Tile::EMPTY), SKY);
        assert_eq!(tile_color(Tile::DIRT), Color::Rgb { r: 101, g: 67, b: 33 });
        assert_eq!(tile_color(Tile::STONE), Color::Rgb { r: 128, g: 128, b: 128 });
        assert_eq!(tile_color(Tile::GRASS), Color::Rgb { r: 34, g: 139, b: 34 });
        assert_eq!(tile_color(Tile(9)), UNKNOWN_SOLID);
    }

    #[test]
    fn scene_fills_every_tile_then_player() {
        let s = state(10, 8);
        let mut r = Recorder::default();
        draw_scene(&mut r, &s, 2, 1);
        assert_eq!(r.rects.len(), 10 * 8 + 1);

        // row-major, pixel coordinates scaled by tile size
        assert_eq!(r.rects[0], (0, 0, 2, 1, SKY));
        assert_eq!(r.rects[1], (2, 0, 2, 1, SKY));
        assert_eq!(r.rects[5 * 10 + 3], (6, 5, 2, 1, tile_color(Tile::DIRT)));

        // spawn (5, 2) → pixels (10, 2)
        assert_eq!(*r.rects.last().unwrap(), (10, 2, 2, 1, PLAYER));
    }

    #[test]
    fn player_position_truncates_toward_negative_infinity() {
        let mut s = state(4, 4);
        s.player.x = 1.75;
        s.player.y = -0.5;
        let mut r = Recorder::default();
        draw_scene(&mut r, &s, 2, 2);
        assert_eq!(*r.rects.last().unwrap(), (3, -1, 2, 2, PLAYER));
    }

    #[test]
    fn drawing_does_not_touch_state() {
        let s = state(6, 6);
        let before = (s.grid.clone(), s.player.clone(), s.selected, s.tick);
        let mut r = Recorder::default();
        draw_scene(&mut r, &s, 2, 1);
        assert_eq!(before, (s.grid.clone(), s.player.clone(), s.selected, s.tick));
    }

    #[test]
    fn region_clips_to_its_band() {
        let mut buf = FrameBuffer::new(6, 5);
        let mut region = Region { buf: &mut buf, top: 1, height: 3 };
        region.fill_rect(-2, -2, 4, 3, PLAYER);
        region.fill_rect(4, 2, 10, 10, SKY);

        assert_eq!(buf.get(0, 0), Cell::BLANK); // HUD row untouched
        assert_eq!(buf.get(0, 1), Cell::solid(PLAYER));
        assert_eq!(buf.get(1, 1), Cell::solid(PLAYER));
        assert_eq!(buf.get(2, 1), Cell::BLANK);
        assert_eq!(buf.get(5, 3), Cell::solid(SKY));
        assert_eq!(buf.get(5, 4), Cell::BLANK); // controls row untouched
    }

    #[test]
    fn frame_has_hud_world_and_controls() {
        let (w, h) = (40, 10);
        let mut buf = FrameBuffer::new(w, h);
        let mut s = state(20, 8);
        s.selected = BlockKind::Grass;
        let mut controls = VirtualControls::new();
        controls.layout(w, h);
        controls.jump = true;

        compose_frame(&mut buf, &s, &controls, 2, 1);

        assert_eq!(buf.get(1, HUD_ROW).ch, 'T');
        // top-left world cell is sky, bottom world row is dirt
        assert_eq!(buf.get(0, MAP_ROW), Cell::solid(SKY));
        assert_eq!(buf.get(0, MAP_ROW + 7), Cell::solid(tile_color(Tile::DIRT)));
        // player at tile (10, 2)
        assert_eq!(buf.get(20, MAP_ROW + 2), Cell::solid(PLAYER));
        assert_eq!(buf.get(21, MAP_ROW + 2), Cell::solid(PLAYER));

        let jump = controls.buttons().iter().find(|b| b.control == Control::Jump).unwrap();
        let cell = buf.get(jump.col, h - 1);
        assert_eq!(cell.ch, '[');
        assert_eq!(cell.bg, BUTTON_ACTIVE_BG);
        let cycle = controls.buttons().iter().find(|b| b.control == Control::Cycle).unwrap();
        assert_eq!(buf.get(cycle.col, h - 1).bg, tile_color(Tile::GRASS));
    }

    #[test]
    fn tiny_terminal_draws_nothing() {
        let mut buf = FrameBuffer::new(10, 2);
        let s = state(5, 1);
        let controls = VirtualControls::new();
        compose_frame(&mut buf, &s, &controls, 2, 1);
        assert!(buf.cells.iter().all(|c| *c == Cell::BLANK));
    }
}
