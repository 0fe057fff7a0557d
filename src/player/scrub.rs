use ratatui::layout::Rect;

/// Drag state for the progress bar. Nothing is committed until release.
#[derive(Debug, Default, Clone)]
pub struct Scrubber {
    drag: Option<Drag>,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    left: u16,
    width: u16,
    fraction: f64,
}

/// `clamp((x - left) / width, 0, 1)`.
pub fn fraction_at(x: u16, left: u16, width: u16) -> f64 {
    if width == 0 {
        return 0.0;
    }
    ((f64::from(x) - f64::from(left)) / f64::from(width)).clamp(0.0, 1.0)
}

/// Level for a click on a cell gauge: the first cell is 0 and the last is 1.
pub fn level_at(x: u16, left: u16, width: u16) -> f64 {
    match width {
        0 => 0.0,
        1 => 1.0,
        _ => fraction_at(x, left, width - 1),
    }
}

impl Scrubber {
    /// Start a drag on `area` when `(x, y)` is inside it.
    pub fn begin(&mut self, x: u16, y: u16, area: Rect) -> bool {
        let inside = x >= area.x
            && x < area.x.saturating_add(area.width)
            && y >= area.y
            && y < area.y.saturating_add(area.height);
        if !inside {
            return false;
        }
        self.drag = Some(Drag {
            left: area.x,
            width: area.width,
            fraction: fraction_at(x, area.x, area.width),
        });
        true
    }

    pub fn drag(&mut self, x: u16) {
        if let Some(d) = self.drag.as_mut() {
            d.fraction = fraction_at(x, d.left, d.width);
        }
    }

    /// Finish the drag, returning the fraction to seek to.
    pub fn end(&mut self) -> Option<f64> {
        self.drag.take().map(|d| d.fraction)
    }

    pub fn cancel(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Position to display instead of the live one while dragging.
    pub fn preview(&self) -> Option<f64> {
        self.drag.map(|d| d.fraction)
    }
}
