//! Turtle state and the resource-bounded grid operations that drive it.

use std::collections::HashSet;
use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Resource, Result};

/// The five primitive script commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Move one cell in +y.
    Up,
    /// Move one cell in -y.
    Down,
    /// Move one cell in -x.
    Left,
    /// Move one cell in +x.
    Right,
    /// Paint the cell under the turtle.
    Paint,
}

impl Command {
    /// Parses an exact keyword. Matching is case-sensitive; anything that
    /// is not one of the five keywords is `None`.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "paint" => Some(Self::Paint),
            _ => None,
        }
    }

    /// The script keyword for this command.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
            Self::Paint => "paint",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A resource counter: a finite pool or the unbounded sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Budget {
    /// A finite pool with this many units left.
    Finite(u64),
    /// Never runs out; spending from it is a no-op.
    Unlimited,
}

impl Budget {
    /// Whether the next unit of spend would fail.
    pub fn is_exhausted(self) -> bool {
        matches!(self, Self::Finite(0))
    }

    /// Removes one unit, raising the halting condition for `resource` when
    /// the pool is already empty.
    fn consume(&mut self, resource: Resource) -> Result<()> {
        match self {
            Self::Finite(0) => Err(Error::Exhausted(resource)),
            Self::Finite(n) => {
                *n -= 1;
                Ok(())
            }
            Self::Unlimited => Ok(()),
        }
    }

    /// Removes one unit from a finite pool. Callers verify
    /// [`Budget::is_exhausted`] first; an empty pool stays at zero.
    fn debit(&mut self) {
        if let Self::Finite(n) = self {
            *n = n.saturating_sub(1);
        }
    }
}

/// Inclusive axis-aligned bounds of every painted cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl BoundingBox {
    /// A box covering a single cell.
    fn point(cell: IVec2) -> Self {
        Self {
            x_min: cell.x,
            x_max: cell.x,
            y_min: cell.y,
            y_max: cell.y,
        }
    }

    /// Widens the box to cover `cell`, one axis at a time. Returns whether
    /// any bound moved. Bounds only ever grow.
    fn widen(&mut self, cell: IVec2) -> bool {
        let mut changed = false;
        if cell.x < self.x_min || cell.x > self.x_max {
            self.x_min = self.x_min.min(cell.x);
            self.x_max = self.x_max.max(cell.x);
            changed = true;
        }
        if cell.y < self.y_min || cell.y > self.y_max {
            self.y_min = self.y_min.min(cell.y);
            self.y_max = self.y_max.max(cell.y);
            changed = true;
        }
        changed
    }

    /// Cell count along the x axis.
    pub fn width(&self) -> u32 {
        (self.x_max - self.x_min) as u32 + 1
    }

    /// Cell count along the y axis.
    pub fn height(&self) -> u32 {
        (self.y_max - self.y_min) as u32 + 1
    }
}

/// What a single paint operation did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaintOutcome {
    /// Whether a unit of paint was spent. Only false when repainting an
    /// already-painted cell with [`TurtleConfig::repaint_consumes_paint`]
    /// switched off.
    pub paint_consumed: bool,
    /// Whether this paint widened the bounding box.
    pub bounds_changed: bool,
}

/// Starting position and resource budgets for a [`Turtle`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TurtleConfig {
    /// Grid cell the turtle starts on.
    pub start: IVec2,
    /// Spent by every operation, moves and paints alike.
    pub battery: Budget,
    /// Spent by moves only.
    pub fuel: Budget,
    /// Spent by painting cells.
    pub paint: Budget,
    /// Whether repainting an already-painted cell still spends paint.
    pub repaint_consumes_paint: bool,
}

impl Default for TurtleConfig {
    fn default() -> Self {
        Self {
            start: IVec2::ZERO,
            battery: Budget::Finite(1000),
            fuel: Budget::Unlimited,
            paint: Budget::Unlimited,
            repaint_consumes_paint: true,
        }
    }
}

/// A scripted turtle: a position on the integer grid, three resource
/// pools, and the record of every cell painted so far.
///
/// The painted-cell order and membership records always change together,
/// so an observer peeking mid-script never sees them disagree. State stays
/// inspectable after a halt, frozen at the moment the resource ran out.
#[derive(Clone, Debug, Serialize)]
pub struct Turtle {
    position: IVec2,
    battery: Budget,
    fuel: Budget,
    paint: Budget,
    repaint_consumes_paint: bool,
    /// Distinct painted cells, in first-paint order.
    painted_order: Vec<IVec2>,
    /// Membership index over `painted_order`.
    #[serde(skip)]
    painted_set: HashSet<IVec2>,
    bounds: Option<BoundingBox>,
}

impl Turtle {
    /// Creates a turtle from its starting configuration.
    pub fn new(config: TurtleConfig) -> Self {
        Self {
            position: config.start,
            battery: config.battery,
            fuel: config.fuel,
            paint: config.paint,
            repaint_consumes_paint: config.repaint_consumes_paint,
            painted_order: Vec::new(),
            painted_set: HashSet::new(),
            bounds: None,
        }
    }

    /// Current grid position.
    pub fn position(&self) -> IVec2 {
        self.position
    }

    /// Remaining budget for `resource`.
    pub fn remaining(&self, resource: Resource) -> Budget {
        match resource {
            Resource::Battery => self.battery,
            Resource::Fuel => self.fuel,
            Resource::Paint => self.paint,
        }
    }

    /// Painted cells in first-paint order. Repaints do not repeat a cell.
    pub fn painted_cells(&self) -> &[IVec2] {
        &self.painted_order
    }

    /// Number of distinct painted cells.
    pub fn painted_count(&self) -> usize {
        self.painted_order.len()
    }

    /// Whether `cell` has been painted.
    pub fn is_painted(&self, cell: IVec2) -> bool {
        self.painted_set.contains(&cell)
    }

    /// Bounds of the painted cells, `None` until the first paint.
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }

    /// Moves one cell in +y.
    pub fn up(&mut self) -> Result<()> {
        self.step(IVec2::Y)
    }

    /// Moves one cell in -y.
    pub fn down(&mut self) -> Result<()> {
        self.step(IVec2::NEG_Y)
    }

    /// Moves one cell in -x.
    pub fn left(&mut self) -> Result<()> {
        self.step(IVec2::NEG_X)
    }

    /// Moves one cell in +x.
    pub fn right(&mut self) -> Result<()> {
        self.step(IVec2::X)
    }

    /// Moves the turtle by `step`.
    ///
    /// `step` must be the zero vector or one of the four unit axis vectors;
    /// anything else is an [`Error::InvalidStep`] contract violation that
    /// leaves the turtle untouched. The zero vector is a no-op and spends
    /// nothing. A real step spends one battery and one fuel, with battery
    /// exhaustion reported first; neither pool is debited unless both can
    /// cover the move, so a halted move changes no counter and no position.
    /// The grid is `i32` per axis; a step past its edge saturates instead
    /// of wrapping, and still costs.
    pub fn step(&mut self, step: IVec2) -> Result<()> {
        if step == IVec2::ZERO {
            return Ok(());
        }
        if step.length_squared() != 1 {
            return Err(Error::InvalidStep(step));
        }
        if self.battery.is_exhausted() {
            return Err(Error::Exhausted(Resource::Battery));
        }
        if self.fuel.is_exhausted() {
            return Err(Error::Exhausted(Resource::Fuel));
        }
        self.battery.debit();
        self.fuel.debit();
        self.position = self.position.saturating_add(step);
        Ok(())
    }

    /// Paints the cell under the turtle.
    ///
    /// One battery unit is always spent first, even when the paint pool
    /// then turns out to be empty. Painting a fresh cell spends one paint
    /// unit, records the cell and widens the bounds. Repainting spends
    /// paint only when configured to, and never moves the bounds.
    pub fn paint(&mut self) -> Result<PaintOutcome> {
        self.battery.consume(Resource::Battery)?;

        if self.painted_set.contains(&self.position) {
            if self.repaint_consumes_paint {
                self.paint.consume(Resource::Paint)?;
            }
            return Ok(PaintOutcome {
                paint_consumed: self.repaint_consumes_paint,
                bounds_changed: false,
            });
        }

        self.paint.consume(Resource::Paint)?;
        self.painted_set.insert(self.position);
        self.painted_order.push(self.position);

        let bounds_changed = match &mut self.bounds {
            Some(bounds) => bounds.widen(self.position),
            None => {
                self.bounds = Some(BoundingBox::point(self.position));
                true
            }
        };

        Ok(PaintOutcome {
            paint_consumed: true,
            bounds_changed,
        })
    }
}
