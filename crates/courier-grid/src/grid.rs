//! Immutable tile grid.
//!
//! # Data layout
//!
//! Tiles are stored row-major in a single `Vec<TileType>`; the tile at
//! `(x, y)` sits at index `y * width + x`.  The grid never changes after
//! construction — dynamic state (agents on tiles) lives with the caller and
//! is passed into path queries separately.

use courier_core::{Point, TileSpec, TileType};

use crate::error::{GridError, GridResult};

/// An immutable `width × height` matrix of [`TileType`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    width:  u32,
    height: u32,
    tiles:  Vec<TileType>,
}

impl Grid {
    /// Build a grid from a row-major tile vector.
    pub fn new(width: u32, height: u32, tiles: Vec<TileType>) -> GridResult<Self> {
        let expected = width as usize * height as usize;
        if tiles.len() != expected {
            return Err(GridError::MalformedMap {
                width,
                height,
                detail: format!("expected {expected} tiles, got {}", tiles.len()),
            });
        }
        Ok(Self { width, height, tiles })
    }

    /// Build a grid from the map sensor event's sparse tile list.
    ///
    /// Coordinates not mentioned in `specs` become `NonWalkable` — the
    /// simulator omits hole tiles from the announcement.
    pub fn from_specs(width: u32, height: u32, specs: &[TileSpec]) -> GridResult<Self> {
        let mut tiles = vec![TileType::NonWalkable; width as usize * height as usize];
        for spec in specs {
            if spec.x < 0 || spec.y < 0 || spec.x as u32 >= width || spec.y as u32 >= height {
                return Err(GridError::MalformedMap {
                    width,
                    height,
                    detail: format!("tile ({}, {}) out of bounds", spec.x, spec.y),
                });
            }
            let kind = TileType::from_wire(spec.kind)
                .map_err(|e| GridError::Parse(e.to_string()))?;
            tiles[spec.y as usize * width as usize + spec.x as usize] = kind;
        }
        Ok(Self { width, height, tiles })
    }

    /// Build a grid from an ASCII sketch — the notation used by the test
    /// fixtures and demo maps:
    ///
    /// | Char  | Tile                                    |
    /// |-------|-----------------------------------------|
    /// | `.`   | walkable                                |
    /// | `#`   | non-walkable                            |
    /// | `P`   | parcel generator                        |
    /// | `D`   | delivery zone                           |
    /// | `S`   | walkable agent start (returned aside)   |
    ///
    /// Rows are listed top to bottom; the **top** row has `y = height - 1`
    /// (y grows upward, matching the move convention).  Spaces are ignored.
    /// Returns the grid plus the `S` start points in reading order.
    pub fn from_ascii(sketch: &str) -> GridResult<(Grid, Vec<Point>)> {
        let rows: Vec<Vec<char>> = sketch
            .lines()
            .map(|l| l.chars().filter(|c| !c.is_whitespace()).collect())
            .filter(|r: &Vec<char>| !r.is_empty())
            .collect();
        if rows.is_empty() {
            return Err(GridError::Parse("empty map sketch".into()));
        }
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        if rows.iter().any(|r| r.len() as u32 != width) {
            return Err(GridError::Parse("ragged map sketch".into()));
        }

        let mut tiles = vec![TileType::NonWalkable; (width * height) as usize];
        let mut starts = Vec::new();
        for (row_idx, row) in rows.iter().enumerate() {
            let y = height - 1 - row_idx as u32;
            for (x, &c) in row.iter().enumerate() {
                let kind = match c {
                    '.' => TileType::Walkable,
                    '#' => TileType::NonWalkable,
                    'P' => TileType::ParcelGenerator,
                    'D' => TileType::Delivery,
                    'S' => {
                        starts.push(Point::new(x as i32, y as i32));
                        TileType::Walkable
                    }
                    other => {
                        return Err(GridError::Parse(format!("unknown map char {other:?}")));
                    }
                };
                tiles[(y * width) as usize + x] = kind;
            }
        }
        Ok((Self { width, height, tiles }, starts))
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as u32) < self.width && (p.y as u32) < self.height
    }

    // ── Tile queries ──────────────────────────────────────────────────────

    /// The tile at `p`, or `None` outside the grid.
    #[inline]
    pub fn get(&self, p: Point) -> Option<TileType> {
        if !self.in_bounds(p) {
            return None;
        }
        Some(self.tiles[p.y as usize * self.width as usize + p.x as usize])
    }

    /// `true` if `p` is inside the grid and not a blocked tile.
    #[inline]
    pub fn is_walkable(&self, p: Point) -> bool {
        self.get(p).is_some_and(TileType::is_walkable)
    }

    // ── Zone scans ────────────────────────────────────────────────────────

    /// All delivery tiles, in row-major order.
    pub fn delivery_zones(&self) -> Vec<Point> {
        self.scan(TileType::Delivery)
    }

    /// All parcel-generator tiles, in row-major order.
    pub fn generators(&self) -> Vec<Point> {
        self.scan(TileType::ParcelGenerator)
    }

    fn scan(&self, kind: TileType) -> Vec<Point> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let p = Point::new(x as i32, y as i32);
                if self.tiles[(y * self.width + x) as usize] == kind {
                    out.push(p);
                }
            }
        }
        out
    }
}
