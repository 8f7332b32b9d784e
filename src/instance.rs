//! Parsing and representation of TSP instances.
//!
//! Handles TSP-LIB style files: a header with a `DIMENSION : <int>`
//! declaration followed by a `NODE_COORD_SECTION` of `<id> <x> <y>` lines
//! terminated by `EOF`. Distances are Euclidean 2D, derived on demand from
//! the coordinates and only materialized into a full matrix when a solver
//! needs one.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// A city position in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A named TSP instance.
///
/// Coordinate order defines the implicit city indices `0..dimension`;
/// both are immutable after loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TspInstance {
    /// Name of the instance (file stem by default).
    pub name: String,
    /// Number of cities.
    pub dimension: usize,
    /// City coordinates, indexed by city.
    pub coordinates: Vec<Point>,
}

impl TspInstance {
    /// Parse an instance from a TSP-LIB format file.
    ///
    /// The instance name is taken from the `NAME` header when present,
    /// otherwise from the file stem.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, HarnessError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let fallback_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::parse(BufReader::new(file), &fallback_name)
    }

    /// Parse an instance from any buffered reader.
    pub fn parse<R: BufRead>(reader: R, fallback_name: &str) -> Result<Self, HarnessError> {
        let mut name = String::new();
        let mut dimension: Option<usize> = None;
        let mut coordinates: Vec<Point> = Vec::new();
        let mut in_coords = false;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }
            if line == "EOF" {
                break;
            }

            if !in_coords {
                if let Some(value) = header_value(line, "NAME") {
                    name = value.to_string();
                    continue;
                }
                if let Some(value) = header_value(line, "DIMENSION") {
                    let parsed = value
                        .parse::<usize>()
                        .map_err(|_| HarnessError::Format(format!("invalid dimension: {value}")))?;
                    if parsed == 0 {
                        return Err(HarnessError::Format("dimension must be positive".into()));
                    }
                    dimension = Some(parsed);
                    continue;
                }
                if line.starts_with("NODE_COORD_SECTION") {
                    in_coords = true;
                }
                // Other header keys (TYPE, COMMENT, EDGE_WEIGHT_TYPE, ...) are ignored.
                continue;
            }

            let mut parts = line.split_whitespace();
            let (Some(_id), Some(x), Some(y)) = (parts.next(), parts.next(), parts.next()) else {
                return Err(HarnessError::Format(format!("malformed coordinate line: {line}")));
            };
            let x: f64 = x
                .parse()
                .map_err(|_| HarnessError::Format(format!("invalid x coordinate: {x}")))?;
            let y: f64 = y
                .parse()
                .map_err(|_| HarnessError::Format(format!("invalid y coordinate: {y}")))?;
            coordinates.push(Point::new(x, y));
        }

        let dimension =
            dimension.ok_or_else(|| HarnessError::Format("dimension not found".into()))?;

        if coordinates.len() != dimension {
            return Err(HarnessError::Format(format!(
                "expected {} coordinates, but found {}",
                dimension,
                coordinates.len()
            )));
        }

        if name.is_empty() {
            name = fallback_name.to_string();
        }

        Ok(TspInstance {
            name,
            dimension,
            coordinates,
        })
    }

    /// Read the declared dimension from an instance file header without
    /// parsing the coordinate section. Cheap even for very large instances.
    pub fn peek_dimension<P: AsRef<Path>>(path: P) -> Result<usize, HarnessError> {
        let file = File::open(path.as_ref())?;
        for line in BufReader::new(file).lines() {
            let line = line?;
            if let Some(value) = header_value(line.trim(), "DIMENSION") {
                return value
                    .parse::<usize>()
                    .map_err(|_| HarnessError::Format(format!("invalid dimension: {value}")));
            }
        }
        Err(HarnessError::Format(format!(
            "dimension not found in {}",
            path.as_ref().display()
        )))
    }

    /// Euclidean distance between two cities.
    ///
    /// Symmetric, zero on the diagonal. Panics when an index is outside
    /// `0..dimension`.
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 0.0;
        }
        self.coordinates[i].distance(&self.coordinates[j])
    }

    /// Materialize the full symmetric distance matrix.
    pub fn distance_matrix(&self) -> Vec<Vec<f64>> {
        let n = self.dimension;
        let mut matrix = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in i + 1..n {
                let d = self.distance(i, j);
                matrix[i][j] = d;
                matrix[j][i] = d;
            }
        }
        matrix
    }

    /// Total cost of a closed tour, including the edge from the last city
    /// back to the first.
    ///
    /// Fails with `InvalidTour` unless `tour` is a permutation of
    /// `0..dimension`; a malformed tour would otherwise yield a silently
    /// wrong number.
    pub fn tour_cost(&self, tour: &[usize]) -> Result<f64, HarnessError> {
        self.check_tour(tour)?;

        let mut cost = 0.0;
        for i in 0..tour.len() {
            let j = (i + 1) % tour.len();
            cost += self.distance(tour[i], tour[j]);
        }
        Ok(cost)
    }

    /// Verify that a tour is a permutation of this instance's city indices.
    pub fn check_tour(&self, tour: &[usize]) -> Result<(), HarnessError> {
        if tour.len() != self.dimension {
            return Err(HarnessError::InvalidTour(format!(
                "tour visits {} cities, instance has {}",
                tour.len(),
                self.dimension
            )));
        }
        let mut seen = vec![false; self.dimension];
        for &city in tour {
            if city >= self.dimension {
                return Err(HarnessError::InvalidTour(format!(
                    "city index {} out of range",
                    city
                )));
            }
            if seen[city] {
                return Err(HarnessError::InvalidTour(format!(
                    "city {} visited more than once",
                    city
                )));
            }
            seen[city] = true;
        }
        Ok(())
    }

    /// Summary statistics for reporting.
    ///
    /// Walks all city pairs; intended for interactive analysis, not for the
    /// evaluation path.
    pub fn statistics(&self) -> InstanceStatistics {
        let min_x = self.coordinates.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = self.coordinates.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = self.coordinates.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = self.coordinates.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        let mut sum = 0.0;
        let mut count = 0usize;
        let mut min_distance = f64::INFINITY;
        let mut max_distance = 0.0f64;
        for i in 0..self.dimension {
            for j in i + 1..self.dimension {
                let d = self.distance(i, j);
                sum += d;
                count += 1;
                min_distance = min_distance.min(d);
                max_distance = max_distance.max(d);
            }
        }
        let avg_distance = if count > 0 { sum / count as f64 } else { 0.0 };
        if count == 0 {
            min_distance = 0.0;
        }

        InstanceStatistics {
            name: self.name.clone(),
            dimension: self.dimension,
            width: max_x - min_x,
            height: max_y - min_y,
            avg_distance,
            min_distance,
            max_distance,
        }
    }
}

/// Extract the value of a `KEY : value` header line, tolerating both
/// `KEY: value` and `KEY : value` spellings.
fn header_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(key)?;
    let rest = rest.trim_start();
    let rest = rest.strip_prefix(':')?;
    Some(rest.trim())
}

/// Summary statistics about a TSP instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub dimension: usize,
    pub width: f64,
    pub height: f64,
    pub avg_distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Cities: {}", self.dimension)?;
        writeln!(f, "  Bounding box: {:.2} x {:.2}", self.width, self.height)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Min distance: {:.2}", self.min_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)
    }
}
