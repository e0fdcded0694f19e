use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use geo_types::{Coord, Line, Rect};
use log::warn;

use crate::error::{Result, TrapMapError};
use crate::matrix::AdjacencyMatrix;

/// Parsed input file: declared segment count, bounding box, raw segments.
#[derive(Debug)]
pub struct Scene {
    pub declared_segments: usize,
    pub bounds: Rect<f64>,
    pub segments: Vec<Line<f64>>,
}

pub fn read_scene(path: impl AsRef<Path>) -> Result<Scene> {
    parse_scene(BufReader::new(File::open(path)?))
}

/// Parses the segment list format: line 1 the segment count, line 2 the
/// bounding box as `xmin ymin xmax ymax`, then one `x1 y1 x2 y2` segment
/// per line until a blank line or the end of input. Endpoint ordering is
/// normalized later, at insertion.
pub fn parse_scene(reader: impl BufRead) -> Result<Scene> {
    let lines: Vec<String> = reader.lines().collect::<std::io::Result<_>>()?;
    let mut rows = lines.iter().enumerate();

    let (_, count_line) = rows
        .next()
        .ok_or_else(|| parse_err(1, "missing segment count"))?;
    let declared_segments: usize = count_line
        .trim()
        .parse()
        .map_err(|e| parse_err(1, format!("invalid segment count: {}", e)))?;

    let (_, bounds_line) = rows
        .next()
        .ok_or_else(|| parse_err(2, "missing bounding box"))?;
    let corners = parse_floats(bounds_line, 2)?;
    if corners.len() != 4 {
        return Err(parse_err(2, "bounding box needs four coordinates"));
    }
    let bounds = Rect::new(
        Coord {
            x: corners[0],
            y: corners[1],
        },
        Coord {
            x: corners[2],
            y: corners[3],
        },
    );

    let mut segments = Vec::new();
    for (row, line) in rows {
        if line.trim().is_empty() {
            break;
        }
        let coords = parse_floats(line, row + 1)?;
        if coords.len() != 4 {
            return Err(parse_err(row + 1, "segment needs four coordinates"));
        }
        segments.push(Line::new(
            Coord {
                x: coords[0],
                y: coords[1],
            },
            Coord {
                x: coords[2],
                y: coords[3],
            },
        ));
    }

    if segments.len() != declared_segments {
        warn!(
            "input declares {} segments but contains {}",
            declared_segments,
            segments.len()
        );
    }

    Ok(Scene {
        declared_segments,
        bounds,
        segments,
    })
}

fn parse_floats(line: &str, row: usize) -> Result<Vec<f64>> {
    line.split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|e| parse_err(row, format!("invalid coordinate {:?}: {}", token, e)))
        })
        .collect()
}

fn parse_err(line: usize, message: impl Into<String>) -> TrapMapError {
    TrapMapError::Parse {
        line,
        message: message.into(),
    }
}

/// Writes the matrix as CSV: a `NAN`-prefixed header of catalogue labels,
/// one row per entry with a trailing row sum, and a final row of column
/// sums ending in the grand total.
pub fn write_matrix<W: Write>(writer: W, matrix: &AdjacencyMatrix) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(matrix.len() + 2);
    header.push("NAN".to_string());
    header.extend(matrix.labels.iter().cloned());
    header.push("SUM".to_string());
    out.write_record(&header)?;

    for (i, row) in matrix.cells.iter().enumerate() {
        let mut record = Vec::with_capacity(row.len() + 2);
        record.push(matrix.labels[i].clone());
        record.extend(row.iter().map(u64::to_string));
        record.push(matrix.row_sums[i].to_string());
        out.write_record(&record)?;
    }

    let mut footer = Vec::with_capacity(matrix.len() + 2);
    footer.push("SUM".to_string());
    footer.extend(matrix.col_sums.iter().map(u64::to_string));
    footer.push(matrix.total.to_string());
    out.write_record(&footer)?;

    out.flush()?;
    Ok(())
}

pub fn write_matrix_file(path: impl AsRef<Path>, matrix: &AdjacencyMatrix) -> Result<()> {
    write_matrix(File::create(path)?, matrix)
}
