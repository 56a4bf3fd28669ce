/////////////////////////////////////////////////////////////////////////////////////////////
//
// Saves and loads sparse grids as versioned JSON envelopes.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use std::{
    error::Error,
    fmt,
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    bounding_box::BoundingBox,
    point::GridPoint,
    storage::{GridError, GridStorage, GridType},
};

const JSON_FORMAT_NAME: &str = "ferreus_sparse_grid.json";
const JSON_VERSION: u32 = 1;

/// Serialized form of a grid. Points are listed in sequence order so that
/// reloading reproduces the same sequence numbers.
#[derive(Serialize, Deserialize)]
struct GridData {
    dim: usize,
    grid_type: GridType,
    bounding_box: BoundingBox,
    #[serde(default)]
    algorithmic_dims: Option<Vec<usize>>,
    points: Vec<GridPoint>,
}

#[derive(Serialize)]
struct JsonEnvelopeRef<'a, T: ?Sized> {
    format: &'static str,
    version: u32,
    #[serde(flatten)]
    grid: &'a T,
}

#[derive(Deserialize)]
struct JsonEnvelopeOwned<T> {
    format: String,
    version: u32,
    #[serde(flatten)]
    grid: T,
}

type GridIOResult<T> = std::result::Result<T, GridIOError>;

/// Errors that can occur when saving or loading a [`GridStorage`].
#[derive(Debug)]
pub enum GridIOError {
    /// Failed to create the target file.
    Create { path: PathBuf, source: io::Error },
    /// Failed to open an existing grid file.
    Open { path: PathBuf, source: io::Error },
    /// Failed to flush buffered output when finishing a write.
    Flush { path: PathBuf, source: io::Error },
    /// Error serializing the grid to JSON.
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Error parsing JSON when reading a grid.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// The stored points do not form a valid grid.
    Grid { path: PathBuf, source: GridError },
    /// The JSON `format` field does not match.
    FormatMismatch {
        path: PathBuf,
        found: String,
        expected: &'static str,
    },
    /// The JSON `version` field does not match.
    VersionMismatch {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
}

impl fmt::Display for GridIOError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridIOError::Create { path, source } => {
                write!(f, "creating {}: {}", path.display(), source)
            }
            GridIOError::Open { path, source } => {
                write!(f, "opening {}: {}", path.display(), source)
            }
            GridIOError::Flush { path, source } => {
                write!(f, "flushing {}: {}", path.display(), source)
            }
            GridIOError::Serialize { path, source } => {
                write!(f, "serializing JSON to {}: {}", path.display(), source)
            }
            GridIOError::Parse { path, source } => {
                write!(f, "parsing JSON in {}: {}", path.display(), source)
            }
            GridIOError::Grid { path, source } => {
                write!(f, "rebuilding grid from {}: {}", path.display(), source)
            }
            GridIOError::FormatMismatch {
                path,
                found,
                expected,
            } => write!(
                f,
                "unsupported format {:?} (expected {:?}) in {}",
                found,
                expected,
                path.display()
            ),
            GridIOError::VersionMismatch {
                path,
                found,
                expected,
            } => write!(
                f,
                "unsupported version {} (expected {}) in {}",
                found,
                expected,
                path.display()
            ),
        }
    }
}

impl Error for GridIOError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GridIOError::Create { source, .. }
            | GridIOError::Open { source, .. }
            | GridIOError::Flush { source, .. } => Some(source),
            GridIOError::Serialize { source, .. } | GridIOError::Parse { source, .. } => {
                Some(source)
            }
            GridIOError::Grid { source, .. } => Some(source),
            GridIOError::FormatMismatch { .. } | GridIOError::VersionMismatch { .. } => None,
        }
    }
}

impl GridStorage {
    /// Save the grid to a **JSON envelope**
    /// `{ format, version, dim, grid_type, bounding_box, algorithmic_dims, points }`.
    ///
    /// ### Errors
    /// - Returns `GridIOError::{Create, Serialize, Flush}` on I/O or serialization failures.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> GridIOResult<()> {
        let path_ref = path.as_ref();
        let file = File::create(path_ref).map_err(|e| GridIOError::Create {
            path: path_ref.to_path_buf(),
            source: e,
        })?;
        let mut w = BufWriter::new(file);

        let data = GridData {
            dim: self.dim(),
            grid_type: self.grid_type(),
            bounding_box: self.bounding_box().clone(),
            algorithmic_dims: Some(self.algorithmic_dimensions().to_vec()),
            points: self.points().to_vec(),
        };

        let env = JsonEnvelopeRef {
            format: JSON_FORMAT_NAME,
            version: JSON_VERSION,
            grid: &data,
        };

        serde_json::to_writer_pretty(&mut w, &env).map_err(|e| GridIOError::Serialize {
            path: path_ref.to_path_buf(),
            source: e,
        })?;
        w.flush().map_err(|e| GridIOError::Flush {
            path: path_ref.to_path_buf(),
            source: e,
        })?;
        Ok(())
    }

    /// Load a grid from a versioned **JSON envelope**, validating format and version.
    ///
    /// Points are re-inserted in stored order, so sequence numbers and leaf
    /// flags match the saved grid. A missing `algorithmic_dims` field selects
    /// every dimension.
    ///
    /// ### Errors
    /// - `GridIOError::{Open, Parse}` on I/O or JSON failures.
    /// - `GridIOError::{FormatMismatch, VersionMismatch}` for foreign envelopes.
    /// - `GridIOError::Grid` if the bounding box, the algorithmic dimensions or
    ///   a point is invalid.
    pub fn load<P: AsRef<Path>>(path: P) -> GridIOResult<Self> {
        let path_ref = path.as_ref();

        let file = File::open(path_ref).map_err(|e| GridIOError::Open {
            path: path_ref.to_path_buf(),
            source: e,
        })?;
        let reader = BufReader::new(file);

        let env: JsonEnvelopeOwned<GridData> =
            serde_json::from_reader(reader).map_err(|e| GridIOError::Parse {
                path: path_ref.to_path_buf(),
                source: e,
            })?;

        if env.format != JSON_FORMAT_NAME {
            return Err(GridIOError::FormatMismatch {
                path: path_ref.to_path_buf(),
                found: env.format,
                expected: JSON_FORMAT_NAME,
            });
        }

        if env.version != JSON_VERSION {
            return Err(GridIOError::VersionMismatch {
                path: path_ref.to_path_buf(),
                found: env.version,
                expected: JSON_VERSION,
            });
        }

        let data = env.grid;
        let to_io = |e: GridError| GridIOError::Grid {
            path: path_ref.to_path_buf(),
            source: e,
        };

        let mut storage = GridStorage::new(data.dim, data.grid_type);

        // Deserialized boxes and points bypass their constructors, so validate them again.
        let bounding_box = BoundingBox::new(data.bounding_box.intervals().to_vec()).map_err(to_io)?;
        storage.set_bounding_box(bounding_box).map_err(to_io)?;
        if let Some(dims) = data.algorithmic_dims {
            storage.set_algorithmic_dimensions(&dims).map_err(to_io)?;
        }


        for point in data.points {
            let point = GridPoint::new(point.levels().to_vec(), point.indices().to_vec())
                .map_err(to_io)?;
            storage.insert(point).map_err(to_io)?;
        }

        Ok(storage)
    }
}
