use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::grid::Field;
use crate::render;

/// Failures while bringing a game up. None of these leave a half-built game behind.
#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("terminal is {columns}x{rows}, the field needs at least {needed_columns}x{needed_rows}")]
    SurfaceTooSmall {
        columns: u16,
        rows: u16,
        needed_columns: u16,
        needed_rows: u16,
    },
    #[error("could not set up the terminal: {0}")]
    Terminal(#[from] io::Error),
}

/// Checks that a drawing surface of `available` (columns, rows) can show `field`.
pub fn check_surface(field: Field, available: (u16, u16)) -> Result<(), InitError> {
    let (needed_columns, needed_rows) = render::required_size(field);
    let (columns, rows) = available;
    if columns < needed_columns || rows < needed_rows {
        return Err(InitError::SurfaceTooSmall {
            columns,
            rows,
            needed_columns,
            needed_rows,
        });
    }
    Ok(())
}
