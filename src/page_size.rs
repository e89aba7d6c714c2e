//! Named and custom page sizes, in millimetres.

use anyhow::{Result, anyhow};

/// Page width and height in millimetres, as listed (not yet oriented).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

const PAGE_SIZES: [(&str, f64, f64); 43] = [
    ("A0", 1189.0, 841.0),
    ("A1", 841.0, 594.0),
    ("A2", 594.0, 420.0),
    ("A3", 420.0, 297.0),
    ("A4", 297.0, 210.0),
    ("A5", 210.0, 148.0),
    ("A6", 148.0, 105.0),
    ("A7", 105.0, 74.0),
    ("A8", 74.0, 52.0),
    ("A9", 52.0, 37.0),
    ("A10", 37.0, 26.0),
    ("B0", 1456.0, 1030.0),
    ("B1", 1030.0, 728.0),
    ("B2", 728.0, 515.0),
    ("B3", 515.0, 364.0),
    ("B4", 364.0, 257.0),
    ("B5", 257.0, 182.0),
    ("B6", 182.0, 128.0),
    ("B7", 128.0, 91.0),
    ("B8", 91.0, 64.0),
    ("B9", 64.0, 45.0),
    ("B10", 45.0, 32.0),
    ("Letter", 279.0, 216.0),
    ("Legal", 356.0, 216.0),
    ("Tabloid", 432.0, 279.0),
    ("Ledger", 279.0, 432.0),
    ("Junior Legal", 127.0, 203.0),
    ("Half Letter", 140.0, 216.0),
    ("Government Letter", 203.0, 267.0),
    ("Government Legal", 216.0, 330.0),
    ("ANSI A", 216.0, 279.0),
    ("ANSI B", 279.0, 432.0),
    ("ANSI C", 432.0, 559.0),
    ("ANSI D", 559.0, 864.0),
    ("ANSI E", 864.0, 1118.0),
    ("Arch A", 229.0, 305.0),
    ("Arch B", 305.0, 457.0),
    ("Arch C", 457.0, 610.0),
    ("Arch D", 610.0, 914.0),
    ("Arch E", 914.0, 1219.0),
    ("Arch E1", 762.0, 1067.0),
    ("Arch E2", 660.0, 965.0),
    ("Arch E3", 686.0, 991.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
}

impl PageSize {
    /// Looks up a size name (case-insensitive) or parses `WIDTHxHEIGHT`.
    pub fn parse(arg: &str) -> Result<Self> {
        let arg = arg.trim();

        if let Some(&(_, width, height)) = PAGE_SIZES
            .iter()
            .find(|(name, _, _)| name.eq_ignore_ascii_case(arg))
        {
            return Ok(Self { width, height });
        }

        let (width, height) = arg
            .split_once(['x', 'X'])
            .ok_or_else(|| anyhow!("Unknown page size: {arg:?}"))?;

        let parse = |value: &str| {
            value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_normal() && *v > 0.0)
                .ok_or_else(|| anyhow!("Invalid page size: {arg:?}"))
        };

        Ok(Self {
            width: parse(width)?,
            height: parse(height)?,
        })
    }

    /// Swaps the sides, if needed, so the page has the given orientation.
    pub fn oriented(self, orientation: Orientation) -> Self {
        let landscape = self.width >= self.height;

        match (orientation, landscape) {
            (Orientation::Landscape, false) | (Orientation::Portrait, true)
                if self.width != self.height =>
            {
                Self {
                    width: self.height,
                    height: self.width,
                }
            }
            _ => self,
        }
    }
}

pub fn pt_from_mm(mm: f64) -> f64 {
    mm * (72.0 / 25.4)
}
