// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: decode, encode, and resize raster images.

pub mod codec;

pub use codec::{JpegQuality, RasterFormat, RasterImage};
