//! State discretization and basis-function codings for tdlab
//!
//! A [`Discretizer`] maps a raw continuous state to either one index tuple
//! per tiling (for tables) or a feature vector (for linear approximation).
//! The [`select_coding`] entry point validates a request against an
//! observation space and builds the matching scheme:
//! - [`Aggregating`]: even bins
//! - [`TileCoding`]: offset multi-tilings
//! - [`RadialBasis`]: Gaussian bumps
//! - [`FourierBasis`]: cosine basis
//! - [`PolynomialBasis`]: monomials

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod aggregating;
pub mod discretizer;
pub mod fourier;
pub mod polynomial;
pub mod rbf;
pub mod selector;
pub mod tile;

pub use aggregating::Aggregating;
pub use discretizer::{Coding, CodingMode, Discretizer, TileIndex};
pub use fourier::FourierBasis;
pub use polynomial::PolynomialBasis;
pub use rbf::RadialBasis;
pub use selector::{select_coding, CodingSpec, SelectedCoding};
pub use tile::{create_tilings, default_tilings, validate_tilings, TileCoding, Tilings};
