//! Link feature centroids detected in a series of retention time or ion mobility
//! frames into cross-frame traces, and search later frames for points matching
//! designated precursor frames.
//!
//! The two entry points are [`link_between_frames`] and [`search_through_frames`].
//! Both operate on a [`FrameSet`] built from upstream feature-detection output via
//! [`PointSource`].

pub mod cloud;
pub mod counter;
pub mod error;
pub mod frame;
pub mod linker;
pub mod maxima;
pub mod point;
pub mod precursor;
pub mod species;

pub use crate::cloud::{CloudPoint, PointCloud};
pub use crate::counter::IdCounter;
pub use crate::error::LinkingError;
pub use crate::frame::{interleaved_order, strided_targets, Frame, FrameSet};
pub use crate::linker::{
    link_between_frames, link_from_seed, FrameLinker, LinkTermination, LinkingParams,
    LinkingReport,
};
pub use crate::maxima::{find_local_maxima, LocalMaximum};
pub use crate::point::{Point, PointSource};
pub use crate::precursor::{
    search_through_frames, PrecursorMatchGroup, PrecursorSearch, PrecursorSearchReport,
};
pub use crate::species::{LinkedPoint, Species};
