//! The compositing pipeline, one stage per module.

pub mod apply;
pub mod blend;
pub mod opacity;
pub mod position;
pub mod scale;
pub mod source;
pub mod spec;
pub mod validate;
