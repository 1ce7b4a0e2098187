//! Common utilities for the quire rendering core.
//!
//! This crate provides shared infrastructure used by all quire components:
//! - **Warning System** - deduplicated, coloured terminal output for
//!   non-fatal problems (missing images, ignored attribute values)
//! - **Locations** - resource location strings with `#fragment` anchors
//! - **Data URLs** - inline `data:` resources decoded from base64
//! - **Images** - decoded image records shared between loading and painting

pub mod data_url;
pub mod image;
pub mod location;
pub mod warning;
