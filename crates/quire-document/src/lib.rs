//! Documents: from markup bytes to a laid-out, paintable cell tree.
//!
//! [`builder`] drives the markup parser and turns its events into cells,
//! [`Document`] owns the result together with its forms and images, and
//! [`DocumentView`] shows one document at a time, replacing it only when a
//! new one has been built successfully.
//!
//! ```
//! use quire_cells::{RenderConfig, RenderContext};
//! use quire_document::{Document, MemoryOpener};
//!
//! let mut ctx = RenderContext::with_approximate_metrics(RenderConfig::default());
//! let markup = br#"<?xml version="1.0"?><html><body><p>Hello <b>world</b>!</p></body></html>"#;
//! let mut doc = Document::from_markup(markup, &mut ctx, &MemoryOpener::new(), None).unwrap();
//! doc.layout(400);
//! assert_eq!(doc.text(), "Hello world!");
//! ```

pub mod builder;
pub mod document;
pub mod error;
pub mod forms;
pub mod images;
pub mod metrics;
pub mod raster;
pub mod resource;
pub mod view;

pub use builder::{BuiltDocument, Tag, TreeBuilder, build_document};
pub use document::Document;
pub use error::{BuildError, DocumentError};
pub use forms::{ElementKind, Form, FormElement, FormError, FormSet, Method, Submission};
pub use images::{ImageStore, decode_image};
pub use metrics::{FontSet, FontdueMeasurer};
pub use raster::Rasterizer;
pub use resource::{FileSystemOpener, MemoryOpener, ResourceOpener};
pub use view::DocumentView;
