//! `reportkit_pdf` v1:
//! Paginated document renderer.
//!
//! Layout:
//! - `conf`    : page geometry and block-size presets
//! - `spec`    : page layout, draw operations, rendered document
//! - `layout`  : text metrics and section measurement
//! - `writer`  : drawing primitives and the section layout pass
//! - `backend` : display list to PDF bytes (`printpdf`)
pub mod backend;
pub mod conf;
pub mod layout;
pub mod spec;
pub mod writer;

pub use conf::{N_MARGIN, N_PAGE_HEIGHT, N_PAGE_WIDTH, derive_default_document_options};
pub use spec::{
    EnumDrawOp, SpecDocumentOptions, SpecFooterStamp, SpecPage, SpecPageGeometry, SpecPageLayout,
    SpecRenderedDocument,
};
pub use writer::{DocumentCanvas, layout_document, render_document};
