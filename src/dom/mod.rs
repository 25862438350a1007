//! In-memory model of the host page
//!
//! The map only needs a handful of page facilities: finding marker elements,
//! reading data attributes and inner markup, writing inline styles, measuring
//! rendered size and listening for window resizes.

pub mod element;
pub mod layout;
pub mod page;
pub mod selector;
pub mod style;
pub mod window;

pub use element::{Document, Element, ElementId};
pub use page::Page;
pub use selector::Selector;
pub use style::InlineStyle;
pub use window::{ResizeSubscription, Window};
