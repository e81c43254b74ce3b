//! Native handlers, grouped by the context that runs them.
//!
//! Each function registers one context's natives on a builder and freezes
//! the table.

mod application;
mod background;
mod injected;

pub use {application::application_page, background::background, injected::global_injected};
