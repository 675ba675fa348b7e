//! Document renderers for Crosstab
//!
//! This crate turns structured requests into self-contained HTML
//! documents. The only renderer today is the pivot-table document
//! builder; it produces the markup, the embedded dataset configurations,
//! and the client script consumed by the AntV S2 library at display time.

pub mod pivot;
