//! Dynamic sitemap.xml / robots.txt subsystem.

pub mod generator;

pub use generator::{robots_txt, sitemap_xml};
