mod entities;
mod parser;

pub use entities::{decode_html_entities, escape_html, escape_xml};
pub use parser::{Fragment, FragmentScanner, parse_highlighted};
