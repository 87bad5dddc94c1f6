pub mod docx;
pub mod excel;
pub mod html;
pub mod libreoffice;
pub mod markdown;
pub mod package;
pub mod pptx;
pub mod table;
pub mod text;

pub use docx::extract_document;
pub use excel::extract_workbook;
pub use html::{convert_html_to_markdown, extract_html};
pub use libreoffice::{LegacyFormat, convert_legacy, locate_soffice_binary};
pub use markdown::{MarkdownSection, markdown_extraction, split_by_headings, split_front_matter};
pub use pptx::extract_presentation;
pub use table::{cells_to_lines, cells_to_markdown};
pub use text::{decode_text, extract_plain_text};
