pub mod docx_renderer;
pub mod extract_service;
pub mod llm_service;
pub mod pdf_converter;
pub mod warn_writer;

pub use docx_renderer::DocxRenderer;
pub use extract_service::ExtractService;
pub use llm_service::LlmService;
pub use pdf_converter::PdfConverter;
pub use warn_writer::WarnWriter;
