pub mod file_kind;
pub mod mindmap;
pub mod question;
pub mod summary;

pub use file_kind::FileKind;
pub use mindmap::{MindMap, MindMapEdge, MindMapNode};
pub use question::{Question, TestPaper, UploadResponse};
pub use summary::{SummaryResponse, SummaryStyle};
