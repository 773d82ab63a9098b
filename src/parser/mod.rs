pub mod test_paper;

pub use test_paper::{classify, parse_test_paper, segment, RawBlock};
