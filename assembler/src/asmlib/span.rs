use chumsky::prelude::SimpleSpan;
use std::ops::Range;

/// Spans handed to the parser count tokens within a line, not bytes.
pub(crate) type Span = SimpleSpan;

pub(crate) fn span(range: Range<usize>) -> Span {
    Span::from(range)
}

/// The span covering the whole of a line of `token_count` tokens.
pub(crate) fn end_span(token_count: usize) -> Span {
    span(0..token_count)
}

#[test]
fn test_end_span() {
    let s = end_span(3);
    assert_eq!(s.start, 0);
    assert_eq!(s.end, 3);
}
