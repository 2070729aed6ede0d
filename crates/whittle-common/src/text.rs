use std::fmt;
use std::sync::Arc;

use crate::span::Span;

/// The parsed text of one file, shared between the file-root entity and
/// every slice cut from it.
///
/// Cloning is an `Arc` bump; the buffer lives as long as any entity still
/// points into it. When comment stripping is enabled the stripped copy is
/// the buffer -- the splitter reproduces whatever text it actually parsed.
#[derive(Clone)]
pub struct SourceText(Arc<str>);

impl SourceText {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> u32 {
        self.0.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Cut a [`Text`] slice out of this buffer.
    pub fn slice(&self, span: Span) -> Text {
        debug_assert!(span.end <= self.len(), "slice past end of buffer");
        if span.is_empty() {
            Text::empty()
        } else {
            Text(Some((self.clone(), span)))
        }
    }

    /// A [`Text`] covering the whole buffer.
    pub fn whole(&self) -> Text {
        self.slice(Span::new(0, self.len()))
    }
}

impl fmt::Debug for SourceText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceText({:?})", &self.0)
    }
}

impl PartialEq for SourceText {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

/// A slice of a [`SourceText`], or nothing.
///
/// Entity heads and tails are `Text`s: synthetic group entities carry empty
/// ones, token-bearing entities carry the token's span of the file buffer.
/// The empty case stores no buffer at all, so group entities cost nothing.
#[derive(Debug, Clone, Default)]
pub struct Text(Option<(SourceText, Span)>);

impl Text {
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn as_str(&self) -> &str {
        match &self.0 {
            Some((source, span)) => &source.as_str()[span.start as usize..span.end as usize],
            None => "",
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn len(&self) -> u32 {
        match &self.0 {
            Some((_, span)) => span.len(),
            None => 0,
        }
    }

    /// The span this text occupies in its buffer, if any.
    pub fn span(&self) -> Option<Span> {
        self.0.as_ref().map(|(_, span)| *span)
    }

    /// Extend this text to also cover `span` of the same buffer.
    ///
    /// Used by the word splitter to coalesce trailing punctuation runs onto
    /// the previous word. Both spans must come from `source`; if this text
    /// is empty it simply becomes `source[span]`.
    pub fn extend(&mut self, source: &SourceText, span: Span) {
        match &mut self.0 {
            Some((_, existing)) => *existing = existing.merge(span),
            None => *self = source.slice(span),
        }
    }
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl PartialEq<&str> for Text {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}
