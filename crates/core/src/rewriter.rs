//! lol_html glue shared by the post-processing passes over rendered HTML.

use lol_html::errors::RewritingError;
use lol_html::{ElementContentHandlers, HtmlRewriter, OutputSink, Selector, Settings};
use std::borrow::Cow;
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use crate::error::Result;

/// A selector paired with its handlers, as produced by `lol_html::element!`.
pub(crate) type ElementHandler<'h> = (Cow<'static, Selector>, ElementContentHandlers<'h>);

/// Implements [`Write`] so rendered HTML can be pushed through lol_html.
///
/// The destination writer is shared with lol_html's output sink through a
/// single `Rc<RefCell<Option<W>>>`.
pub(crate) struct StreamingRewriter<'h, W: Write> {
    rewriter: Option<HtmlRewriter<'h, OutputProxy<W>>>,
    target: Rc<RefCell<Option<W>>>,
    sink_error: Rc<RefCell<Option<io::Error>>>,
}

impl<'h, W: Write> StreamingRewriter<'h, W> {
    /// Creates a rewriter that applies `handlers` and forwards output into `writer`.
    pub(crate) fn new(writer: W, handlers: Vec<ElementHandler<'h>>) -> Self {
        let target = Rc::new(RefCell::new(Some(writer)));
        let sink_error = Rc::new(RefCell::new(None));
        let output_sink = OutputProxy::new(Rc::clone(&target), Rc::clone(&sink_error));

        let mut settings = Settings::default();
        settings.element_content_handlers = handlers;
        let rewriter = HtmlRewriter::new(settings, output_sink);

        Self {
            rewriter: Some(rewriter),
            target,
            sink_error,
        }
    }

    /// Consumes the rewriter, ensures lol_html has flushed, and returns the underlying writer.
    pub(crate) fn into_inner(mut self) -> io::Result<W> {
        self.finalize_if_needed()?;

        let cell = Rc::try_unwrap(self.target)
            .map_err(|_| io::Error::other("rewriter still borrowed"))?;

        cell.into_inner()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "writer missing"))
    }

    fn finalize_if_needed(&mut self) -> io::Result<()> {
        if let Some(rewriter) = self.rewriter.take() {
            rewriter.end().map_err(rewriting_error_to_io)?;
        }

        Self::take_sink_error(&self.sink_error)
    }

    fn take_sink_error(cell: &Rc<RefCell<Option<io::Error>>>) -> io::Result<()> {
        if let Some(err) = cell.borrow_mut().take() {
            Err(err)
        } else {
            Ok(())
        }
    }
}

impl<W: Write> Write for StreamingRewriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let rewriter = self
            .rewriter
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "rewriter finalized"))?;

        rewriter.write(buf).map_err(rewriting_error_to_io)?;
        Self::take_sink_error(&self.sink_error)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.finalize_if_needed()
    }
}

/// Runs an HTML fragment through lol_html with `handlers` and collects the output.
pub(crate) fn rewrite_fragment(html: &str, handlers: Vec<ElementHandler<'_>>) -> Result<String> {
    let mut rewriter = StreamingRewriter::new(Vec::with_capacity(html.len()), handlers);
    rewriter.write_all(html.as_bytes())?;
    let bytes = rewriter.into_inner()?;

    let html = String::from_utf8(bytes).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    Ok(html)
}

fn rewriting_error_to_io(err: RewritingError) -> io::Error {
    io::Error::other(err)
}

struct OutputProxy<W: Write> {
    target: Rc<RefCell<Option<W>>>,
    sink_error: Rc<RefCell<Option<io::Error>>>,
}

impl<W: Write> OutputProxy<W> {
    fn new(target: Rc<RefCell<Option<W>>>, sink_error: Rc<RefCell<Option<io::Error>>>) -> Self {
        OutputProxy { target, sink_error }
    }
}

impl<W: Write> OutputSink for OutputProxy<W> {
    fn handle_chunk(&mut self, chunk: &[u8]) {
        if chunk.is_empty() {
            return;
        }

        if self.sink_error.borrow().is_some() {
            return;
        }

        let mut borrow = self.target.borrow_mut();

        if let Some(writer) = borrow.as_mut() {
            if let Err(err) = writer.write_all(chunk) {
                *self.sink_error.borrow_mut() = Some(err);
            }
        }
    }
}
