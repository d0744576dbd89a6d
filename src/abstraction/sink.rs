// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Diagnostics are not written to any stream directly: the mapper is handed
//! a sink and everything it has to say goes through it. The default sink
//! forwards to the `log` facade so the embedding application decides what
//! becomes visible.

/// The sink through which the mapper emits its diagnostics (unsupported
/// constructs, summary lines). Errors are still returned as values; the sink
/// only carries human-readable context.
pub trait MessageSink {
    fn emit(&self, msg: &str);
}

/// The default sink: forwards every message as a `log::warn!`.
#[derive(Debug, Default, Copy, Clone)]
pub struct LogSink;
impl MessageSink for LogSink {
    fn emit(&self, msg: &str) {
        log::warn!("{msg}");
    }
}

/// A sink that swallows everything.
#[derive(Debug, Default, Copy, Clone)]
pub struct NullSink;
impl MessageSink for NullSink {
    fn emit(&self, _: &str) {}
}
