/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines progress reporting messages, sinks, and helper functions for operator application.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Progress reporting primitives for operator application and matrix assembly.

use std::fmt::Debug;
use std::sync::{mpsc, Arc};
use std::thread;

/// Progress events emitted while applying or assembling operators.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMsg {
    /// One term of a separable operator has been added to the result.
    TermApplied { term: usize, num_terms: usize },

    /// One column of a dense operator matrix has been assembled.
    ColumnAssembled {
        column: usize,
        num_columns: usize,
        progress: f64,
    },

    /// Arbitrary informational message.
    Message { message: String },
}

/// Sink that consumes progress messages.
pub trait ProgressSink: Send + Sync + Debug {
    fn emit(&self, msg: ProgressMsg);
}

/// Progress sink that forwards messages over a channel.
#[derive(Debug)]
pub struct ClosureSink {
    tx: mpsc::SyncSender<ProgressMsg>,
}

impl ProgressSink for ClosureSink {
    // Drops the message if the buffer is full.
    #[inline]
    fn emit(&self, msg: ProgressMsg) {
        let _ = self.tx.try_send(msg);
    }
}

/// Spawns a listener thread that runs a handler closure for each progress message.
///
/// The thread exits once every clone of the returned sink has been dropped.
pub fn closure_sink<F>(
    buffer: usize,
    mut handler: F,
) -> (Arc<dyn ProgressSink>, thread::JoinHandle<()>)
where
    F: FnMut(ProgressMsg) + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel::<ProgressMsg>(buffer.max(1));
    let sink: Arc<dyn ProgressSink> = Arc::new(ClosureSink { tx });

    let handle = thread::spawn(move || {
        while let Ok(msg) = rx.recv() {
            handler(msg);
        }
    });

    (sink, handle)
}

#[inline]
pub(crate) fn emit(sink: &Option<Arc<dyn ProgressSink>>, msg: ProgressMsg) {
    if let Some(sink) = sink {
        sink.emit(msg);
    }
}
