//! In-memory transport
//!
//! Frames sent through a [`LoopbackTransport`] land on a shared [`Wire`]
//! that the owner drains and routes by hand. Used by the headless demo and
//! the tests; single-threaded like the browser.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::channel::{Transport, TransportError};

/// Outbound frame queue shared between a transport and its router
#[derive(Debug, Clone, Default)]
pub struct Wire(Rc<RefCell<VecDeque<String>>>);

impl Wire {
    /// Take every frame sent so far, oldest first
    pub fn drain(&self) -> Vec<String> {
        self.0.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

#[derive(Debug)]
pub struct LoopbackTransport {
    wire: Wire,
    closed: bool,
}

impl LoopbackTransport {
    /// A transport plus the wire its frames appear on
    pub fn new() -> (Self, Wire) {
        let wire = Wire::default();
        (
            Self {
                wire: wire.clone(),
                closed: false,
            },
            wire,
        )
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Transport for LoopbackTransport {
    fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.wire.0.borrow_mut().push_back(text.to_owned());
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
